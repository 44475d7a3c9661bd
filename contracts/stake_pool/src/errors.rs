/// Error codes returned by every stake pool entry point.
///
/// Discriminants are part of the public contract interface and must never be
/// renumbered.
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    // ── Lifecycle ────────────────────────────────────────────
    NotInitialized = 1,
    AlreadyInitialized = 2,

    // ── Auth ─────────────────────────────────────────────────
    /// Caller does not hold the admin role the operation requires.
    Unauthorized = 3,

    // ── Validation ───────────────────────────────────────────
    /// Zero amount or duration, null identity, or an out-of-range parameter.
    InvalidInput = 4,

    // ── Emergency latches ────────────────────────────────────
    /// Refused because the process-wide emergency latch is engaged.
    GlobalEmergency = 5,
    /// Refused because this pool's emergency latch is engaged.
    PoolEmergency = 6,

    // ── Pool accounting ──────────────────────────────────────
    /// Principal is still inside its lock period.
    LockPeriodActive = 7,
    MaxStakeExceeded = 8,
    /// A checked arithmetic step left the representable range.
    ArithmeticOverflow = 9,
    /// The reward reserve cannot cover the requested payout.
    InsufficientReserve = 10,
    /// The latch being engaged is already set.
    AlreadyEngaged = 11,
    PoolNotFound = 12,
    /// Staking into a pool whose funding window has ended.
    PoolExpired = 13,
    /// Treasury recovery attempted before the funding window ended.
    PoolStillActive = 14,
    /// Unstake amount exceeds the position's staked balance.
    InsufficientBalance = 15,
    /// `emergency_unstake` called while no latch is engaged.
    NotInEmergency = 16,
    TokensIdentical = 17,
}

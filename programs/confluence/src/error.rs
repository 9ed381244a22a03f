use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    // General
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Math underflow")]
    MathUnderflow,
    #[msg("Division by zero")]
    DivisionByZero,
    #[msg("Invalid amount: must be greater than zero")]
    InvalidAmount,
    #[msg("Unauthorized: signer is not the admin")]
    Unauthorized,
    #[msg("Aggregator is paused")]
    AggregatorPaused,
    #[msg("Invalid parameter")]
    InvalidParameter,
    #[msg("Account does not belong to this vault")]
    VaultMismatch,

    // Oracle
    #[msg("Oracle price is stale")]
    OraclePriceStale,
    #[msg("Oracle price is invalid or negative")]
    OraclePriceInvalid,
    #[msg("Oracle account mismatch")]
    OracleAccountMismatch,
    #[msg("Oracle confidence interval too wide")]
    OracleConfidenceTooWide,

    // Collateral controller
    #[msg("Deposit is below the external vault minimum")]
    DepositBelowMinimum,
    #[msg("Withdrawal exceeds free supplied balance")]
    WithdrawExceedsFreeBalance,
    #[msg("Withdrawal would push the vault under its collateral ratio")]
    WithdrawalWouldBreachRatio,
    #[msg("Not enough unborrowed debt to burn")]
    InsufficientBurnableDebt,
    #[msg("Idle balance cannot cover the transfer")]
    InsufficientIdleBalance,
    #[msg("Collateral ratio out of range")]
    InvalidCollateralRatio,

    // Borrow / liquidation
    #[msg("Borrow exceeds the position's entitlement")]
    BorrowExceedsEntitlement,
    #[msg("Borrow exceeds minted headroom")]
    InsufficientMintHeadroom,
    #[msg("Position has no outstanding debt")]
    NoOutstandingDebt,
    #[msg("Position is not liquidatable")]
    NotLiquidatable,
    #[msg("Liquidator cannot liquidate their own position")]
    SelfLiquidation,
    #[msg("Liquidation tier out of range")]
    InvalidLiquidationTier,

    // Rewards / distribution
    #[msg("Reward split exceeds 100%")]
    InvalidRewardSplit,
    #[msg("Nothing to claim")]
    NothingToClaim,
    #[msg("Revenue and secondary reserve cannot cover the payout")]
    InsufficientRevenueReserve,
    #[msg("Caller is not the distributor authority")]
    NotDistributorAuthority,
    #[msg("Distributor does not feed this ledger")]
    DistributorMismatch,
    #[msg("Incentive pool account layout is invalid")]
    IncentivePoolDataInvalid,
    #[msg("Vault is not a rebasing vault")]
    NotRebasingVault,

    // Collaborators
    #[msg("Unexpected external program")]
    UnsupportedProtocol,
    #[msg("External vault account layout is invalid")]
    ExternalVaultDataInvalid,

    // Staking
    #[msg("Unstake amount exceeds staked balance")]
    InsufficientStake,
}

pub mod aggregator;
pub mod collateral_vault;
pub mod user_position;
pub mod stake_ledger;
pub mod distributor;

pub use aggregator::*;
pub use collateral_vault::*;
pub use user_position::*;
pub use stake_ledger::*;
pub use distributor::*;

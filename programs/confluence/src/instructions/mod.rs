pub mod admin;
pub mod collateral;
pub mod lending;
pub mod rewards;
pub mod staking;
pub mod token_transfer;

pub use admin::*;
pub use collateral::*;
pub use lending::*;
pub use rewards::*;
pub use staking::*;

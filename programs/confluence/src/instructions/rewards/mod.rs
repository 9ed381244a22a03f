pub mod update_reward_accumulators;
pub mod harvest;
pub mod claim;

pub use update_reward_accumulators::*;
pub use harvest::*;
pub use claim::*;

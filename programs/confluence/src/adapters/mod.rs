pub mod account_bridge;
pub mod external_vault;
pub mod incentive_pool;

pub use external_vault::*;
pub use incentive_pool::*;

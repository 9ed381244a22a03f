pub mod rebalance;
pub mod supply;
pub mod withdraw;

pub use rebalance::*;
pub use supply::*;
pub use withdraw::*;

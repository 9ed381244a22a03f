pub mod fixed_point;
pub mod oracle;
pub mod interest;
pub mod collateral;
pub mod liquidation;
pub mod rewards;
pub mod distribution;

pub use fixed_point::*;
pub use oracle::*;
pub use interest::*;
pub use collateral::*;
pub use liquidation::*;
pub use rewards::*;
pub use distribution::*;

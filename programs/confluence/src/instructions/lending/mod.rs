pub mod borrow;
pub mod repay;
pub mod liquidate;

pub use borrow::*;
pub use repay::*;
pub use liquidate::*;

pub mod distribute;
pub mod stake;
pub mod unstake;
pub mod compound;

pub use distribute::*;
pub use stake::*;
pub use unstake::*;
pub use compound::*;

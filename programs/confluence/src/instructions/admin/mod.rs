pub mod initialize_aggregator;
pub mod register_vault;
pub mod update_vault_config;
pub mod update_reward_config;
pub mod initialize_distributor;
pub mod set_distributor_speed;
pub mod collect_treasury;
pub mod set_paused;
pub mod set_vault_paused;

pub use initialize_aggregator::*;
pub use register_vault::*;
pub use update_vault_config::*;
pub use update_reward_config::*;
pub use initialize_distributor::*;
pub use set_distributor_speed::*;
pub use collect_treasury::*;
pub use set_paused::*;
pub use set_vault_paused::*;

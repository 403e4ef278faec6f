pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, DaemonArgs};

pub use app::{ControlCenter, StatusReport};
pub use config::ControlConfig;
pub use core::{client::DaemonClient, daemon::Daemon, policy::Policy};
pub use utils::error::{ControlError, Result};

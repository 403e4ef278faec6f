pub mod client;
pub mod daemon;
pub mod panel;
pub mod policy;
pub mod protocol;

pub use crate::domain::model::{Request, Response};
pub use crate::domain::ports::{CommandRunner, PrivilegedChannel};
pub use crate::utils::error::Result;

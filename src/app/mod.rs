pub mod control_center;
pub mod controls;

pub use control_center::{ControlCenter, StatusReport};

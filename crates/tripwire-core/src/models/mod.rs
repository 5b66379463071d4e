//! Data models for Tripwire

mod alert;
mod alert_type;
mod check;
mod subscription;

pub use alert::*;
pub use alert_type::*;
pub use check::*;
pub use subscription::*;

//! Security service implementations

pub mod breached;
pub mod default;

pub use breached::InMemoryBreachedPasswordSource;
pub use default::{DefaultSecurityService, SecurityPolicy};

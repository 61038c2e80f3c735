//! Configuration
//!
//! [`AppConfig`] is assembled by [`ConfigLoader`] from defaults, a TOML file
//! and `AEGIS_`-prefixed environment variables, then validated.
//! [`FigmentConfigProvider`] exposes the loaded tree through the domain
//! `ConfigProvider` port.

pub mod loader;
pub mod provider;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use provider::FigmentConfigProvider;
pub use types::*;

//! Chainenv Tools Library
//!
//! Resolves toolchain configuration (network endpoints, account mnemonics,
//! verification keys) from environment variables and records values
//! discovered at runtime to dotenv files.

pub mod config;
pub mod error;
pub mod logging;
pub mod recorder;
pub mod resolve;
pub mod source;
pub mod vars;

pub use config::{Network, ToolchainConfig};
pub use error::{ConfigError, ValueKind};
pub use recorder::{RecordValue, Recorder};
pub use resolve::{Address, Resolver};
pub use source::{EnvSource, LayeredEnv, MapEnv, ProcessEnv};

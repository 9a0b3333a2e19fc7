//! Toolchain configuration: compiler version, networks, accounts and
//! contract verification.
//!
//! Values are resolved through a [`Resolver`], normally one backed by the
//! process environment with the `APP_ENV` dotenv files layered on top:
//!
//! 1. `.env.<APP_ENV>` (highest priority)
//! 2. `.env.<APP_ENV>.contracts`
//! 3. Process environment
//!
//! # Examples
//!
//! ```rust,no_run
//! use chainenv_tools::config::ToolchainConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ToolchainConfig::load(".")?;
//! println!("Default network: {}", config.default_network);
//! if let Some(base) = config.network(chainenv_tools::Network::Base) {
//!     println!("Base RPC URL: {}", base.url);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::ConfigError;
use crate::resolve::Resolver;
use crate::source::{EnvSource, LayeredEnv, ProcessEnv};
use crate::vars;

/// Solidity compiler version contracts are built with.
pub const SOLIDITY_VERSION: &str = "0.8.28";

/// Well-known development mnemonic used when `MNEMONIC` is not set.
pub const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

const REDACTED: &str = "<redacted>";

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Local development node
    Localhost,
    /// Base
    Base,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Localhost, Network::Base];

    /// Get network as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Localhost => "localhost",
            Network::Base => "base",
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "localhost" => Ok(Network::Localhost),
            "base" => Ok(Network::Base),
            other => Err(ConfigError::InvalidNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// HD-wallet accounts derived from a mnemonic.
#[derive(Debug, Clone)]
pub struct Accounts {
    pub mnemonic: String,
}

/// Endpoint and accounts for one network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: Network,
    pub url: String,
    pub accounts: Accounts,
}

/// Etherscan-compatible verification API.
#[derive(Debug, Clone, Default)]
pub struct EtherscanConfig {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SourcifyConfig {
    pub enabled: bool,
}

/// Resolved toolchain configuration with all required fields
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    pub solidity: String,
    pub default_network: Network,
    pub networks: Vec<NetworkConfig>,
    pub etherscan: EtherscanConfig,
    pub sourcify: SourcifyConfig,
}

impl ToolchainConfig {
    /// Resolve from the process environment with the `APP_ENV` dotenv files
    /// under `dir` layered on top.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = LayeredEnv::for_app_env(ProcessEnv, dir)?;
        Self::resolve(&Resolver::new(source))
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `BASE_RPC_URL` is not set
    /// - an RPC URL is not http(s)
    pub fn resolve<S: EnvSource>(resolver: &Resolver<S>) -> Result<Self, ConfigError> {
        let mnemonic = resolver.string(vars::MNEMONIC, Some(TEST_MNEMONIC))?;

        let localhost = NetworkConfig {
            network: Network::Localhost,
            url: "http://127.0.0.1:8545".to_string(),
            accounts: Accounts {
                mnemonic: mnemonic.clone(),
            },
        };
        let base = NetworkConfig {
            network: Network::Base,
            url: resolver.string(vars::BASE_RPC_URL, None)?,
            accounts: Accounts { mnemonic },
        };

        for network in [&localhost, &base] {
            Self::validate_url(network)?;
        }

        Ok(ToolchainConfig {
            solidity: SOLIDITY_VERSION.to_string(),
            default_network: Network::Localhost,
            networks: vec![localhost, base],
            etherscan: EtherscanConfig {
                api_key: resolver.optional(vars::ETHERSCAN_KEY),
            },
            sourcify: SourcifyConfig { enabled: true },
        })
    }

    pub fn network(&self, network: Network) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.network == network)
    }

    fn validate_url(network: &NetworkConfig) -> Result<(), ConfigError> {
        let url = &network.url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "{} RPC URL must start with http:// or https://: {}",
                network.network, url
            )));
        }
        Ok(())
    }

    /// Print the resolved configuration. Secrets are redacted.
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════════╗");
        println!("║             TOOLCHAIN CONFIGURATION RESOLVED                   ║");
        println!("╚════════════════════════════════════════════════════════════════╝");
        println!("  Solidity:            {}", self.solidity);
        println!("  Default Network:     {}", self.default_network);

        for network in &self.networks {
            println!("  [{}]", network.network);
            println!("    RPC URL:           {}", network.url);
            if network.accounts.mnemonic == TEST_MNEMONIC {
                println!("    Mnemonic:          (test mnemonic)");
            } else {
                println!("    Mnemonic:          {}", REDACTED);
            }
        }

        if self.etherscan.api_key.is_some() {
            println!("  Etherscan Key:       {}", REDACTED);
        } else {
            println!("  Etherscan Key:       (not configured)");
        }

        if self.sourcify.enabled {
            println!("  Sourcify:            ENABLED");
        }

        println!("╚════════════════════════════════════════════════════════════════╝");
    }

    /// Get configuration as JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Serialize for NetworkConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("url", &self.url)?;
        map.serialize_entry("mnemonic", REDACTED)?;
        map.end()
    }
}

// Manual Serialize impl so mnemonics and API keys never reach the output
impl Serialize for ToolchainConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        struct Networks<'a>(&'a [NetworkConfig]);

        impl Serialize for Networks<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_map(self.0.iter().map(|n| (n.network.as_str(), n)))
            }
        }

        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("solidity", &self.solidity)?;
        map.serialize_entry("default_network", self.default_network.as_str())?;
        map.serialize_entry("networks", &Networks(&self.networks))?;
        map.serialize_entry(
            "etherscan_api_key",
            &self.etherscan.api_key.as_ref().map(|_| REDACTED),
        )?;
        map.serialize_entry("sourcify_enabled", &self.sourcify.enabled)?;
        map.end()
    }
}

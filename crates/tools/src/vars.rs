// Names of the environment variables the toolchain reads.

/// Application-environment tag ("staging", "production", ...). Selects which
/// dotenv files are layered in and names the files the recorder writes.
pub const APP_ENV: &str = "APP_ENV";

/// # Accounts
pub const MNEMONIC: &str = "MNEMONIC";

/// # Networks
pub const BASE_RPC_URL: &str = "BASE_RPC_URL";

/// # Verification
pub const ETHERSCAN_KEY: &str = "ETHERSCAN_KEY";

/// Log filter directives for the `chainenv` binary.
pub const CHAINENV_LOG: &str = "CHAINENV_LOG";

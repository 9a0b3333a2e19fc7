//! Typed lookups of configuration variables.
//!
//! All four lookups share one policy: a variable that is set to a non-empty
//! value is validated and returned, otherwise the default is used if one was
//! supplied, otherwise [`ConfigError::MissingVariable`]. A variable set to the
//! empty string counts as unset.
//!
//! # Examples
//!
//! ```rust
//! use chainenv_tools::{MapEnv, Resolver};
//!
//! let resolver = Resolver::new(MapEnv::new().with("CHAIN_ID", "8453"));
//! assert_eq!(resolver.integer("CHAIN_ID", None).unwrap(), 8453);
//! assert_eq!(resolver.integer("GAS_LIMIT", Some(30_000_000)).unwrap(), 30_000_000);
//! assert!(resolver.string("BASE_RPC_URL", None).is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{ConfigError, ValueKind};
use crate::source::{EnvSource, ProcessEnv};

/// A `0x`-prefixed, 40-hex-digit account or contract address.
///
/// The text is kept exactly as it was given; no checksum is applied or
/// checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    text: String,
    bytes: alloy_primitives::Address,
}

impl Address {
    /// Accepts any text containing `0x` followed by 40 hex digits. The bytes
    /// come from the first such run; the text is kept whole.
    pub fn parse(s: &str) -> Option<Self> {
        let raw = s.as_bytes();
        let start = (0..raw.len().saturating_sub(41)).find(|&i| {
            raw[i] == b'0'
                && matches!(raw[i + 1], b'x' | b'X')
                && raw[i + 2..i + 42].iter().all(u8::is_ascii_hexdigit)
        })?;
        let bytes = alloy_primitives::Address::from_str(&s[start + 2..start + 42]).ok()?;
        Some(Self {
            text: s.to_string(),
            bytes,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The 20 raw bytes.
    pub fn bytes(&self) -> alloy_primitives::Address {
        self.bytes
    }
}

impl FromStr for Address {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ConfigError::ValidationError(format!("not an address: {s}")))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Resolves variables from an injected [`EnvSource`].
#[derive(Debug, Clone, Default)]
pub struct Resolver<S = ProcessEnv> {
    source: S,
}

impl Resolver<ProcessEnv> {
    /// Resolver over the real process environment.
    pub fn from_process() -> Self {
        Self::new(ProcessEnv)
    }
}

impl<S: EnvSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Non-empty value, or `None` when unset or empty.
    fn lookup(&self, name: &str) -> Option<String> {
        self.source.get(name).filter(|v| !v.is_empty())
    }

    fn fallback<T>(&self, name: &str, default: Option<T>) -> Result<T, ConfigError> {
        match default {
            Some(value) => {
                debug!(variable = name, "using default");
                Ok(value)
            }
            None => Err(ConfigError::MissingVariable(name.to_string())),
        }
    }

    pub fn string(&self, name: &str, default: Option<&str>) -> Result<String, ConfigError> {
        match self.lookup(name) {
            Some(value) => {
                debug!(variable = name, "resolved from source");
                Ok(value)
            }
            None => self.fallback(name, default.map(str::to_string)),
        }
    }

    pub fn address(&self, name: &str, default: Option<Address>) -> Result<Address, ConfigError> {
        match self.lookup(name) {
            Some(value) => {
                debug!(variable = name, "resolved from source");
                Address::parse(&value).ok_or_else(|| ConfigError::invalid(name, ValueKind::Address))
            }
            None => self.fallback(name, default),
        }
    }

    /// Decimal digits only, parsed as `u64`. Values past `u64::MAX` are
    /// rejected rather than truncated.
    pub fn integer(&self, name: &str, default: Option<u64>) -> Result<u64, ConfigError> {
        match self.lookup(name) {
            Some(value) => {
                debug!(variable = name, "resolved from source");
                if !is_decimal(&value) {
                    return Err(ConfigError::invalid(name, ValueKind::Integer));
                }
                value
                    .parse()
                    .map_err(|_| ConfigError::invalid(name, ValueKind::Integer))
            }
            None => self.fallback(name, default),
        }
    }

    /// Like [`Resolver::integer`] but without an upper bound, for amounts in
    /// base units.
    pub fn big_integer(
        &self,
        name: &str,
        default: Option<BigUint>,
    ) -> Result<BigUint, ConfigError> {
        match self.lookup(name) {
            Some(value) => {
                debug!(variable = name, "resolved from source");
                if !is_decimal(&value) {
                    return Err(ConfigError::invalid(name, ValueKind::Integer));
                }
                BigUint::parse_bytes(value.as_bytes(), 10)
                    .ok_or_else(|| ConfigError::invalid(name, ValueKind::Integer))
            }
            None => self.fallback(name, default),
        }
    }

    /// Optional lookup: `None` when unset or empty, no validation.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapEnv;

    const ADDR: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

    fn resolver(pairs: &[(&str, &str)]) -> Resolver<MapEnv> {
        Resolver::new(pairs.iter().copied().collect())
    }

    fn is_missing<T: fmt::Debug>(r: Result<T, ConfigError>, name: &str) -> bool {
        matches!(r, Err(ConfigError::MissingVariable(n)) if n == name)
    }

    fn is_invalid<T: fmt::Debug>(r: Result<T, ConfigError>, kind: ValueKind) -> bool {
        matches!(r, Err(ConfigError::InvalidFormat { expected, .. }) if expected == kind)
    }

    #[test]
    fn test_unset_without_default_fails() {
        let r = resolver(&[]);
        assert!(is_missing(r.string("N", None), "N"));
        assert!(is_missing(r.address("N", None), "N"));
        assert!(is_missing(r.integer("N", None), "N"));
        assert!(is_missing(r.big_integer("N", None), "N"));
    }

    #[test]
    fn test_empty_behaves_as_unset() {
        let r = resolver(&[("N", "")]);
        assert!(is_missing(r.string("N", None), "N"));
        assert!(is_missing(r.address("N", None), "N"));
        assert!(is_missing(r.integer("N", None), "N"));
        assert!(is_missing(r.big_integer("N", None), "N"));

        assert_eq!(r.string("N", Some("fallback")).unwrap(), "fallback");
        assert_eq!(r.integer("N", Some(7)).unwrap(), 7);
        assert_eq!(
            r.big_integer("N", Some(BigUint::from(9u32))).unwrap(),
            BigUint::from(9u32)
        );
        let default = Address::parse(ADDR).unwrap();
        assert_eq!(r.address("N", Some(default.clone())).unwrap(), default);
    }

    #[test]
    fn test_set_value_wins_over_default() {
        let r = resolver(&[("URL", "https://mainnet.base.org")]);
        assert_eq!(
            r.string("URL", Some("http://127.0.0.1:8545")).unwrap(),
            "https://mainnet.base.org"
        );
    }

    #[test]
    fn test_zero_default_is_used() {
        let r = resolver(&[]);
        assert_eq!(r.integer("N", Some(0)).unwrap(), 0);
    }

    #[test]
    fn test_address_returned_unchanged() {
        let r = resolver(&[("A", ADDR)]);
        let addr = r.address("A", None).unwrap();
        assert_eq!(addr.as_str(), ADDR);
        assert_eq!(addr.to_string(), ADDR);
    }

    #[test]
    fn test_address_mixed_case() {
        let lower = "0xabcdef0123456789abcdef0123456789abcdef01";
        let r = resolver(&[("A", lower)]);
        let addr = r.address("A", None).unwrap();
        assert_eq!(addr.as_str(), lower);
        assert_eq!(addr.bytes(), Address::parse(ADDR).unwrap().bytes());
    }

    #[test]
    fn test_address_invalid() {
        for bad in [
            "0xZZCDEF0123456789ABCDEF0123456789ABCDEF01",
            "ABCDEF0123456789ABCDEF0123456789ABCDEF01",
            "0xABCDEF",
            "0xABCDEF0123456789ABCDEF0123456789ABCDEF0",
            "0y",
        ] {
            let r = resolver(&[("A", bad)]);
            assert!(is_invalid(r.address("A", None), ValueKind::Address), "{bad:?}");
        }
    }

    #[test]
    fn test_address_embedded_run_accepted() {
        for text in [
            "0xABCDEF0123456789ABCDEF0123456789ABCDEF0101",
            " 0xABCDEF0123456789ABCDEF0123456789ABCDEF01",
            "eip155:8453:0xABCDEF0123456789ABCDEF0123456789ABCDEF01",
            "0x0xABCDEF0123456789ABCDEF0123456789ABCDEF01",
        ] {
            let r = resolver(&[("A", text)]);
            let addr = r.address("A", None).unwrap();
            assert_eq!(addr.as_str(), text);
            assert_eq!(addr.bytes(), Address::parse(ADDR).unwrap().bytes());
        }
    }

    #[test]
    fn test_address_from_str_error_names_value() {
        let err = "bogus".parse::<Address>().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m == "not an address: bogus"));
    }

    #[test]
    fn test_integer_parses() {
        let r = resolver(&[("N", "42")]);
        assert_eq!(r.integer("N", None).unwrap(), 42);
    }

    #[test]
    fn test_integer_invalid() {
        for bad in ["4.2", "-1", "+1", "1e3", " 42", "0x10"] {
            let r = resolver(&[("N", bad)]);
            assert!(is_invalid(r.integer("N", None), ValueKind::Integer), "{bad:?}");
            assert!(is_invalid(r.big_integer("N", None), ValueKind::Integer), "{bad:?}");
        }
    }

    #[test]
    fn test_integer_overflow_is_invalid() {
        let r = resolver(&[("N", "18446744073709551616")]);
        assert!(is_invalid(r.integer("N", None), ValueKind::Integer));
    }

    #[test]
    fn test_big_integer_keeps_precision() {
        let r = resolver(&[("N", "123456789012345678901234567890")]);
        let value = r.big_integer("N", None).unwrap();
        assert_eq!(value.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn test_optional() {
        let r = resolver(&[("K", "abc"), ("E", "")]);
        assert_eq!(r.optional("K").as_deref(), Some("abc"));
        assert_eq!(r.optional("E"), None);
        assert_eq!(r.optional("U"), None);
    }
}

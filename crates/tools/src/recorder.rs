//! Persists values discovered at runtime (deployed contract addresses, chain
//! ids, ...) to a dotenv file so later runs can resolve them.
//!
//! The whole file is rewritten after every [`Recorder::set`]; the in-memory
//! entries are the only source of truth and the file is never read back.
//! Two processes writing the same file race, and the last write wins.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use num_bigint::{BigInt, BigUint};
use tracing::info;

use crate::error::ConfigError;
use crate::resolve::Address;
use crate::source::{EnvSource, ProcessEnv};
use crate::vars;

/// A value the recorder accepts, held in its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordValue(String);

impl RecordValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RecordValue {
    fn from(v: String) -> Self {
        RecordValue(v)
    }
}

impl From<&str> for RecordValue {
    fn from(v: &str) -> Self {
        RecordValue(v.to_string())
    }
}

impl From<&String> for RecordValue {
    fn from(v: &String) -> Self {
        RecordValue(v.clone())
    }
}

impl From<&Address> for RecordValue {
    fn from(v: &Address) -> Self {
        RecordValue(v.as_str().to_string())
    }
}

impl From<Address> for RecordValue {
    fn from(v: Address) -> Self {
        RecordValue::from(&v)
    }
}

macro_rules! record_value_via_to_string {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RecordValue {
                fn from(v: $t) -> Self {
                    RecordValue(v.to_string())
                }
            }
        )*
    };
}

record_value_via_to_string!(bool, i32, i64, u32, u64, u128, BigInt, BigUint);

/// Accumulates `key="value"` entries and mirrors them to
/// `<dir>/.env.<APP_ENV>.<suffix>`.
#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl Recorder {
    /// Tag from the process environment, file under the current directory.
    pub fn new(suffix: &str) -> Result<Self, ConfigError> {
        Self::with_source(&ProcessEnv, ".", suffix)
    }

    /// Fails with [`ConfigError::MissingEnvironmentTag`] when `APP_ENV` is
    /// unset or empty in `source`. Nothing is written here.
    pub fn with_source<S: EnvSource + ?Sized>(
        source: &S,
        dir: impl AsRef<Path>,
        suffix: &str,
    ) -> Result<Self, ConfigError> {
        let tag = source
            .get(vars::APP_ENV)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingEnvironmentTag)?;

        let path = dir.as_ref().join(format!(".env.{tag}.{suffix}"));
        Ok(Self {
            path,
            entries: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or overwrite `key`, then rewrite the file. An overwritten key
    /// keeps its original line.
    pub fn set(&mut self, key: &str, value: impl Into<RecordValue>) -> Result<(), ConfigError> {
        let value = value.into().0;
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self.write()?;
        info!(key, path = %self.path.display(), "recorded value");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File contents: one `key="value"` per line plus a trailing newline.
    /// Quotes inside values are written as-is.
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k}=\"{v}\""))
            .collect();
        lines.join("\n") + "\n"
    }

    /// Overwrite the target file with every entry. On error the state of the
    /// file is unknown.
    pub fn write(&self) -> Result<(), ConfigError> {
        fs::write(&self.path, self.render())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapEnv;

    fn staging() -> MapEnv {
        MapEnv::new().with(vars::APP_ENV, "staging")
    }

    #[test]
    fn test_path_from_tag_and_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let rec = Recorder::with_source(&staging(), dir.path(), "deploy").unwrap();
        assert_eq!(rec.path(), dir.path().join(".env.staging.deploy"));
        assert!(rec.is_empty());
    }

    #[test]
    fn test_missing_tag_fails_without_touching_disk() {
        let dir = tempfile::tempdir().unwrap();
        for source in [MapEnv::new(), MapEnv::new().with(vars::APP_ENV, "")] {
            let err = Recorder::with_source(&source, dir.path(), "deploy").unwrap_err();
            assert!(matches!(err, ConfigError::MissingEnvironmentTag));
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_set_writes_exact_layout() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = Recorder::with_source(&staging(), dir.path(), "deploy").unwrap();

        rec.set("TOKEN_ADDR", "0xabc...").unwrap();
        rec.set("CHAIN_ID", 8453u64).unwrap();

        let written = fs::read_to_string(dir.path().join(".env.staging.deploy")).unwrap();
        assert_eq!(written, "TOKEN_ADDR=\"0xabc...\"\nCHAIN_ID=\"8453\"\n");
    }

    #[test]
    fn test_file_reflects_each_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = Recorder::with_source(&staging(), dir.path(), "deploy").unwrap();

        rec.set("A", "1").unwrap();
        assert_eq!(fs::read_to_string(rec.path()).unwrap(), "A=\"1\"\n");

        rec.set("B", "2").unwrap();
        assert_eq!(fs::read_to_string(rec.path()).unwrap(), "A=\"1\"\nB=\"2\"\n");
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = Recorder::with_source(&staging(), dir.path(), "deploy").unwrap();

        rec.set("A", "1").unwrap();
        rec.set("B", "2").unwrap();
        rec.set("A", "3").unwrap();

        assert_eq!(rec.len(), 2);
        assert_eq!(rec.get("A"), Some("3"));
        assert_eq!(fs::read_to_string(rec.path()).unwrap(), "A=\"3\"\nB=\"2\"\n");
    }

    #[test]
    fn test_rewrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".env.staging.deploy"), "STALE=\"x\"\n").unwrap();

        let mut rec = Recorder::with_source(&staging(), dir.path(), "deploy").unwrap();
        rec.set("A", "1").unwrap();

        assert_eq!(fs::read_to_string(rec.path()).unwrap(), "A=\"1\"\n");
    }

    #[test]
    fn test_value_canonical_forms() {
        let big: BigUint = "1000000000000000000000000".parse().unwrap();
        assert_eq!(RecordValue::from(true).as_str(), "true");
        assert_eq!(RecordValue::from(false).as_str(), "false");
        assert_eq!(RecordValue::from(-5i64).as_str(), "-5");
        assert_eq!(RecordValue::from(big).as_str(), "1000000000000000000000000");
        assert_eq!(RecordValue::from(BigInt::from(-12)).as_str(), "-12");
    }

    #[test]
    fn test_quotes_are_not_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = Recorder::with_source(&staging(), dir.path(), "deploy").unwrap();
        rec.set("NOTE", "say \"hi\"").unwrap();
        assert_eq!(fs::read_to_string(rec.path()).unwrap(), "NOTE=\"say \"hi\"\"\n");
    }

    #[test]
    fn test_empty_render() {
        let dir = tempfile::tempdir().unwrap();
        let rec = Recorder::with_source(&staging(), dir.path(), "deploy").unwrap();
        assert_eq!(rec.render(), "\n");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        let mut rec = Recorder::with_source(&staging(), &missing, "deploy").unwrap();
        assert!(matches!(rec.set("A", "1"), Err(ConfigError::Io(_))));
        // the entry is kept in memory even though the write failed
        assert_eq!(rec.get("A"), Some("1"));
    }
}

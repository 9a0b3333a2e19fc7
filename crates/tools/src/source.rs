//! Where configuration values come from.
//!
//! Resolution never touches `std::env` directly. It goes through an
//! [`EnvSource`], so the process environment, an in-memory map and a stack of
//! dotenv files can all stand behind the same lookup.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::vars;

/// A read-only mapping from variable name to value.
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;
}

impl<T: EnvSource + ?Sized> EnvSource for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// The real process environment. Values that are not valid UTF-8 are absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory source.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }
}

impl EnvSource for MapEnv {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { vars }
    }
}

/// Dotenv files overlaid on a base source.
///
/// Values from files always win over the base, and a later file wins over an
/// earlier one.
#[derive(Debug, Clone)]
pub struct LayeredEnv<S> {
    base: S,
    overrides: HashMap<String, String>,
    loaded: Vec<PathBuf>,
}

impl<S: EnvSource> LayeredEnv<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            overrides: HashMap::new(),
            loaded: Vec::new(),
        }
    }

    /// Standard layering for the toolchain: `.env.<APP_ENV>.contracts` then
    /// `.env.<APP_ENV>`, both under `dir`. Without a tag no files are read.
    pub fn for_app_env(base: S, dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut layered = Self::new(base);
        let tag = match layered.base.get(vars::APP_ENV) {
            Some(tag) if !tag.is_empty() => tag,
            _ => {
                debug!("{} not set, no dotenv layers loaded", vars::APP_ENV);
                return Ok(layered);
            }
        };

        let dir = dir.as_ref();
        layered.layer(dir.join(format!(".env.{tag}.contracts")))?;
        layered.layer(dir.join(format!(".env.{tag}")))?;
        Ok(layered)
    }

    /// Overlay one dotenv file. A missing file is skipped.
    pub fn layer(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "dotenv layer not found, skipping");
                return Ok(self);
            }
            Err(e) => return Err(e.into()),
        };

        let pairs = parse_pairs(&contents);
        debug!(path = %path.display(), count = pairs.len(), "dotenv layer loaded");
        self.overrides.extend(pairs);
        self.loaded.push(path.to_path_buf());
        Ok(self)
    }

    /// Files that were actually found and read, in load order.
    pub fn loaded(&self) -> &[PathBuf] {
        &self.loaded
    }
}

impl<S: EnvSource> EnvSource for LayeredEnv<S> {
    fn get(&self, name: &str) -> Option<String> {
        self.overrides
            .get(name)
            .cloned()
            .or_else(|| self.base.get(name))
    }
}

/// Plain `KEY=value` pairs, read the way the JS `dotenv` loader reads them:
/// no `$` expansion and no escape processing beyond `\n` and `\r` inside
/// double quotes. Lines that are not assignments are ignored.
pub(crate) fn parse_pairs(contents: &str) -> Vec<(String, String)> {
    contents
        .replace("\r\n", "\n")
        .lines()
        .filter_map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Option<(String, String)> {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
    let (key, value) = line.split_once('=')?;

    let key = key.trim_end();
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if !valid_key {
        return None;
    }

    let value = value.trim();
    let quote = value.chars().next().filter(|c| matches!(c, '"' | '\'' | '`'));
    let value = match quote {
        Some(q) if value.len() >= 2 && value.ends_with(q) => {
            let inner = &value[1..value.len() - 1];
            if q == '"' {
                inner.replace("\\n", "\n").replace("\\r", "\r")
            } else {
                inner.to_string()
            }
        }
        _ => match value.find('#') {
            Some(idx) => value[..idx].trim_end().to_string(),
            None => value.to_string(),
        },
    };
    Some((key.to_string(), value))
}

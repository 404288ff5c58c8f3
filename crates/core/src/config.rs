//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into [`crate::Hospital`].
//! Nothing in this crate reads environment variables.

use crate::constants::DEFAULT_DATA_DIR;
use crate::{WardError, WardResult};
use std::path::{Path, PathBuf};

/// Whether empty pharmacy and laboratory collections fall back to illustrative records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    #[default]
    Demo,
    Empty,
}

impl SeedPolicy {
    /// Parse a seed flag such as `WARD_SEED_DEMO`.
    ///
    /// `None` or blank means [`SeedPolicy::Demo`]; `false`, `0`, `no` and `off` disable seeding.
    pub fn from_flag(value: Option<&str>) -> WardResult<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match value.map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("true") | Some("1") | Some("yes") | Some("on") => Ok(Self::Demo),
            Some("false") | Some("0") | Some("no") | Some("off") => Ok(Self::Empty),
            Some(other) => Err(WardError::InvalidInput(format!(
                "seed flag must be a boolean, got '{other}'"
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    seed_policy: SeedPolicy,
}

impl CoreConfig {
    pub fn new(data_dir: PathBuf, seed_policy: SeedPolicy) -> WardResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(WardError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            seed_policy,
        })
    }

    /// Build a configuration from optional raw values, applying defaults.
    pub fn from_values(data_dir: Option<String>, seed_flag: Option<String>) -> WardResult<Self> {
        let data_dir = data_dir
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let seed_policy = SeedPolicy::from_flag(seed_flag.as_deref())?;

        Self::new(PathBuf::from(data_dir), seed_policy)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_data_dir() {
        let err = CoreConfig::new(PathBuf::new(), SeedPolicy::Demo).unwrap_err();
        assert!(matches!(err, WardError::InvalidInput(_)));
    }

    #[test]
    fn from_values_applies_defaults() {
        let cfg = CoreConfig::from_values(None, None).unwrap();
        assert_eq!(cfg.data_dir(), Path::new(DEFAULT_DATA_DIR));
        assert_eq!(cfg.seed_policy(), SeedPolicy::Demo);

        let cfg = CoreConfig::from_values(Some("  ".into()), Some("".into())).unwrap();
        assert_eq!(cfg.data_dir(), Path::new(DEFAULT_DATA_DIR));
    }

    #[test]
    fn seed_flag_parsing() {
        assert_eq!(SeedPolicy::from_flag(Some("FALSE")).unwrap(), SeedPolicy::Empty);
        assert_eq!(SeedPolicy::from_flag(Some(" 0 ")).unwrap(), SeedPolicy::Empty);
        assert_eq!(SeedPolicy::from_flag(Some("yes")).unwrap(), SeedPolicy::Demo);
        assert!(SeedPolicy::from_flag(Some("maybe")).is_err());
    }
}

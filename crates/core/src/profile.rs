//! Named run profiles
//!
//! The historical entry points for this driver disagreed on kernel names
//! and working directories. Those divergent configurations are kept as
//! explicit, distinct profiles in an `nbrun.toml` file rather than
//! collapsed into one ambient default: every profile must name its kernel.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::ExecutionConfig;
use crate::error::{Error, Result};
use crate::kernel::KernelSpec;

/// File name searched for when resolving profiles.
pub const PROFILE_FILE_NAME: &str = "nbrun.toml";

/// Run timeout applied when a profile does not state one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFile {
    #[serde(default)]
    pub profile: BTreeMap<String, Profile>,
}

/// One named execution configuration. `kernel` is required by design;
/// `working_dir` defaults to the directory the profile file lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub kernel: String,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Profile {
    /// Materialize the profile into a per-run config, resolving a relative
    /// working directory against `base_dir`.
    pub fn to_execution_config(&self, base_dir: &Path) -> ExecutionConfig {
        let working_dir = match &self.working_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        ExecutionConfig::new(
            KernelSpec::named(&self.kernel),
            working_dir,
            Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        )
    }
}

impl ProfileFile {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Walk up from `start_path` looking for an `nbrun.toml`.
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;
        loop {
            let candidate = current.join(PROFILE_FILE_NAME);
            if candidate.exists() {
                return Some(candidate);
            }
            current = current.parent()?;
        }
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profile.get(name)
    }
}

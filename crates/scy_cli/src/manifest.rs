//! Optional project manifest (`Scy.toml`): seeds the bounds/compromise
//! switches from a file instead of (or underneath) the command line,
//! mirroring the teacher's `Largo.toml` loader.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub bounds: BoundsSpec,
    #[serde(default)]
    pub compromise: CompromiseSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BoundsSpec {
    #[serde(default)]
    pub max_runs: Option<u32>,
    #[serde(default)]
    pub max_proof_depth: Option<u32>,
    #[serde(default)]
    pub max_trace_length: Option<u32>,
    #[serde(default)]
    pub max_attacks: Option<u32>,
    #[serde(default)]
    pub max_intruder_actions: Option<u32>,
    #[serde(default)]
    pub time_limit_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompromiseSpec {
    #[serde(default)]
    pub lkr: Option<String>,
    #[serde(default)]
    pub skr: bool,
    #[serde(default)]
    pub ssr: bool,
}

#[derive(Debug)]
pub enum ManifestError {
    Io(std::path::PathBuf, String),
    Parse(std::path::PathBuf, String),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ManifestError::Io(path, e) => write!(f, "failed to read {}: {e}", path.display()),
            ManifestError::Parse(path, e) => write!(f, "failed to parse {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for ManifestError {}

impl Manifest {
    /// Loads `dir/Scy.toml`. Every field is optional, so an empty file (or
    /// a file with only a `protocol` key) is a valid manifest.
    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join("Scy.toml");
        let content = fs::read_to_string(&path).map_err(|e| ManifestError::Io(path.clone(), e.to_string()))?;
        toml::from_str(&content).map_err(|e| ManifestError::Parse(path, e.to_string()))
    }
}

//! Model artifact discovery
//!
//! Each artifact path comes from, in order: its environment variable, the
//! first file in the models directory matching its glob pattern, a fixed
//! fallback file name in the models directory.

use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Serialize;

/// Where to look for one artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSpec {
    pub env_var: &'static str,
    pub pattern: &'static str,
    pub fallback: &'static str,
}

pub const RAIN_MODEL: PathSpec = PathSpec {
    env_var: "RAIN_MODEL_PATH",
    pattern: "*rain*classifier*.onnx",
    fallback: "rain_classifier.onnx",
};

pub const PRECIP_MODEL: PathSpec = PathSpec {
    env_var: "PRECIP_MODEL_PATH",
    pattern: "*precip*regressor*.onnx",
    fallback: "precipitation_regressor.onnx",
};

pub const RAIN_METADATA: PathSpec = PathSpec {
    env_var: "META_MODEL1_PATH",
    pattern: "*metadata*_model1*.json",
    fallback: "metadata_model1.json",
};

pub const PRECIP_METADATA: PathSpec = PathSpec {
    env_var: "META_MODEL2_PATH",
    pattern: "*metadata*_model2*.json",
    fallback: "metadata_model2.json",
};

/// First match of a glob pattern, in sorted order.
/// An invalid pattern matches nothing.
pub fn find_first(pattern: &str) -> Option<PathBuf> {
    let mut matches: Vec<PathBuf> = glob::glob(pattern)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    matches.sort();
    matches.into_iter().next()
}

impl PathSpec {
    /// Resolve against `models_dir`; `env_value` is the variable's value, if
    /// set. Empty values count as unset.
    pub fn resolve(&self, models_dir: &Path, env_value: Option<String>) -> PathBuf {
        if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
            return PathBuf::from(value);
        }

        let dir = Pattern::escape(&models_dir.to_string_lossy());
        let pattern = format!("{}/{}", dir, self.pattern);

        find_first(&pattern).unwrap_or_else(|| models_dir.join(self.fallback))
    }
}

/// Resolved locations of every artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelPaths {
    pub rain_model: PathBuf,
    pub precip_model: PathBuf,
    pub rain_metadata: PathBuf,
    pub precip_metadata: PathBuf,
}

impl ModelPaths {
    /// Resolve all paths, reading variables through `lookup`
    pub fn resolve<F>(models_dir: &Path, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |spec: PathSpec| spec.resolve(models_dir, lookup(spec.env_var));

        Self {
            rain_model: resolve(RAIN_MODEL),
            precip_model: resolve(PRECIP_MODEL),
            rain_metadata: resolve(RAIN_METADATA),
            precip_metadata: resolve(PRECIP_METADATA),
        }
    }

    /// Resolve all paths from the process environment
    pub fn from_env(models_dir: &Path) -> Self {
        Self::resolve(models_dir, |key| std::env::var(key).ok())
    }

    pub fn log(&self) {
        log::info!("Resolved paths:");
        log::info!(" {:<18}= {}", RAIN_MODEL.env_var, self.rain_model.display());
        log::info!(" {:<18}= {}", PRECIP_MODEL.env_var, self.precip_model.display());
        log::info!(" {:<18}= {}", RAIN_METADATA.env_var, self.rain_metadata.display());
        log::info!(" {:<18}= {}", PRECIP_METADATA.env_var, self.precip_metadata.display());
    }
}

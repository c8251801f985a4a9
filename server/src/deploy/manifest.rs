//! Project manifest inspection

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::SkiffError;
use crate::filesys::dir::Dir;

/// Detected application framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Next,
    React,
    Vite,
    Express,
    Node,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Next => "next",
            Framework::React => "react",
            Framework::Vite => "vite",
            Framework::Express => "express",
            Framework::Node => "node",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker packages checked in priority order. First match wins: a
/// project depending on both `next` and `vite` is always `next`.
const FRAMEWORK_MARKERS: &[(&str, Framework)] = &[
    ("next", Framework::Next),
    ("react-scripts", Framework::React),
    ("vite", Framework::Vite),
    ("express", Framework::Express),
];

/// Parsed package.json, limited to the fields the pipeline reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,

    /// Entry point, used by the express serve command
    pub main: Option<String>,

    #[serde(default)]
    pub dependencies: HashMap<String, String>,

    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: HashMap<String, String>,
}

impl PackageManifest {
    /// Classify the project by its merged runtime and dev dependencies
    pub fn detect_framework(&self) -> Framework {
        for (marker, framework) in FRAMEWORK_MARKERS {
            if self.dependencies.contains_key(*marker)
                || self.dev_dependencies.contains_key(*marker)
            {
                return *framework;
            }
        }
        Framework::Node
    }

    /// Entry point for plain node apps, defaulting as npm does
    pub fn entry_point(&self) -> &str {
        self.main.as_deref().unwrap_or("index.js")
    }
}

/// Read and parse the workspace's package.json
pub async fn inspect(workspace: &Path) -> Result<PackageManifest, SkiffError> {
    let manifest_file = Dir::new(workspace).file("package.json");
    if !manifest_file.exists().await {
        return Err(SkiffError::ManifestMissing);
    }

    let manifest: PackageManifest = manifest_file.read_json().await?;
    info!(
        "Inspected manifest: {} ({} deps, {} dev deps)",
        manifest.name.as_deref().unwrap_or("unnamed"),
        manifest.dependencies.len(),
        manifest.dev_dependencies.len()
    );

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with(deps: &[&str], dev_deps: &[&str]) -> PackageManifest {
        PackageManifest {
            name: None,
            main: None,
            dependencies: deps
                .iter()
                .map(|d| (d.to_string(), "1.0.0".to_string()))
                .collect(),
            dev_dependencies: dev_deps
                .iter()
                .map(|d| (d.to_string(), "1.0.0".to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_priority_tie_break() {
        // next always wins over vite, regardless of which map holds it
        let manifest = manifest_with(&["vite"], &["next"]);
        assert_eq!(manifest.detect_framework(), Framework::Next);
    }

    #[test]
    fn test_dev_dependencies_count() {
        let manifest = manifest_with(&[], &["react-scripts"]);
        assert_eq!(manifest.detect_framework(), Framework::React);
    }

    #[test]
    fn test_default_is_node() {
        let manifest = manifest_with(&["lodash"], &[]);
        assert_eq!(manifest.detect_framework(), Framework::Node);
    }
}

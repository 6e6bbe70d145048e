//! Batch manifests for the `dq run` command
//!
//! A manifest lists operations to submit in one go:
//!
//! ```yaml
//! operations:
//!   - name: quarterly-pack
//!     priority: 5
//!     inputs: [q1.pdf, q2.pdf]
//!     options:
//!       kind: merge
//!   - inputs: [scan.pdf]
//!     options:
//!       kind: rotate
//!       degrees: 90
//! ```
//!
//! Relative input paths resolve against the manifest's directory.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Document, NewOperation, OperationOptions};

/// A batch of operations to submit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchManifest {
    pub operations: Vec<ManifestEntry>,
}

/// One operation in a manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Label for output; defaults to `<index>-<kind>`
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub priority: i32,

    pub inputs: Vec<PathBuf>,

    pub options: OperationOptions,
}

impl BatchManifest {
    /// Load a manifest from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "BatchManifest::load: called");
        let content = fs::read_to_string(path).context(format!("Failed to read manifest {}", path.display()))?;
        Self::from_yaml(&content).context(format!("Failed to parse manifest {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let manifest: Self = serde_yaml::from_str(content)?;
        Ok(manifest)
    }

    /// Build every entry, reading inputs relative to `base_dir`
    pub fn build(&self, base_dir: &Path) -> Result<Vec<(String, NewOperation)>> {
        self.operations
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let label = entry.label(index);
                let op = entry
                    .to_new_operation(base_dir)
                    .context(format!("Invalid manifest entry '{}'", label))?;
                Ok((label, op))
            })
            .collect()
    }
}

impl ManifestEntry {
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", index + 1, self.options.kind()))
    }

    pub fn resolve_inputs(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.inputs
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { base_dir.join(p) })
            .collect()
    }

    /// Validate options and read input files into documents
    pub fn to_new_operation(&self, base_dir: &Path) -> Result<NewOperation> {
        let op = NewOperation::new(self.options.clone())?.with_priority(self.priority);

        let documents = self
            .resolve_inputs(base_dir)
            .into_iter()
            .map(|path| {
                let data = fs::read(&path).context(format!("Failed to read input {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Ok(Document::new(name, data))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(op.with_inputs(documents))
    }
}

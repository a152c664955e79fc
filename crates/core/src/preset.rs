//! Document preset registry and the file-backed placement store.
//!
//! Presets are the named document templates operators can mint signing
//! sessions from. The template metadata (canonical filename, PDF asset)
//! is fixed at build time; field placements live in a JSON file on disk
//! so layout can be tuned per deployment without a release.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::signing::FieldPlacement;

/// A named, pre-configured document template.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    /// Stable identifier used in URLs and the placement store.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Filename presented to signers and used when filing the document.
    pub canonical_filename: &'static str,
    /// PDF asset filename under the deployment's assets directory.
    pub asset_filename: &'static str,
}

/// All presets known to this deployment.
pub const PRESETS: &[Preset] = &[
    Preset {
        id: "non-disclosure-agreement",
        name: "Non-Disclosure Agreement",
        canonical_filename: "Non-Disclosure Agreement.pdf",
        asset_filename: "nda.pdf",
    },
    Preset {
        id: "service-agreement",
        name: "Service Agreement",
        canonical_filename: "Service Agreement.pdf",
        asset_filename: "service-agreement.pdf",
    },
    Preset {
        id: "direct-deposit-authorization",
        name: "Direct Deposit Authorization",
        canonical_filename: "Direct Deposit Authorization.pdf",
        asset_filename: "direct-deposit.pdf",
    },
];

/// Look up a preset by id.
pub fn find(id: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// File-backed mapping of preset id to configured field placements.
///
/// The backing file is a JSON object: `{ "<preset-id>": [placement, ...] }`.
/// A missing file or a missing key both mean "no placements configured",
/// which callers treat as a bad request rather than a deployment fault.
#[derive(Debug, Clone)]
pub struct PlacementStore {
    path: PathBuf,
}

impl PlacementStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Placements configured for one preset. Empty when none are.
    pub fn placements_for(&self, preset_id: &str) -> Result<Vec<FieldPlacement>, CoreError> {
        let mut map = self.load()?;
        Ok(map.remove(preset_id).unwrap_or_default())
    }

    fn load(&self) -> Result<HashMap<String, Vec<FieldPlacement>>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(CoreError::Internal(format!(
                    "Failed to read placement store {}: {e}",
                    self.path.display()
                )))
            }
        };
        serde_json::from_str(&raw).map_err(|e| {
            CoreError::Internal(format!(
                "Placement store {} is not valid JSON: {e}",
                self.path.display()
            ))
        })
    }
}

/// Resolve a preset's PDF asset path under the assets directory.
pub fn asset_path(assets_dir: &Path, preset: &Preset) -> PathBuf {
    assets_dir.join(preset.asset_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::FieldType;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn registry_resolves_known_ids() {
        let preset = find("non-disclosure-agreement").unwrap();
        assert_eq!(preset.canonical_filename, "Non-Disclosure Agreement.pdf");
        assert!(find("unknown-document").is_none());
    }

    #[test]
    fn missing_store_file_means_no_placements() {
        let store = PlacementStore::new("/nonexistent/placements.json");
        let placements = store.placements_for("non-disclosure-agreement").unwrap();
        assert!(placements.is_empty());
    }

    #[test]
    fn store_returns_configured_placements() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"non-disclosure-agreement": [
                {{"field_type": "signature", "page": 1, "x": 72.0, "y": 96.0, "width": 180.0, "height": 36.0}},
                {{"field_type": "date", "page": 1, "x": 300.0, "y": 96.0, "width": 90.0, "height": 24.0}}
            ]}}"#
        )
        .unwrap();

        let store = PlacementStore::new(file.path());
        let placements = store.placements_for("non-disclosure-agreement").unwrap();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].field_type, FieldType::Signature);

        // Unconfigured preset in a present file is still empty.
        assert!(store.placements_for("service-agreement").unwrap().is_empty());
    }

    #[test]
    fn malformed_store_is_an_internal_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let store = PlacementStore::new(file.path());
        assert_matches!(
            store.placements_for("non-disclosure-agreement"),
            Err(CoreError::Internal(_))
        );
    }
}

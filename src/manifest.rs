//! Vendor manifest: composer-style autoload map resolution.
//!
//! The manifest is a JSON document in composer shape; the engine reads a
//! single path through it — `autoload."psr-4"` — as a mapping from
//! backslash-terminated vendor-app namespace keys to source-root paths.
//! Parsing goes through an explicit schema and fails fast at this
//! boundary; the rest of the engine only ever sees the resolved mapping.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::OpError;

/// Composer document schema — only the parts the engine reads.
#[derive(Debug, Deserialize)]
struct ComposerDoc {
    #[serde(default)]
    autoload: AutoloadSection,
}

#[derive(Debug, Default, Deserialize)]
struct AutoloadSection {
    #[serde(rename = "psr-4", default)]
    psr4: BTreeMap<String, String>,
}

/// Mapping from vendor-app namespace keys to source-root paths.
///
/// Loaded once per run from a composer-style JSON document and never
/// mutated afterwards; the engine only reads it.
#[derive(Debug, Clone)]
pub struct VendorManifest {
    roots: BTreeMap<String, String>,
}

impl VendorManifest {
    /// Load the manifest from a composer-style JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::NotFound`] when `uri` does not lead to a plain
    /// file, [`OpError::Corrupt`] when the document cannot be parsed into
    /// the expected shape, and [`OpError::Io`] when the file cannot be
    /// read.
    pub fn load(uri: &str) -> Result<Self, OpError> {
        let path = Path::new(uri);
        if !path.is_file() {
            return Err(OpError::NotFound(
                "composer file not found or uri leads not to a file".to_string(),
            ));
        }
        let raw = fs::read_to_string(path).map_err(|source| OpError::io(uri, source))?;
        let doc: ComposerDoc = serde_json::from_str(&raw)
            .map_err(|_| OpError::Corrupt("file corrupted".to_string()))?;
        tracing::debug!("loaded vendor manifest from `{uri}`");
        Ok(Self {
            roots: doc.autoload.psr4,
        })
    }

    /// Build a manifest directly from a namespace-to-path map.
    #[must_use]
    pub const fn from_map(roots: BTreeMap<String, String>) -> Self {
        Self { roots }
    }

    /// Resolve a vendor-app key to its source root.
    ///
    /// The key is normalized to backslash-terminated form before lookup,
    /// so `Vendor\App` and `Vendor\App\` resolve identically.
    ///
    /// # Errors
    ///
    /// Returns [`OpError::NotFound`] when the key is absent or maps to an
    /// empty path.
    pub fn resolve(&self, vendor_app: &str) -> Result<&str, OpError> {
        let key = format!("{}\\", vendor_app.trim_end_matches('\\'));
        self.roots
            .get(&key)
            .map(String::as_str)
            .filter(|root| !root.is_empty())
            .ok_or_else(|| OpError::NotFound("app not found in composer".to_string()))
    }
}

//! Lookup of existing assets by filename

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ImportError, Result};

/// Resolves an expected filename to a stored asset id
pub trait AssetResolver {
    /// Positive asset id for `filename`, or `None` if the library has no match
    fn resolve(&self, filename: &str) -> Option<u64>;
}

/// Resolver backed by a JSON manifest of `filename -> id`
///
/// Lookups ignore case; ids of 0 are dropped since 0 means "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestResolver {
    ids: HashMap<String, u64>,
}

impl ManifestResolver {
    /// Build a resolver from filename/id pairs
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let ids = entries
            .into_iter()
            .filter(|(_, id)| *id > 0)
            .map(|(name, id)| (name.as_ref().to_lowercase(), id))
            .collect();
        Self { ids }
    }

    /// Parse a manifest from JSON text
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Config` if the JSON is not an object of ids.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let entries: HashMap<String, u64> = serde_json::from_str(content)
            .map_err(|e| ImportError::Config(format!("invalid asset manifest: {e}")))?;
        Ok(Self::new(entries))
    }

    /// Load a manifest from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Io` if the file cannot be read and
    /// `ImportError::Config` if it is not a valid manifest.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Number of known assets
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the manifest is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl AssetResolver for ManifestResolver {
    fn resolve(&self, filename: &str) -> Option<u64> {
        self.ids.get(&filename.to_lowercase()).copied()
    }
}

impl<F> AssetResolver for F
where
    F: Fn(&str) -> Option<u64>,
{
    fn resolve(&self, filename: &str) -> Option<u64> {
        self(filename)
    }
}

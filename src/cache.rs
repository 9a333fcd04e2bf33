use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{GenerateError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub hash: String,
    /// Generated files derived from this source, relative to the output root
    #[serde(default)]
    pub outputs: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    #[serde(default)]
    options_hash: String,
    #[serde(default)]
    entries: BTreeMap<String, CacheEntry>,
}

/// Content fingerprints of the sources seen by the previous session, plus a
/// fingerprint of the options their outputs were rendered with. Decides which
/// files count as new for the next pass.
pub struct IncrementalCache {
    cache_path: PathBuf,
    options_hash: String,
    entries: BTreeMap<String, CacheEntry>,
}

impl IncrementalCache {
    /// Load the cache at `cache_path`. A missing file is an empty cache; a
    /// corrupt one is discarded.
    pub fn load(cache_path: impl Into<PathBuf>) -> Self {
        let cache_path = cache_path.into();
        let file: CacheFile = match fs::read_to_string(&cache_path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(file) => file,
                Err(e) => {
                    warn!(
                        path = %cache_path.display(),
                        error = %e,
                        "discarding corrupt fingerprint cache"
                    );
                    CacheFile::default()
                }
            },
            Err(_) => CacheFile::default(),
        };
        Self {
            cache_path,
            options_hash: file.options_hash,
            entries: file.entries,
        }
    }

    pub fn compute_hash(source: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Fingerprint of a serializable configuration.
    pub fn hash_options<T: Serialize>(options: &T) -> Result<String> {
        Ok(Self::compute_hash(&serde_json::to_string(options)?))
    }

    pub fn options_hash(&self) -> &str {
        &self.options_hash
    }

    /// Record the options fingerprint for the coming session. When it differs
    /// from the stored one, every entry is dropped and returned, since none of
    /// the recorded outputs match the new options.
    pub fn update_options(&mut self, options_hash: &str) -> Vec<(String, CacheEntry)> {
        if self.options_hash == options_hash {
            return Vec::new();
        }
        self.options_hash = options_hash.to_string();
        std::mem::take(&mut self.entries).into_iter().collect()
    }

    pub fn is_unchanged(&self, file_path: &str, source: &str) -> bool {
        self.entries
            .get(file_path)
            .is_some_and(|entry| entry.hash == Self::compute_hash(source))
    }

    pub fn outputs_of(&self, file_path: &str) -> &[String] {
        self.entries
            .get(file_path)
            .map(|entry| entry.outputs.as_slice())
            .unwrap_or(&[])
    }

    pub fn set(&mut self, file_path: &str, source: &str, outputs: Vec<String>) {
        let hash = Self::compute_hash(source);
        self.entries
            .insert(file_path.to_string(), CacheEntry { hash, outputs });
    }

    /// Drop entries for files that no longer exist and return them.
    pub fn remove_missing(&mut self, existing: &BTreeSet<String>) -> Vec<(String, CacheEntry)> {
        let missing: Vec<String> = self
            .entries
            .keys()
            .filter(|path| !existing.contains(*path))
            .cloned()
            .collect();
        missing
            .into_iter()
            .filter_map(|path| self.entries.remove(&path).map(|entry| (path, entry)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
        }
        let data = serde_json::to_string_pretty(&CacheFile {
            options_hash: self.options_hash.clone(),
            entries: self.entries.clone(),
        })?;
        fs::write(&self.cache_path, data).map_err(|e| GenerateError::io(&self.cache_path, e))
    }
}

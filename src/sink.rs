//! File emission sinks
//!
//! The processor never touches the file system. It hands each generated unit to
//! a `CodeGenerator`, which decides where the bytes go.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GenerateError, Result};

/// Source files a generated unit is derived from. Non-aggregating units are
/// regenerated only when one of `sources` changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependencies {
    pub aggregating: bool,
    pub sources: Vec<String>,
}

impl Dependencies {
    pub fn single_file(path: impl Into<String>) -> Self {
        Self {
            aggregating: false,
            sources: vec![path.into()],
        }
    }
}

pub trait CodeGenerator {
    /// Write one generated unit under `(package_name, file_name)`. The package
    /// is the raw, unescaped path.
    fn create_new_file(
        &mut self,
        dependencies: Dependencies,
        package_name: &str,
        file_name: &str,
        content: &str,
    ) -> Result<()>;
}

impl<T: CodeGenerator + ?Sized> CodeGenerator for &mut T {
    fn create_new_file(
        &mut self,
        dependencies: Dependencies,
        package_name: &str,
        file_name: &str,
        content: &str,
    ) -> Result<()> {
        (**self).create_new_file(dependencies, package_name, file_name, content)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY SINK
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedUnit {
    pub package_name: String,
    pub file_name: String,
    pub content: String,
    pub dependencies: Dependencies,
}

/// Collects generated units in emission order.
#[derive(Debug, Default)]
pub struct MemoryCodeGenerator {
    pub units: Vec<GeneratedUnit>,
    created: HashSet<(String, String)>,
}

impl MemoryCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, file_name: &str) -> Option<&GeneratedUnit> {
        self.units.iter().find(|unit| unit.file_name == file_name)
    }

    pub fn into_units(self) -> Vec<GeneratedUnit> {
        self.units
    }
}

impl CodeGenerator for MemoryCodeGenerator {
    fn create_new_file(
        &mut self,
        dependencies: Dependencies,
        package_name: &str,
        file_name: &str,
        content: &str,
    ) -> Result<()> {
        let key = (package_name.to_string(), file_name.to_string());
        if !self.created.insert(key) {
            return Err(GenerateError::FileAlreadyExists {
                package_name: package_name.to_string(),
                file_name: file_name.to_string(),
            });
        }

        self.units.push(GeneratedUnit {
            package_name: package_name.to_string(),
            file_name: file_name.to_string(),
            content: content.to_string(),
            dependencies,
        });
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FILESYSTEM SINK
// ═══════════════════════════════════════════════════════════════════════════════

/// A file written by `FileSystemCodeGenerator`, with the sources it derives from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub sources: Vec<String>,
}

/// Writes `<root>/<package dirs>/<file_name>.<extension>`. Files from earlier
/// sessions are overwritten; writing the same unit twice in one session fails.
pub struct FileSystemCodeGenerator {
    root: PathBuf,
    extension: String,
    created: HashSet<(String, String)>,
    written: Vec<WrittenFile>,
}

impl FileSystemCodeGenerator {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            created: HashSet::new(),
            written: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written so far, in emission order.
    pub fn written(&self) -> &[WrittenFile] {
        &self.written
    }

    pub fn path_for(&self, package_name: &str, file_name: &str) -> PathBuf {
        let mut path = self.root.clone();
        for segment in package_name.split('.').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{}.{}", file_name, self.extension));
        path
    }
}

impl CodeGenerator for FileSystemCodeGenerator {
    fn create_new_file(
        &mut self,
        dependencies: Dependencies,
        package_name: &str,
        file_name: &str,
        content: &str,
    ) -> Result<()> {
        let key = (package_name.to_string(), file_name.to_string());
        if self.created.contains(&key) {
            return Err(GenerateError::FileAlreadyExists {
                package_name: key.0,
                file_name: key.1,
            });
        }

        let path = self.path_for(package_name, file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
        }
        fs::write(&path, content).map_err(|e| GenerateError::io(&path, e))?;

        self.created.insert(key);
        self.written.push(WrittenFile {
            path,
            sources: dependencies.sources,
        });
        Ok(())
    }
}

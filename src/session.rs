//! Filesystem generation session
//!
//! Host loop for building straight from a source tree: discover, partition
//! into new and unchanged files by content hash, run one processor pass over
//! the new ones, then retire outputs whose sources changed or disappeared.
//! A change of options, or a recorded output missing from disk, makes the
//! affected files new again.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

use crate::cache::IncrementalCache;
use crate::discovery::{find_kotlin_files, logical_path, parse_source_file};
use crate::error::{GenerateError, Result};
use crate::options::GeneratorOptions;
use crate::processor::LoggerProcessorProvider;
use crate::sink::FileSystemCodeGenerator;

/// Fingerprint cache location, inside the output root.
pub const CACHE_FILE_NAME: &str = ".logging-extensions-cache.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub files_removed: usize,
    pub generated: usize,
    pub skipped: usize,
    /// Files written in this session, relative to the output root
    pub outputs: Vec<String>,
}

pub fn generate_for_directory(
    source_root: &Path,
    output_root: &Path,
    options: &GeneratorOptions,
) -> Result<GenerationReport> {
    let mut cache = IncrementalCache::load(output_root.join(CACHE_FILE_NAME));
    let mut report = GenerationReport::default();

    let options_hash = IncrementalCache::hash_options(options)?;
    let retired = cache.update_options(&options_hash);
    if !retired.is_empty() {
        info!(files = retired.len(), "options changed, regenerating everything");
    }
    for (_, entry) in &retired {
        remove_outputs(output_root, &entry.outputs)?;
    }

    let mut existing = BTreeSet::new();
    let mut new_files = Vec::new();
    let mut changed_sources = Vec::new();
    for path in find_kotlin_files(source_root) {
        let (file, source) = parse_source_file(source_root, &path)?;
        report.files_scanned += 1;
        existing.insert(file.path.clone());
        if is_fresh(&cache, output_root, &file.path, &source) {
            continue;
        }
        changed_sources.push((file.path.clone(), source));
        new_files.push(file);
    }
    report.files_changed = new_files.len();

    let removed = cache.remove_missing(&existing);
    report.files_removed = removed.len();
    for (_, entry) in &removed {
        remove_outputs(output_root, &entry.outputs)?;
    }
    for (file_path, _) in &changed_sources {
        remove_outputs(output_root, cache.outputs_of(file_path))?;
    }

    let code_generator = FileSystemCodeGenerator::new(output_root, options.file_extension.clone());
    let mut processor = LoggerProcessorProvider.create(code_generator, options.clone());
    let summary = processor.generate(&new_files)?;
    report.generated = summary.generated;
    report.skipped = summary.skipped;

    let mut outputs_by_source: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for written in processor.code_generator().written() {
        let output = logical_path(output_root, &written.path);
        for source in &written.sources {
            outputs_by_source
                .entry(source.clone())
                .or_default()
                .push(output.clone());
        }
        report.outputs.push(output);
    }

    for (file_path, source) in &changed_sources {
        let outputs = outputs_by_source.remove(file_path).unwrap_or_default();
        cache.set(file_path, source, outputs);
    }
    cache.save()?;

    info!(
        scanned = report.files_scanned,
        changed = report.files_changed,
        removed = report.files_removed,
        generated = report.generated,
        "generation session complete"
    );
    Ok(report)
}

/// Unchanged source whose recorded outputs are all still on disk.
fn is_fresh(cache: &IncrementalCache, output_root: &Path, file_path: &str, source: &str) -> bool {
    cache.is_unchanged(file_path, source)
        && cache
            .outputs_of(file_path)
            .iter()
            .all(|output| output_root.join(output).is_file())
}

fn remove_outputs(output_root: &Path, outputs: &[String]) -> Result<()> {
    for output in outputs {
        let path = output_root.join(output);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(GenerateError::io(path, e)),
        }
    }
    Ok(())
}

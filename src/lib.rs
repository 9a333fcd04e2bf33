//! # Kotlin Logging Extensions Generator
//!
//! For every class-like declaration that can be named from outside its file,
//! emits one Kotlin source file holding a `log` extension property:
//!
//! ```text
//! package com.example
//!
//! import io.github.oshai.kotlinlogging.KLogger
//! import io.github.oshai.kotlinlogging.KotlinLogging
//!
//! val <T> Outer<T>.log: KLogger
//!     get() = KotlinLogging.logger("com.example.Outer")
//! ```
//!
//! ## Pipeline
//!
//! 1. **Symbols** (`symbols`): a per-file declaration tree, either supplied by
//!    the host or parsed by `scanner` from Kotlin source with tree-sitter.
//! 2. **Identity** (`identity`): visibility, receiver type, file name and
//!    logger name for one declaration, or a reason it is skipped.
//! 3. **Render** (`codegen`): the Kotlin text for one identity.
//! 4. **Emit** (`processor` into a `sink::CodeGenerator`): one unit per class,
//!    keyed by raw package name and file name, in discovery order.
//!
//! `session` drives the whole thing over a directory, using `cache` to treat
//! only changed files as new.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod cache;
mod codegen;
mod discovery;
mod error;
mod identifiers;
mod identity;
mod options;
mod processor;
mod scanner;
mod session;
mod sink;
mod symbols;


pub use cache::{CacheEntry, IncrementalCache};
pub use codegen::render_logger_extension;
pub use discovery::{find_kotlin_files, logical_path, parse_source_file, scan_directory};
pub use error::{GenerateError, Result};
pub use identifiers::{
    escape_identifier, escape_package_path, escape_reserved_segments, kotlin_string_literal,
    BACKTICK, KOTLIN_HARD_KEYWORDS,
};
pub use identity::{
    build_receiver, resolve_identity, resolve_visibility, EmissionIdentity, ExtensionVisibility,
    ReceiverDeclaration, SkipReason,
};
pub use options::{
    GeneratorOptions, DEFAULT_FILE_SUFFIX, DEFAULT_LOGGER_FACTORY, DEFAULT_LOGGER_TYPE,
};
pub use processor::{LoggerProcessor, LoggerProcessorProvider, PassSummary, SymbolProcessor};
pub use scanner::scan_source;
pub use session::{generate_for_directory, GenerationReport, CACHE_FILE_NAME};
pub use sink::{
    CodeGenerator, Dependencies, FileSystemCodeGenerator, GeneratedUnit, MemoryCodeGenerator,
    WrittenFile,
};
pub use symbols::{
    ClassDeclarations, Declaration, DeclarationKind, DiscoveredClass, SourceFile, TypeParameter,
    Visibility,
};

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn options_from_value(options_json: Option<serde_json::Value>) -> napi::Result<GeneratorOptions> {
    match options_json {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| napi::Error::from_reason(format!("Invalid options: {}", e))),
        None => Ok(GeneratorOptions::default()),
    }
}

/// Generate extensions for every `.kt` file under `source_dir` into
/// `output_dir`. Returns the session report.
#[cfg(feature = "napi")]
#[napi]
pub fn generate_logging_extensions_native(
    source_dir: String,
    output_dir: String,
    options_json: Option<serde_json::Value>,
) -> napi::Result<serde_json::Value> {
    let options = options_from_value(options_json)?;
    let report = generate_for_directory(
        std::path::Path::new(&source_dir),
        std::path::Path::new(&output_dir),
        &options,
    )
    .map_err(|e| napi::Error::from_reason(e.to_string()))?;

    serde_json::to_value(report).map_err(|e| napi::Error::from_reason(e.to_string()))
}

/// Render extensions for host-supplied symbol trees without touching disk.
/// Returns the generated units in emission order.
#[cfg(feature = "napi")]
#[napi]
pub fn render_logging_extensions_native(
    files_json: serde_json::Value,
    options_json: Option<serde_json::Value>,
) -> napi::Result<serde_json::Value> {
    let files: Vec<SourceFile> = serde_json::from_value(files_json)
        .map_err(|e| napi::Error::from_reason(format!("Invalid source files: {}", e)))?;
    let options = options_from_value(options_json)?;

    let mut processor = LoggerProcessorProvider.create(MemoryCodeGenerator::new(), options);
    processor
        .generate(&files)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;

    serde_json::to_value(processor.into_code_generator().into_units())
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}

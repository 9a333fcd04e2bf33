//! Declaration Processor
//!
//! One incremental pass: walk the new files, resolve an emission identity for
//! every class-like declaration, render and emit. Identities are computed in
//! parallel; emission is sequential in discovery order so the sink sees the same
//! call sequence on every run.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::codegen::render_logger_extension;
use crate::error::Result;
use crate::identity::{resolve_identity, EmissionIdentity};
use crate::options::GeneratorOptions;
use crate::sink::{CodeGenerator, Dependencies};
use crate::symbols::{DiscoveredClass, SourceFile};

/// A processor driven by the host once per round.
pub trait SymbolProcessor {
    /// Process the files first seen in this round. Returns qualified names of
    /// declarations that need another round.
    fn process(&mut self, new_files: &[SourceFile]) -> Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub generated: usize,
    pub skipped: usize,
}

pub struct LoggerProcessor<G: CodeGenerator> {
    code_generator: G,
    options: GeneratorOptions,
}

impl<G: CodeGenerator> LoggerProcessor<G> {
    pub fn new(code_generator: G, options: GeneratorOptions) -> Self {
        Self {
            code_generator,
            options,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn code_generator(&self) -> &G {
        &self.code_generator
    }

    pub fn into_code_generator(self) -> G {
        self.code_generator
    }

    /// Run one pass over `new_files`. A sink failure aborts the pass; units
    /// already handed to the sink stay written.
    pub fn generate(&mut self, new_files: &[SourceFile]) -> Result<PassSummary> {
        let classes: Vec<DiscoveredClass<'_>> = new_files
            .iter()
            .flat_map(SourceFile::class_declarations)
            .collect();

        let options = &self.options;
        let rendered: Vec<_> = classes
            .par_iter()
            .map(|class| {
                resolve_identity(class, options).map(|identity| {
                    let content = render_logger_extension(&identity, options);
                    (identity, content)
                })
            })
            .collect();

        let mut summary = PassSummary::default();
        for (class, outcome) in classes.iter().zip(rendered) {
            match outcome {
                Ok((identity, content)) => {
                    self.emit(&identity, &content)?;
                    summary.generated += 1;
                }
                Err(reason) => {
                    debug!(
                        file = %class.file.path,
                        declaration = %class.declaration().simple_name,
                        %reason,
                        "skipping declaration"
                    );
                    summary.skipped += 1;
                }
            }
        }

        info!(
            files = new_files.len(),
            generated = summary.generated,
            skipped = summary.skipped,
            "logging extensions pass complete"
        );
        Ok(summary)
    }

    fn emit(&mut self, identity: &EmissionIdentity, content: &str) -> Result<()> {
        trace!(
            package = %identity.package_name,
            file = %identity.file_name,
            logger = %identity.logger_name,
            "emitting logging extension"
        );
        self.code_generator.create_new_file(
            Dependencies::single_file(identity.dependency.clone()),
            &identity.package_name,
            &identity.file_name,
            content,
        )
    }
}

impl<G: CodeGenerator> SymbolProcessor for LoggerProcessor<G> {
    fn process(&mut self, new_files: &[SourceFile]) -> Result<Vec<String>> {
        self.generate(new_files)?;
        // Generated units carry no annotations, so nothing is ever deferred.
        Ok(Vec::new())
    }
}

/// Host-facing factory, called once per compilation session.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggerProcessorProvider;

impl LoggerProcessorProvider {
    pub fn create<G: CodeGenerator>(
        &self,
        code_generator: G,
        options: GeneratorOptions,
    ) -> LoggerProcessor<G> {
        LoggerProcessor::new(code_generator, options)
    }
}

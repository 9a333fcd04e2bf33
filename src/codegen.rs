//! Codegen module for the logging extensions generator
//!
//! Renders the Kotlin source of one generated unit from its emission identity.
//! Output is a pure function of the identity and options.

use crate::identifiers::kotlin_string_literal;
use crate::identity::EmissionIdentity;
use crate::options::GeneratorOptions;

/// Render the generated unit:
///
/// ```text
/// package com.example
///
/// import io.github.oshai.kotlinlogging.KLogger
/// import io.github.oshai.kotlinlogging.KotlinLogging
///
/// val SimpleClass.log: KLogger
///     get() = KotlinLogging.logger("com.example.SimpleClass")
/// ```
pub fn render_logger_extension(identity: &EmissionIdentity, options: &GeneratorOptions) -> String {
    let mut lines = Vec::with_capacity(7);

    // A bare `package` directive is not valid Kotlin.
    if !identity.escaped_package_name.is_empty() {
        lines.push(format!("package {}", identity.escaped_package_name));
        lines.push(String::new());
    }

    lines.push(format!("import {}", options.logger_type));
    lines.push(format!("import {}", options.logger_factory));
    lines.push(String::new());
    lines.push(format!(
        "{}val {}{}.{}: {}",
        identity.visibility.prefix(),
        identity.receiver.type_parameter_prefix(),
        identity.receiver.receiver_type,
        options.property_name,
        options.logger_type_name(),
    ));
    lines.push(format!(
        "    get() = {}.logger({})",
        options.logger_factory_name(),
        kotlin_string_literal(&identity.logger_name),
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::resolve_identity;
    use crate::symbols::{Declaration, SourceFile, Visibility};

    fn render_first(file: &SourceFile) -> String {
        let options = GeneratorOptions::default();
        let class = file.class_declarations().last().unwrap();
        let identity = resolve_identity(&class, &options).unwrap();
        render_logger_extension(&identity, &options)
    }

    #[test]
    fn test_simple_class_unit() {
        let file = SourceFile::new("SimpleClass.kt", "com.example")
            .with_declaration(Declaration::class("SimpleClass", "com.example.SimpleClass"));

        let expected = "package com.example\n\
                        \n\
                        import io.github.oshai.kotlinlogging.KLogger\n\
                        import io.github.oshai.kotlinlogging.KotlinLogging\n\
                        \n\
                        val SimpleClass.log: KLogger\n    get() = KotlinLogging.logger(\"com.example.SimpleClass\")";
        assert_eq!(render_first(&file), expected);
    }

    #[test]
    fn test_internal_generic_unit() {
        let file = SourceFile::new("Box.kt", "com.example").with_declaration(
            Declaration::class("Box", "com.example.Box")
                .with_visibility(Visibility::Internal)
                .with_type_parameters(["T"])
                .with_nested(Declaration::class("Lid", "com.example.Box.Lid").with_type_parameters(["T"])),
        );

        let code = render_first(&file);
        assert!(code.contains("internal val <T, T2> Box<T>.Lid<T2>.log: KLogger"));
        assert!(code.contains("KotlinLogging.logger(\"com.example.Box.Lid\")"));
    }

    #[test]
    fn test_root_package_has_no_package_directive() {
        let file = SourceFile::new("Root.kt", "").with_declaration(Declaration::class("Root", "Root"));

        let code = render_first(&file);
        assert!(code.starts_with("import io.github.oshai.kotlinlogging.KLogger\n"));
        assert!(!code.contains("package"));
    }

    #[test]
    fn test_custom_logging_library() {
        let file = SourceFile::new("A.kt", "p").with_declaration(Declaration::class("A", "p.A"));
        let options = GeneratorOptions {
            logger_type: "org.acme.Log".to_string(),
            logger_factory: "org.acme.LogFactory".to_string(),
            property_name: "logger".to_string(),
            ..GeneratorOptions::default()
        };
        let class = file.class_declarations().next().unwrap();
        let identity = resolve_identity(&class, &options).unwrap();
        let code = render_logger_extension(&identity, &options);

        assert!(code.contains("import org.acme.Log\nimport org.acme.LogFactory\n"));
        assert!(code.contains("val A.logger: Log\n    get() = LogFactory.logger(\"p.A\")"));
    }
}

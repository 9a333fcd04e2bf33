//! Emission Identity
//!
//! Everything needed to name, scope and key one generated unit, derived from a
//! discovered declaration and its enclosing chain. Identities are recomputed on
//! every pass and never cached.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::identifiers::{escape_identifier, escape_package_path};
use crate::options::GeneratorOptions;
use crate::symbols::{Declaration, DeclarationKind, DiscoveredClass, Visibility};

// ═══════════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Visibility of the generated top-level extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtensionVisibility {
    Public,
    Internal,
}

impl ExtensionVisibility {
    /// Modifier text placed before `val`, including its trailing space.
    pub fn prefix(self) -> &'static str {
        match self {
            ExtensionVisibility::Public => "",
            ExtensionVisibility::Internal => "internal ",
        }
    }
}

/// Why a discovered declaration gets no generated unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoQualifiedName,
    EnumEntry,
    /// Some level of the enclosing chain has a visibility that a top-level
    /// extension cannot express.
    InexpressibleVisibility {
        declaration: String,
        visibility: Visibility,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoQualifiedName => write!(f, "no qualified name"),
            SkipReason::EnumEntry => write!(f, "enum entry"),
            SkipReason::InexpressibleVisibility {
                declaration,
                visibility,
            } => write!(f, "{} is {:?}", declaration, visibility),
        }
    }
}

/// Receiver of the generated extension, e.g. `<T, T2> Outer<T>.Inner<T2>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverDeclaration {
    /// Chain-unique type parameter names in first-introduced order
    pub type_parameters: Vec<String>,
    pub receiver_type: String,
}

impl ReceiverDeclaration {
    /// `<T, U> ` (with trailing space) or empty when nothing is generic.
    pub fn type_parameter_prefix(&self) -> String {
        if self.type_parameters.is_empty() {
            String::new()
        } else {
            format!("<{}> ", self.type_parameters.join(", "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionIdentity {
    pub visibility: ExtensionVisibility,
    pub receiver: ReceiverDeclaration,
    /// Package as declared; used for file placement
    pub package_name: String,
    /// Package as written in the generated `package` directive
    pub escaped_package_name: String,
    /// Qualified name without the package, e.g. `Outer.Nested`
    pub class_name: String,
    pub file_name: String,
    /// Runtime logger name; the qualified name verbatim
    pub logger_name: String,
    /// Path of the file the declaration lives in
    pub dependency: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Compute the emission identity of `class`, or the reason it is skipped.
pub fn resolve_identity(
    class: &DiscoveredClass<'_>,
    options: &GeneratorOptions,
) -> Result<EmissionIdentity, SkipReason> {
    let declaration = class.declaration();
    let qualified_name = declaration
        .qualified_name
        .as_deref()
        .ok_or(SkipReason::NoQualifiedName)?;
    if declaration.kind == DeclarationKind::EnumEntry {
        return Err(SkipReason::EnumEntry);
    }

    let visibility = resolve_visibility(&class.chain)?;
    let receiver = build_receiver(class.outermost_first());

    let package_name = class.package_name();
    let class_name = strip_package(qualified_name, package_name);
    let file_name = format!("{}{}", class_name.replace('.', "_"), options.file_suffix);

    Ok(EmissionIdentity {
        visibility,
        receiver,
        package_name: package_name.to_string(),
        escaped_package_name: escape_package_path(package_name),
        class_name: class_name.to_string(),
        file_name,
        logger_name: qualified_name.to_string(),
        dependency: class.file.path.clone(),
    })
}

/// Walk the chain innermost first. The first private, protected or local level
/// ends the walk; any internal level makes the extension internal.
pub fn resolve_visibility(chain: &[&Declaration]) -> Result<ExtensionVisibility, SkipReason> {
    let mut internal = false;
    for level in chain {
        match level.visibility {
            Visibility::Private | Visibility::Protected | Visibility::Local => {
                return Err(SkipReason::InexpressibleVisibility {
                    declaration: level.simple_name.clone(),
                    visibility: level.visibility,
                });
            }
            Visibility::Internal => internal = true,
            Visibility::Public => {}
        }
    }

    Ok(if internal {
        ExtensionVisibility::Internal
    } else {
        ExtensionVisibility::Public
    })
}

/// Build the receiver type from the chain, outermost first.
pub fn build_receiver<'a>(chain: impl IntoIterator<Item = &'a Declaration>) -> ReceiverDeclaration {
    let mut names = TypeParameterNames::default();
    let mut type_parameters = Vec::new();
    let mut segments = Vec::new();

    for declaration in chain {
        let own: Vec<String> = declaration
            .type_parameters
            .iter()
            .map(|parameter| escape_identifier(&names.claim(&parameter.name)))
            .collect();
        type_parameters.extend(own.iter().cloned());

        let name = escape_identifier(&declaration.simple_name);
        if own.is_empty() {
            segments.push(name);
        } else {
            segments.push(format!("{}<{}>", name, own.join(", ")));
        }
    }

    ReceiverDeclaration {
        type_parameters,
        receiver_type: segments.join("."),
    }
}

fn strip_package<'a>(qualified_name: &'a str, package_name: &str) -> &'a str {
    if package_name.is_empty() {
        return qualified_name;
    }
    qualified_name
        .strip_prefix(package_name)
        .and_then(|rest| rest.strip_prefix('.'))
        .unwrap_or(qualified_name)
}

/// Hands out chain-unique type parameter names. The second `T` becomes `T2`,
/// the third `T3`; a suffixed name that is itself taken is skipped over.
#[derive(Default)]
struct TypeParameterNames {
    used: HashSet<String>,
    occurrences: HashMap<String, usize>,
}

impl TypeParameterNames {
    fn claim(&mut self, base: &str) -> String {
        let seen = self.occurrences.entry(base.to_string()).or_insert(0);
        *seen += 1;

        let mut index = *seen;
        loop {
            let candidate = if index == 1 {
                base.to_string()
            } else {
                format!("{}{}", base, index)
            };
            if self.used.insert(candidate.clone()) {
                *seen = index;
                return candidate;
            }
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::SourceFile;

    fn identity_of(file: &SourceFile, simple_name: &str) -> Result<EmissionIdentity, SkipReason> {
        let class = file
            .class_declarations()
            .find(|c| c.declaration().simple_name == simple_name)
            .unwrap();
        resolve_identity(&class, &GeneratorOptions::default())
    }

    #[test]
    fn test_top_level_class() {
        let file = SourceFile::new("SimpleClass.kt", "com.example")
            .with_declaration(Declaration::class("SimpleClass", "com.example.SimpleClass"));
        let identity = identity_of(&file, "SimpleClass").unwrap();

        assert_eq!(identity.visibility, ExtensionVisibility::Public);
        assert_eq!(identity.receiver.receiver_type, "SimpleClass");
        assert_eq!(identity.receiver.type_parameter_prefix(), "");
        assert_eq!(identity.class_name, "SimpleClass");
        assert_eq!(identity.file_name, "SimpleClassKotlinLoggingExtensions");
        assert_eq!(identity.logger_name, "com.example.SimpleClass");
        assert_eq!(identity.dependency, "SimpleClass.kt");
    }

    #[test]
    fn test_nested_class_naming() {
        let file = SourceFile::new("Nested.kt", "com.example").with_declaration(
            Declaration::class("Outer", "com.example.Outer")
                .with_nested(Declaration::class("Nested", "com.example.Outer.Nested")),
        );
        let identity = identity_of(&file, "Nested").unwrap();

        assert_eq!(identity.receiver.receiver_type, "Outer.Nested");
        assert_eq!(identity.class_name, "Outer.Nested");
        assert_eq!(identity.file_name, "Outer_NestedKotlinLoggingExtensions");
        assert_eq!(identity.logger_name, "com.example.Outer.Nested");
    }

    #[test]
    fn test_root_package_keeps_full_name() {
        let file = SourceFile::new("Root.kt", "")
            .with_declaration(Declaration::class("Root", "Root").with_nested(Declaration::class("Leaf", "Root.Leaf")));
        let identity = identity_of(&file, "Leaf").unwrap();

        assert_eq!(identity.class_name, "Root.Leaf");
        assert_eq!(identity.file_name, "Root_LeafKotlinLoggingExtensions");
        assert_eq!(identity.escaped_package_name, "");
    }

    #[test]
    fn test_reserved_package_is_escaped_only_in_directive() {
        let file = SourceFile::new("Reserved.kt", "com.example.fun")
            .with_declaration(Declaration::class("ReservedClass", "com.example.fun.ReservedClass"));
        let identity = identity_of(&file, "ReservedClass").unwrap();

        assert_eq!(identity.package_name, "com.example.fun");
        assert_eq!(identity.escaped_package_name, "com.example.`fun`");
        assert_eq!(identity.logger_name, "com.example.fun.ReservedClass");
        assert_eq!(identity.escaped_package_name.replace('`', ""), identity.package_name);
    }

    #[test]
    fn test_generic_nested_receiver() {
        let file = SourceFile::new("G.kt", "com.example").with_declaration(
            Declaration::class("Outer", "com.example.Outer")
                .with_type_parameters(["T"])
                .with_nested(Declaration::class("Nested", "com.example.Outer.Nested").with_type_parameters(["U"])),
        );
        let identity = identity_of(&file, "Nested").unwrap();

        assert_eq!(identity.receiver.type_parameter_prefix(), "<T, U> ");
        assert_eq!(identity.receiver.receiver_type, "Outer<T>.Nested<U>");
    }

    #[test]
    fn test_shadowed_type_parameters_are_renamed() {
        let file = SourceFile::new("G.kt", "p").with_declaration(
            Declaration::class("A", "p.A").with_type_parameters(["T"]).with_nested(
                Declaration::class("B", "p.A.B")
                    .with_type_parameters(["T", "K"])
                    .with_nested(Declaration::class("C", "p.A.B.C").with_type_parameters(["T", "K"])),
            ),
        );

        let b = identity_of(&file, "B").unwrap();
        assert_eq!(b.receiver.type_parameters, vec!["T", "T2", "K"]);
        assert_eq!(b.receiver.receiver_type, "A<T>.B<T2, K>");

        let c = identity_of(&file, "C").unwrap();
        assert_eq!(c.receiver.type_parameter_prefix(), "<T, T2, K, T3, K2> ");
        assert_eq!(c.receiver.receiver_type, "A<T>.B<T2, K>.C<T3, K2>");
    }

    #[test]
    fn test_receiver_quotes_names_kotlin_cannot_read_bare() {
        let file = SourceFile::new("Q.kt", "p").with_declaration(
            Declaration::class("My Klass", "p.My Klass")
                .with_nested(Declaration::class("in", "p.My Klass.in").with_type_parameters(["T"])),
        );
        let identity = identity_of(&file, "in").unwrap();

        assert_eq!(identity.receiver.receiver_type, "`My Klass`.`in`<T>");
        assert_eq!(identity.logger_name, "p.My Klass.in");
        assert_eq!(identity.file_name, "My Klass_inKotlinLoggingExtensions");
    }

    #[test]
    fn test_suffixed_name_never_collides_with_declared_name() {
        let chain = [
            Declaration::class("A", "p.A").with_type_parameters(["T", "T2"]),
            Declaration::class("B", "p.A.B").with_type_parameters(["T"]),
        ];
        let receiver = build_receiver(chain.iter());

        assert_eq!(receiver.type_parameters, vec!["T", "T2", "T3"]);
        let distinct: HashSet<&String> = receiver.type_parameters.iter().collect();
        assert_eq!(distinct.len(), receiver.type_parameters.len());
    }

    #[test]
    fn test_internal_anywhere_in_chain_makes_extension_internal() {
        let file = SourceFile::new("I.kt", "p").with_declaration(
            Declaration::class("Outer", "p.Outer")
                .with_visibility(Visibility::Internal)
                .with_nested(Declaration::class("Inner", "p.Outer.Inner")),
        );
        assert_eq!(identity_of(&file, "Inner").unwrap().visibility, ExtensionVisibility::Internal);
        assert_eq!(identity_of(&file, "Outer").unwrap().visibility, ExtensionVisibility::Internal);
    }

    #[test]
    fn test_private_protected_and_local_levels_are_skipped() {
        for visibility in [Visibility::Private, Visibility::Protected, Visibility::Local] {
            let file = SourceFile::new("V.kt", "p").with_declaration(
                Declaration::class("Outer", "p.Outer")
                    .with_visibility(visibility)
                    .with_nested(Declaration::class("Inner", "p.Outer.Inner")),
            );
            assert_eq!(
                identity_of(&file, "Inner"),
                Err(SkipReason::InexpressibleVisibility {
                    declaration: "Outer".to_string(),
                    visibility,
                })
            );
        }
    }

    #[test]
    fn test_visibility_scan_stops_at_innermost_disqualifier() {
        let file = SourceFile::new("V.kt", "p").with_declaration(
            Declaration::class("Outer", "p.Outer")
                .with_visibility(Visibility::Private)
                .with_nested(
                    Declaration::class("Inner", "p.Outer.Inner").with_visibility(Visibility::Protected),
                ),
        );
        assert_eq!(
            identity_of(&file, "Inner"),
            Err(SkipReason::InexpressibleVisibility {
                declaration: "Inner".to_string(),
                visibility: Visibility::Protected,
            })
        );
    }

    #[test]
    fn test_enum_entries_and_unnamed_are_skipped() {
        let file = SourceFile::new("E.kt", "p").with_declaration(
            Declaration::class("Color", "p.Color")
                .with_kind(DeclarationKind::EnumClass)
                .with_nested(Declaration::class("RED", "p.Color.RED").with_kind(DeclarationKind::EnumEntry))
                .with_nested(Declaration::class("Anon", "p.Color.Anon").without_qualified_name()),
        );
        assert!(identity_of(&file, "Color").is_ok());
        assert_eq!(identity_of(&file, "RED"), Err(SkipReason::EnumEntry));
        assert_eq!(identity_of(&file, "Anon"), Err(SkipReason::NoQualifiedName));
    }

    #[test]
    fn test_custom_suffix() {
        let file = SourceFile::new("A.kt", "p").with_declaration(Declaration::class("A", "p.A"));
        let class = file.class_declarations().next().unwrap();
        let options = GeneratorOptions {
            file_suffix: "Logging".to_string(),
            ..GeneratorOptions::default()
        };
        assert_eq!(resolve_identity(&class, &options).unwrap().file_name, "ALogging");
    }
}

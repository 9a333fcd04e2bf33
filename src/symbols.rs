//! Symbol Model for the Logging Extensions Generator
//!
//! Read-only view of the host's symbol tree. A host (the filesystem scanner in
//! this crate, or an external compiler handing over JSON) builds these once per
//! pass; the processor only ever borrows them.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

/// Visibility level of a declaration as written in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Private,
    Protected,
    Local,
}

impl Visibility {
    /// Parse a Kotlin visibility modifier keyword.
    pub fn from_modifier(modifier: &str) -> Option<Self> {
        match modifier {
            "public" => Some(Visibility::Public),
            "internal" => Some(Visibility::Internal),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            _ => None,
        }
    }
}

/// Discriminant tag of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    #[default]
    Class,
    Interface,
    Object,
    EnumClass,
    EnumEntry,
    AnnotationClass,
    Function,
    Property,
    TypeAlias,
}

impl DeclarationKind {
    /// Class-like declarations can own nested classes and are candidates for generation.
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Interface
                | DeclarationKind::Object
                | DeclarationKind::EnumClass
                | DeclarationKind::EnumEntry
                | DeclarationKind::AnnotationClass
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParameter {
    pub name: String,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════════════

/// A declaration node. Nested declarations live in `declarations`, so the
/// enclosing chain of any node is the path from the file root down to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub simple_name: String,
    /// `None` for local and anonymous declarations.
    #[serde(default)]
    pub qualified_name: Option<String>,
    #[serde(default)]
    pub kind: DeclarationKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Declaration {
    /// A public, non-generic class with the given names.
    pub fn class(simple_name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            simple_name: simple_name.into(),
            qualified_name: Some(qualified_name.into()),
            kind: DeclarationKind::Class,
            visibility: Visibility::Public,
            type_parameters: Vec::new(),
            declarations: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: DeclarationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_type_parameters<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_parameters = names.into_iter().map(TypeParameter::new).collect();
        self
    }

    pub fn with_nested(mut self, nested: Declaration) -> Self {
        self.declarations.push(nested);
        self
    }

    /// Mark as non-nameable (local or anonymous).
    pub fn without_qualified_name(mut self) -> Self {
        self.qualified_name = None;
        self
    }
}

/// A source file as observed by the host in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    /// Stable identity of the file, used as the generated unit's dependency.
    pub path: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package_name: package_name.into(),
            declarations: Vec::new(),
        }
    }

    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    /// Depth-first walk over every class-like declaration in this file.
    pub fn class_declarations(&self) -> ClassDeclarations<'_> {
        ClassDeclarations::new(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRAVERSAL
// ═══════════════════════════════════════════════════════════════════════════════

/// A class-like declaration located in its file, with its enclosing chain.
#[derive(Debug, Clone)]
pub struct DiscoveredClass<'a> {
    pub file: &'a SourceFile,
    /// Innermost first: `chain[0]` is the declaration itself, the last entry is
    /// the top-level declaration.
    pub chain: Vec<&'a Declaration>,
}

impl<'a> DiscoveredClass<'a> {
    pub fn declaration(&self) -> &'a Declaration {
        self.chain[0]
    }

    pub fn package_name(&self) -> &'a str {
        &self.file.package_name
    }

    /// Enclosing chain from the top level down to the declaration itself.
    pub fn outermost_first(&self) -> impl Iterator<Item = &'a Declaration> + '_ {
        self.chain.iter().rev().copied()
    }
}

/// Lazy pre-order iterator over class-like declarations. Non-class declarations
/// (functions, properties) are not descended into.
pub struct ClassDeclarations<'a> {
    file: &'a SourceFile,
    // Each entry holds the chain (outermost first) of a pending declaration.
    stack: Vec<Vec<&'a Declaration>>,
}

impl<'a> ClassDeclarations<'a> {
    fn new(file: &'a SourceFile) -> Self {
        let stack = file
            .declarations
            .iter()
            .rev()
            .map(|declaration| vec![declaration])
            .collect();
        Self { file, stack }
    }
}

impl<'a> Iterator for ClassDeclarations<'a> {
    type Item = DiscoveredClass<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(path) = self.stack.pop() {
            let Some(&current) = path.last() else {
                continue;
            };
            if !current.kind.is_class_like() {
                continue;
            }

            for nested in current.declarations.iter().rev() {
                let mut nested_path = path.clone();
                nested_path.push(nested);
                self.stack.push(nested_path);
            }

            let mut chain = path;
            chain.reverse();
            return Some(DiscoveredClass {
                file: self.file,
                chain,
            });
        }
        None
    }
}

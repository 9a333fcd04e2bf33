//! Declaration Scanner
//!
//! Parses Kotlin source with tree-sitter and maps the syntax tree onto a
//! `SourceFile` symbol tree: package, class-like declarations, visibility,
//! type parameter names, enum entries and nesting. Types are not resolved.
//!
//! Node kinds differ slightly between Kotlin grammar releases, so names are
//! looked up by field first and by identifier-kind child second, and header
//! keywords are read from token text rather than from dedicated node kinds.

use tree_sitter::{Node, Parser};

use crate::error::{GenerateError, Result};
use crate::symbols::{Declaration, DeclarationKind, SourceFile, TypeParameter, Visibility};

const IDENTIFIER_KINDS: &[&str] = &["identifier", "simple_identifier", "type_identifier"];

const CLASS_KINDS: &[&str] = &["class_declaration", "object_declaration", "companion_object"];

/// Executable code. A class declared anywhere below one of these is local.
const LOCAL_SCOPES: &[&str] = &[
    "function_declaration",
    "anonymous_function",
    "secondary_constructor",
    "anonymous_initializer",
    "property_declaration",
    "getter",
    "setter",
    "lambda_literal",
    "annotated_lambda",
    "object_literal",
    "object_expression",
    "function_body",
    "block",
    "statements",
    "control_structure_body",
];

/// Parse one Kotlin source file into its declaration tree.
pub fn scan_source(path: &str, source: &str) -> Result<SourceFile> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_kotlin_ng::LANGUAGE.into())
        .map_err(|e| GenerateError::parse(path, e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| GenerateError::parse(path, "parser produced no tree"))?;

    let root = tree.root_node();
    let src = source.as_bytes();
    let package_name = package_name(root, src);

    let mut declarations = Vec::new();
    walk(root, src, &Scope::Named(package_name.clone()), &mut declarations);

    Ok(SourceFile {
        path: path.to_string(),
        package_name,
        declarations,
    })
}

/// Where a declaration sits: under a nameable prefix, or inside code.
#[derive(Debug, Clone)]
enum Scope {
    Named(String),
    Local,
}

impl Scope {
    fn qualify(&self, name: &str) -> Option<String> {
        match self {
            Scope::Named(prefix) if prefix.is_empty() => Some(name.to_string()),
            Scope::Named(prefix) => Some(format!("{}.{}", prefix, name)),
            Scope::Local => None,
        }
    }

    fn enter(qualified_name: &Option<String>) -> Scope {
        match qualified_name {
            Some(name) => Scope::Named(name.clone()),
            None => Scope::Local,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE WALK
// ═══════════════════════════════════════════════════════════════════════════════

/// Collect the declarations below `node` into `out`. Non-declaration nodes are
/// transparent, so locals surface on the nearest enclosing class.
fn walk(node: Node, src: &[u8], scope: &Scope, out: &mut Vec<Declaration>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let kind = child.kind();
        if CLASS_KINDS.contains(&kind) {
            match class_like(child, src, scope) {
                Some(declaration) => out.push(declaration),
                None => walk(child, src, scope, out),
            }
        } else if kind == "enum_entry" {
            if let Some(entry) = enum_entry(child, src, scope) {
                out.push(entry);
            }
        } else if LOCAL_SCOPES.contains(&kind) {
            walk(child, src, &Scope::Local, out);
        } else {
            walk(child, src, scope, out);
        }
    }
}

fn class_like(node: Node, src: &[u8], scope: &Scope) -> Option<Declaration> {
    let keywords = header_keywords(node, src);
    let companion = node.kind() == "companion_object" || keywords.contains(&"companion");

    let simple_name = match name_of(node, src) {
        Some(name) => name,
        None if companion => "Companion".to_string(),
        None => return None,
    };

    let kind = if node.kind() != "class_declaration" {
        DeclarationKind::Object
    } else if keywords.contains(&"interface") {
        DeclarationKind::Interface
    } else if keywords.contains(&"enum") || child_of_kind(node, "enum_class_body").is_some() {
        DeclarationKind::EnumClass
    } else if keywords.contains(&"annotation") {
        DeclarationKind::AnnotationClass
    } else {
        DeclarationKind::Class
    };

    let qualified_name = scope.qualify(&simple_name);
    let visibility = if qualified_name.is_none() {
        Visibility::Local
    } else {
        keywords
            .iter()
            .find_map(|word| Visibility::from_modifier(word))
            .unwrap_or_default()
    };

    let mut declarations = Vec::new();
    walk(node, src, &Scope::enter(&qualified_name), &mut declarations);

    Some(Declaration {
        simple_name,
        qualified_name,
        kind,
        visibility,
        type_parameters: type_parameters(node, src),
        declarations,
    })
}

/// Entry bodies are anonymous classes; nothing below an entry is collected.
fn enum_entry(node: Node, src: &[u8], scope: &Scope) -> Option<Declaration> {
    let simple_name = name_of(node, src)?;
    let qualified_name = scope.qualify(&simple_name);
    let visibility = if qualified_name.is_none() {
        Visibility::Local
    } else {
        Visibility::Public
    };

    Some(Declaration {
        simple_name,
        qualified_name,
        kind: DeclarationKind::EnumEntry,
        visibility,
        type_parameters: Vec::new(),
        declarations: Vec::new(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn node_text<'a>(node: Node, src: &'a [u8]) -> &'a str {
    node.utf8_text(src).unwrap_or("")
}

fn unquote(name: &str) -> String {
    name.trim_matches('`').to_string()
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// The declared name of `node`, without backticks.
fn name_of(node: Node, src: &[u8]) -> Option<String> {
    let name = match node.child_by_field_name("name") {
        Some(name) => name,
        None => {
            let mut cursor = node.walk();
            let found = node
                .named_children(&mut cursor)
                .find(|child| IDENTIFIER_KINDS.contains(&child.kind()));
            found?
        }
    };
    Some(unquote(node_text(name, src)))
}

/// Keyword tokens of a declaration header: its own anonymous tokens (`class`,
/// `interface`, `enum` ...) plus every modifier word outside annotations.
fn header_keywords<'a>(node: Node, src: &'a [u8]) -> Vec<&'a str> {
    let mut words = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifiers" {
            modifier_words(child, src, &mut words);
        } else if !child.is_named() {
            words.push(node_text(child, src));
        }
    }
    words
}

fn modifier_words<'a>(node: Node, src: &'a [u8], words: &mut Vec<&'a str>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "annotation" {
            continue;
        }
        if child.child_count() == 0 {
            words.push(node_text(child, src));
        } else {
            modifier_words(child, src, words);
        }
    }
}

fn type_parameters(node: Node, src: &[u8]) -> Vec<TypeParameter> {
    let mut parameters = Vec::new();
    if let Some(list) = child_of_kind(node, "type_parameters") {
        let mut cursor = list.walk();
        for parameter in list.named_children(&mut cursor) {
            if parameter.kind() != "type_parameter" {
                continue;
            }
            if let Some(name) = name_of(parameter, src) {
                parameters.push(TypeParameter::new(name));
            }
        }
    }
    parameters
}

fn package_name(root: Node, src: &[u8]) -> String {
    let mut segments = Vec::new();
    if let Some(header) = child_of_kind(root, "package_header") {
        identifier_leaves(header, src, &mut segments);
    }
    segments.join(".")
}

/// Leaf identifiers below `node` in source order. Covers both a flat
/// `qualified_identifier` and nested `identifier`/`simple_identifier` shapes.
fn identifier_leaves(node: Node, src: &[u8], out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.named_child_count() == 0 {
            if IDENTIFIER_KINDS.contains(&child.kind()) {
                out.push(unquote(node_text(child, src)));
            }
        } else {
            identifier_leaves(child, src, out);
        }
    }
}

//! Identifier escaping for generated Kotlin sources.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    /// Kotlin hard keywords. A package segment equal to one of these must be
    /// written in backticks.
    /// Ref: https://kotlinlang.org/docs/keyword-reference.html
    pub static ref KOTLIN_HARD_KEYWORDS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("as");
        s.insert("break");
        s.insert("class");
        s.insert("continue");
        s.insert("do");
        s.insert("else");
        s.insert("false");
        s.insert("for");
        s.insert("fun");
        s.insert("if");
        s.insert("in");
        s.insert("interface");
        s.insert("is");
        s.insert("null");
        s.insert("object");
        s.insert("package");
        s.insert("return");
        s.insert("super");
        s.insert("this");
        s.insert("throw");
        s.insert("true");
        s.insert("try");
        s.insert("typealias");
        s.insert("typeof");
        s.insert("val");
        s.insert("var");
        s.insert("when");
        s.insert("while");
        s
    };
}

lazy_static! {
    /// A name Kotlin accepts without backticks.
    static ref PLAIN_IDENTIFIER: Regex = Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").unwrap();
}

pub const BACKTICK: char = '`';

/// Wrap every `delimiter`-separated segment of `path` that is exactly a
/// reserved word in `quote_char`. Empty segments are kept as-is.
pub fn escape_reserved_segments(
    path: &str,
    delimiter: char,
    reserved_words: &HashSet<&str>,
    quote_char: char,
) -> String {
    let mut out = String::with_capacity(path.len());
    for (i, segment) in path.split(delimiter).enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        if reserved_words.contains(segment) {
            out.push(quote_char);
            out.push_str(segment);
            out.push(quote_char);
        } else {
            out.push_str(segment);
        }
    }
    out
}

/// Escape a dotted Kotlin package path for use in a `package` directive.
pub fn escape_package_path(package_name: &str) -> String {
    escape_reserved_segments(package_name, '.', &KOTLIN_HARD_KEYWORDS, BACKTICK)
}

/// Write a single declaration name so Kotlin reads it back as that name:
/// hard keywords and names with spaces or symbols go in backticks.
pub fn escape_identifier(name: &str) -> String {
    if KOTLIN_HARD_KEYWORDS.contains(name) || !PLAIN_IDENTIFIER.is_match(name) {
        format!("{}{}{}", BACKTICK, name, BACKTICK)
    } else {
        name.to_string()
    }
}

/// Quote `value` as a Kotlin string literal body. `$` would otherwise start a
/// string template.
pub fn kotlin_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(path: &str) -> String {
        escape_reserved_segments(path, '.', &KOTLIN_HARD_KEYWORDS, BACKTICK)
    }

    #[test]
    fn test_path_without_reserved_words_is_unchanged() {
        assert_eq!(escape("com.example.project"), "com.example.project");
    }

    #[test]
    fn test_single_reserved_word() {
        assert_eq!(escape("com.package.example"), "com.`package`.example");
    }

    #[test]
    fn test_multiple_reserved_words() {
        assert_eq!(escape("my.package.is.fun"), "my.`package`.`is`.`fun`");
        assert_eq!(escape("fun.in.my.project"), "`fun`.`in`.my.project");
    }

    #[test]
    fn test_whole_path_is_reserved_word() {
        assert_eq!(escape("package"), "`package`");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_empty_segments_are_preserved() {
        assert_eq!(escape(".fun."), ".`fun`.");
        assert_eq!(escape("a..b"), "a..b");
    }

    #[test]
    fn test_match_is_exact_per_segment() {
        assert_eq!(escape("com.classy.funny"), "com.classy.funny");
        assert_eq!(escape("com.Fun"), "com.Fun");
    }

    #[test]
    fn test_different_delimiter_and_quote() {
        let out = escape_reserved_segments("one/if/two/when", '/', &KOTLIN_HARD_KEYWORDS, '"');
        assert_eq!(out, "one/\"if\"/two/\"when\"");
    }

    #[test]
    fn test_custom_reserved_set() {
        let reserved: HashSet<&str> = ["select", "from"].into_iter().collect();
        let out = escape_reserved_segments("db.select.users", '.', &reserved, BACKTICK);
        assert_eq!(out, "db.`select`.users");
    }

    #[test]
    fn test_escaping_is_idempotent() {
        for path in ["", "com.example", "my.package.is.fun", "`fun`.x", "a..val."] {
            let once = escape(path);
            assert_eq!(escape(&once), once, "not idempotent for {:?}", path);
        }
    }

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(escape_identifier("Outer"), "Outer");
        assert_eq!(escape_identifier("_Ünïcode9"), "_Ünïcode9");
        assert_eq!(escape_identifier("in"), "`in`");
        assert_eq!(escape_identifier("My Klass"), "`My Klass`");
        assert_eq!(escape_identifier("9lives"), "`9lives`");
        assert_eq!(escape_identifier("data"), "data");
    }

    #[test]
    fn test_string_literal_escapes_template_markers() {
        assert_eq!(kotlin_string_literal("com.example.A"), "\"com.example.A\"");
        assert_eq!(kotlin_string_literal("a$b\"c\\"), "\"a\\$b\\\"c\\\\\"");
    }
}

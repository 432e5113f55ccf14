//! Config expressions isolated from resource index sources.

use serde::Serialize;

use crate::domain::lexer::{Lexeme, classify};

/// Module the config setter functions are imported from by default.
pub const DEFAULT_SETTER_MODULE: &str = "@gasoline-dev/resources";

/// The single config expression a resource exports.
///
/// `raw` is the exact source text of the export statement, e.g.
/// `export const coreBaseKv = cloudflareKv({ name: "CORE_BASE_KV" } as const);`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigExpression {
    pub variable_name: String,
    pub function_name: String,
    pub raw: String,
}

impl ConfigExpression {
    pub fn new(
        variable_name: impl Into<String>,
        function_name: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        Self {
            variable_name: variable_name.into(),
            function_name: function_name.into(),
            raw: raw.into(),
        }
    }

    /// `raw` with every `as const` assertion removed.
    pub fn evaluable(&self) -> String {
        strip_const_assertions(&self.raw)
    }
}

/// Outcome of scanning one index source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(ConfigExpression),
    /// No camelCase setter is imported from the setter module.
    NoSetterImport,
    /// More than one candidate setter is imported.
    AmbiguousSetter { setters: Vec<String> },
    /// The setter is imported but no `export const x = setter(...)` exists.
    NoConfigExport { setter: String },
}

impl Extraction {
    pub fn expression(&self) -> Option<&ConfigExpression> {
        match self {
            Self::Found(expression) => Some(expression),
            _ => None,
        }
    }

    pub fn into_expression(self) -> Option<ConfigExpression> {
        match self {
            Self::Found(expression) => Some(expression),
            _ => None,
        }
    }
}

/// Remove TypeScript `as const` assertions, along with the whitespace that
/// precedes them. Text inside comments and literals is left alone.
pub fn strip_const_assertions(text: &str) -> String {
    let kinds = classify(text);
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    while let Some((start, end)) = find_const_assertion(text, &kinds, copied) {
        out.push_str(&text[copied..start]);
        copied = end;
    }
    out.push_str(&text[copied..]);
    out
}

/// Next `as const` at or after `from`, as `(start, end)` where `start`
/// includes the preceding whitespace.
fn find_const_assertion(text: &str, kinds: &[Lexeme], from: usize) -> Option<(usize, usize)> {
    let mut search_from = from;
    while let Some(offset) = text[search_from..].find("as") {
        let at = search_from + offset;
        search_from = at + 2;

        if kinds[at] != Lexeme::Code {
            continue;
        }
        let before = &text[..at];
        if !before.ends_with(char::is_whitespace) {
            continue;
        }
        let after = &text[at + 2..];
        let gap = after.len() - after.trim_start().len();
        if gap == 0 || !after[gap..].starts_with("const") {
            continue;
        }
        let end = at + 2 + gap + "const".len();
        if text[end..].starts_with(is_identifier_char) {
            continue;
        }
        return Some((before.trim_end().len().max(from), end));
    }
    None
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_assertion() {
        assert_eq!(
            strip_const_assertions(r#"cloudflareKv({ name: "KV" } as const)"#),
            r#"cloudflareKv({ name: "KV" })"#
        );
    }

    #[test]
    fn strips_every_assertion_across_lines() {
        let raw = "cloudflareWorker({\n  kv: [{ binding: \"A\" }] as const,\n}\n  as const);";

        assert_eq!(
            strip_const_assertions(raw),
            "cloudflareWorker({\n  kv: [{ binding: \"A\" }],\n});"
        );
    }

    #[test]
    fn leaves_lookalike_identifiers_alone() {
        let raw = "f({ alias: has constant, x: as constants })";

        assert_eq!(strip_const_assertions(raw), raw);
    }

    #[test]
    fn assertions_inside_literals_and_comments_survive() {
        let raw = r#"cloudflareKv({ name: "KV", note: "cast as const", tag: `as const` /* as const */ } as const)"#;

        assert_eq!(
            strip_const_assertions(raw),
            r#"cloudflareKv({ name: "KV", note: "cast as const", tag: `as const` /* as const */ })"#
        );
    }

    #[test]
    fn expression_exposes_evaluable_text() {
        let expression = ConfigExpression::new(
            "coreKv",
            "cloudflareKv",
            r#"export const coreKv = cloudflareKv({ name: "CORE_KV" } as const);"#,
        );

        assert_eq!(
            expression.evaluable(),
            r#"export const coreKv = cloudflareKv({ name: "CORE_KV" });"#
        );
    }

    #[test]
    fn only_found_yields_an_expression() {
        let found = Extraction::Found(ConfigExpression::new("a", "b", "c"));

        assert!(found.expression().is_some());
        assert!(Extraction::NoSetterImport.into_expression().is_none());
    }
}

//! Regex-driven config extractor.
//!
//! Two passes over an index source with its comments masked out:
//!
//! 1. find the camelCase setter imported from the setter module
//!    (`import { cloudflareKv } from "@gasoline-dev/resources"`)
//! 2. find `export const <name> = <setter>(...)`, capturing the whole call
//!    with a scanner that balances parentheses outside string, template and
//!    regex literals
//!
//! Matches starting inside a literal are ignored. The source is only scanned,
//! never executed.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{instrument, trace, warn};

use gas_core::{
    application::ports::ConfigExtractor,
    domain::{
        ConfigExpression, DEFAULT_SETTER_MODULE, Extraction, Lexeme, classify, mask_comments,
    },
};

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\s+(type\s+)?\{([^}]*)\}\s*from\s*['"]([^'"]+)['"]"#)
        .expect("import pattern is valid")
});

static SETTER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]+[A-Z][a-zA-Z]*$").expect("setter name pattern is valid")
});

static EXPORT_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+const\s+([A-Za-z_$][\w$]*)\s*=\s*([A-Za-z_$][\w$]*)\s*\(")
        .expect("export pattern is valid")
});

static CALL_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:as\s+const\b\s*)?;?").expect("call tail pattern is valid")
});

/// Config extractor for TypeScript index sources.
#[derive(Debug, Clone)]
pub struct RegexConfigExtractor {
    setter_module: String,
}

impl RegexConfigExtractor {
    pub fn new(setter_module: impl Into<String>) -> Self {
        Self {
            setter_module: setter_module.into(),
        }
    }

    /// Distinct camelCase identifiers imported from the setter module, in
    /// source order. `type`-only imports are ignored; `a as b` yields `b`.
    pub fn imported_setters(&self, source: &str) -> Vec<String> {
        let kinds = classify(source);
        let masked = mask_comments(source);
        let mut setters: Vec<String> = Vec::new();

        for captures in IMPORT.captures_iter(&masked) {
            let in_code = captures
                .get(0)
                .is_some_and(|m| kinds[m.start()] == Lexeme::Code);
            if !in_code || captures.get(1).is_some() || &captures[3] != self.setter_module {
                continue;
            }
            for specifier in captures[2].split(',') {
                let Some(local) = local_name(specifier) else {
                    continue;
                };
                if SETTER_NAME.is_match(local) && !setters.iter().any(|s| s == local) {
                    setters.push(local.to_string());
                }
            }
        }

        setters
    }

    /// Every well-formed `export const x = f(...)` statement, in source order.
    pub fn exported_calls(&self, source: &str) -> Vec<ConfigExpression> {
        let kinds = classify(source);
        let masked = mask_comments(source);
        let mut calls = Vec::new();
        let mut resume_at = 0;

        for captures in EXPORT_CALL.captures_iter(&masked) {
            let (Some(whole), Some(variable), Some(callee)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                continue;
            };
            if whole.start() < resume_at || kinds[whole.start()] != Lexeme::Code {
                continue;
            }

            let open_paren = whole.end() - 1;
            let Some(close) = find_call_end(&masked, &kinds, open_paren) else {
                trace!(variable = variable.as_str(), "skipping unterminated call");
                continue;
            };
            let tail = CALL_TAIL
                .find(&masked[close..])
                .map_or(0, |m| m.end());
            let end = close + tail;

            calls.push(ConfigExpression::new(
                variable.as_str(),
                callee.as_str(),
                source[whole.start()..end].trim_end(),
            ));
            resume_at = end;
        }

        calls
    }
}

impl Default for RegexConfigExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SETTER_MODULE)
    }
}

impl ConfigExtractor for RegexConfigExtractor {
    fn setter_module(&self) -> &str {
        &self.setter_module
    }

    #[instrument(skip_all)]
    fn extract(&self, source: &str) -> Extraction {
        let mut setters = self.imported_setters(source);
        let setter = match setters.len() {
            0 => return Extraction::NoSetterImport,
            1 => setters.remove(0),
            _ => return Extraction::AmbiguousSetter { setters },
        };

        let mut confirmed = self
            .exported_calls(source)
            .into_iter()
            .filter(|call| call.function_name == setter);

        let Some(first) = confirmed.next() else {
            return Extraction::NoConfigExport { setter };
        };
        let ignored: Vec<String> = confirmed.map(|call| call.variable_name).collect();
        if !ignored.is_empty() {
            warn!(
                kept = %first.variable_name,
                ignored = ?ignored,
                "more than one exported config; keeping the first"
            );
        }
        Extraction::Found(first)
    }
}

/// Local binding of one import specifier, skipping `type` specifiers.
fn local_name(specifier: &str) -> Option<&str> {
    let specifier = specifier.trim();
    if specifier.is_empty() || specifier.starts_with("type ") {
        return None;
    }
    let local = match specifier.split_once(" as ") {
        Some((_, alias)) => alias.trim(),
        None => specifier,
    };
    Some(local)
}

/// Byte offset just past the `)` matching the `(` at `open`.
///
/// Only bytes classified as code are counted. `None` if the call never
/// closes.
fn find_call_end(source: &str, kinds: &[Lexeme], open: usize) -> Option<usize> {
    let mut depth = 0usize;

    for (i, &b) in source.as_bytes().iter().enumerate().skip(open) {
        if kinds[i] != Lexeme::Code {
            continue;
        }
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

//! Byte-level classification of TypeScript source text.
//!
//! Just enough lexing to tell code apart from comments and literals. There is
//! no tokenizer and no grammar. A `/` starts a regex literal only after an
//! operator, an opening bracket or the start of input, so `return /x/` is read
//! as division.

/// What a source byte belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    Code,
    /// String, template or regex literal, delimiters included.
    Literal,
    /// Line or block comment, delimiters included.
    Comment,
}

/// Classify every byte of `source`.
///
/// A quoted string left open at a line break ends there; an open template,
/// regex or block comment runs to the end of input. Template substitutions
/// (`${...}`) count as part of the template.
pub fn classify(source: &str) -> Vec<Lexeme> {
    let bytes = source.as_bytes();
    let mut kinds = vec![Lexeme::Code; bytes.len()];
    // Last significant code byte; `None` at the start of input.
    let mut previous: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let span = match b {
            b'"' | b'\'' | b'`' => Some((string_end(bytes, i + 1, b), Lexeme::Literal)),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                Some((line_end(bytes, i), Lexeme::Comment))
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                Some((block_comment_end(source, i), Lexeme::Comment))
            }
            b'/' if starts_regex(previous) => Some((regex_end(bytes, i + 1), Lexeme::Literal)),
            _ => None,
        };

        match span {
            Some((end, kind)) => {
                let end = end.min(bytes.len());
                kinds[i..end].fill(kind);
                if kind == Lexeme::Literal {
                    // A literal is an operand; a `/` after it divides.
                    previous = Some(b'"');
                }
                i = end;
            }
            None => {
                if !b.is_ascii_whitespace() {
                    previous = Some(b);
                }
                i += 1;
            }
        }
    }
    kinds
}

/// `source` with every comment byte blanked to a space.
///
/// Line breaks are kept and byte offsets are unchanged, so positions found in
/// the result index straight into `source`.
pub fn mask_comments(source: &str) -> String {
    let kinds = classify(source);
    let mut masked = String::with_capacity(source.len());
    for (offset, c) in source.char_indices() {
        if kinds[offset] == Lexeme::Comment && c != '\n' {
            masked.extend(std::iter::repeat_n(' ', c.len_utf8()));
        } else {
            masked.push(c);
        }
    }
    masked
}

fn starts_regex(previous: Option<u8>) -> bool {
    match previous {
        None => true,
        Some(b) => b"(,=:[!&|?{};+-*%<>~^".contains(&b),
    }
}

/// Offset just past the closing `quote`, honouring backslash escapes.
fn string_end(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            b'\n' if quote != b'`' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Offset just past the closing `/` and any flags. Slashes inside a `[...]`
/// class do not close the literal.
fn regex_end(bytes: &[u8], mut i: usize) -> usize {
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' => {
                in_class = true;
                i += 1;
            }
            b']' => {
                in_class = false;
                i += 1;
            }
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return i;
            }
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Offset of the line break ending the comment at `i`, which stays code.
fn line_end(bytes: &[u8], i: usize) -> usize {
    bytes[i..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |offset| i + offset)
}

fn block_comment_end(source: &str, i: usize) -> usize {
    source[i + 2..]
        .find("*/")
        .map_or(source.len(), |offset| i + 2 + offset + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render the classification as one character per byte.
    fn shape(source: &str) -> String {
        classify(source)
            .into_iter()
            .map(|kind| match kind {
                Lexeme::Code => 'c',
                Lexeme::Literal => 'l',
                Lexeme::Comment => '#',
            })
            .collect()
    }

    #[test]
    fn strings_and_comments() {
        assert_eq!(shape(r#"a("x")"#), "cclllc");
        assert_eq!(shape("a // b\nc"), "cc####cc");
        assert_eq!(shape("a /* b */ c"), "cc#######cc");
        assert_eq!(shape(r#"'it\'s'"#), "lllllll");
    }

    #[test]
    fn comment_markers_inside_strings_are_literal() {
        assert_eq!(shape(r#""// no" x"#), "lllllllcc");
    }

    #[test]
    fn template_spans_lines() {
        assert_eq!(shape("`a\nb` c"), "lllllcc");
    }

    #[test]
    fn unterminated_quote_stops_at_line_break() {
        assert_eq!(shape("\"ab\nc"), "lllcc");
    }

    #[test]
    fn regex_literal_after_operator() {
        assert_eq!(shape(r"x = /\)/g;"), "cccclllllc");
        assert_eq!(shape("f(/[/]/)"), "cclllllc");
    }

    #[test]
    fn slash_after_operand_is_division() {
        assert_eq!(shape("a / b"), "ccccc");
        assert_eq!(shape("(a) / 2"), "ccccccc");
        assert_eq!(shape(r#""x" / 2"#), "lllcccc");
    }

    #[test]
    fn masking_keeps_offsets_and_line_breaks() {
        let source = "a // é\n/* x\ny */b";

        let masked = mask_comments(source);

        assert_eq!(masked.len(), source.len());
        assert_eq!(
            masked,
            format!("a {}\n{}\n{}b", " ".repeat(5), " ".repeat(4), " ".repeat(4))
        );
    }
}

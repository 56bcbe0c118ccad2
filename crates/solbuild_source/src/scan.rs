//! Minimal source scanning: comment stripping, `import` extraction and the
//! `pragma solidity` constraint.
//!
//! This is deliberately not a parser. It recognizes just enough lexical
//! structure (comments, string literals, words, `;`) to find dependency
//! references and the declared compiler version range.

/// Replaces every comment in `source` with spaces, keeping newlines and
/// string literals intact.
pub fn strip_comments(source: &str) -> String {
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(char),
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '"' | '\'' => {
                    out.push(c);
                    state = State::Str(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else if c == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::Str(quote) => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == quote || c == '\n' {
                    state = State::Code;
                }
            }
        }
    }
    out
}

#[derive(Debug, PartialEq, Eq)]
enum TokenKind<'a> {
    Word(&'a str),
    Str(&'a str),
    Semi,
    Other,
}

#[derive(Debug)]
struct Token<'a> {
    kind: TokenKind<'a>,
    start: usize,
    end: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Tokenizes comment-free text into words, string literals and `;`.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == ';' {
            tokens.push(Token {
                kind: TokenKind::Semi,
                start,
                end: start + 1,
            });
        } else if c == '"' || c == '\'' {
            let mut end = text.len();
            while let Some((i, next)) = chars.next() {
                if next == '\\' {
                    chars.next();
                } else if next == c || next == '\n' {
                    end = i;
                    break;
                }
            }
            let close = (end + 1).min(text.len());
            tokens.push(Token {
                kind: TokenKind::Str(&text[start + 1..end]),
                start,
                end: close,
            });
        } else if is_word_char(c) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Word(&text[start..end]),
                start,
                end,
            });
        } else {
            tokens.push(Token {
                kind: TokenKind::Other,
                start,
                end: start + c.len_utf8(),
            });
        }
    }
    tokens
}

/// Extracts every `import` reference from `source`, in source order.
///
/// Handles all import forms (`import "a.sol";`, `import "a.sol" as A;`,
/// `import * as A from "a.sol";`, `import {X} from "a.sol";`). Duplicates
/// are returned as they appear.
pub fn imports(source: &str) -> Vec<String> {
    let text = strip_comments(source);
    let tokens = tokenize(&text);
    let mut found = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].kind == TokenKind::Word("import") {
            let mut j = i + 1;
            while j < tokens.len() && tokens[j].kind != TokenKind::Semi {
                if let TokenKind::Str(path) = tokens[j].kind {
                    found.push(path.to_string());
                    break;
                }
                j += 1;
            }
            i = j;
        }
        i += 1;
    }
    found
}

/// Extracts the declared compiler version range from `source`.
///
/// Returns the text between `pragma solidity` and the terminating `;`.
/// Several `pragma solidity` directives are conjoined with a space, which is
/// how the compiler itself interprets them. Returns `None` when the source
/// declares no version range.
pub fn version_pragma(source: &str) -> Option<String> {
    let text = strip_comments(source);
    let tokens = tokenize(&text);
    let mut ranges = Vec::new();

    for (i, window) in tokens.windows(2).enumerate() {
        if window[0].kind != TokenKind::Word("pragma")
            || window[1].kind != TokenKind::Word("solidity")
        {
            continue;
        }
        let range_start = window[1].end;
        let range_end = tokens[i + 2..]
            .iter()
            .find(|t| t.kind == TokenKind::Semi)
            .map_or(text.len(), |t| t.start);
        let range = text[range_start..range_end].split_whitespace().collect::<Vec<_>>();
        if !range.is_empty() {
            ranges.push(range.join(" "));
        }
    }

    if ranges.is_empty() {
        None
    } else {
        Some(ranges.join(" "))
    }
}

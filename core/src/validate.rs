//! Structural validation of graph source: header, quotes, bracket balance.
//!
//! Runs before the scanner. Reports the first problem only.

use std::iter::Peekable;
use std::str::Chars;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SourceError, SourceErrorKind};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?si)^\s*(?:strict\s+)?(?:di)?graph(?:\s*"(?:[^"\\]|\\.)*"|\s+[\w.]+)?\s*$"#)
        .expect("header regex")
});

#[derive(Debug, Clone, Copy)]
struct Pos {
    line: usize,
    column: usize,
}

impl Pos {
    fn error(self, kind: SourceErrorKind) -> SourceError {
        SourceError::new(self.line, self.column, kind)
    }
}

struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 0,
        }
    }

    fn next(&mut self) -> Option<(char, Pos)> {
        let c = self.chars.next()?;
        self.column += 1;
        let at = Pos {
            line: self.line,
            column: self.column,
        };
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        }
        Some((c, at))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn skip_line(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.next();
        }
    }

    /// Consume through the closing `*/`. False if the input ends first.
    fn skip_block_comment(&mut self) -> bool {
        let mut prev = '\0';
        while let Some((c, _)) = self.next() {
            if prev == '*' && c == '/' {
                return true;
            }
            prev = c;
        }
        false
    }
}

/// Check graph source for structural errors.
pub fn validate(source: &str) -> Result<(), SourceError> {
    let mut cursor = Cursor::new(source.trim_start_matches('\u{feff}'));
    let mut stack: Vec<(char, Pos)> = Vec::new();
    let mut header = String::new();
    let mut header_pos: Option<Pos> = None;
    let mut opened = false;
    let mut closed = false;
    let mut quote_start: Option<Pos> = None;
    let mut escaped = false;
    // Only whitespace seen so far on the current line.
    let mut line_blank = true;

    while let Some((c, at)) = cursor.next() {
        if quote_start.is_some() {
            if !opened {
                header.push(c);
            }
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                quote_start = None;
            }
            continue;
        }

        let line_start = line_blank;
        line_blank = c == '\n' || (line_blank && c.is_whitespace());

        match c {
            '/' if cursor.peek() == Some('/') => cursor.skip_line(),
            '/' if cursor.peek() == Some('*') => {
                cursor.next();
                if !cursor.skip_block_comment() {
                    return Err(at.error(SourceErrorKind::UnterminatedComment));
                }
            }
            '#' if line_start => cursor.skip_line(),
            c if c.is_whitespace() => {
                if !opened {
                    header.push(' ');
                }
            }
            _ if closed => return Err(at.error(SourceErrorKind::TrailingText)),
            '"' => {
                quote_start = Some(at);
                if !opened {
                    header_pos.get_or_insert(at);
                    header.push(c);
                }
            }
            '{' => {
                if !opened {
                    if !HEADER_RE.is_match(&header) {
                        let pos = header_pos.unwrap_or(at);
                        return Err(pos.error(SourceErrorKind::MissingHeader));
                    }
                    opened = true;
                }
                stack.push((c, at));
            }
            '[' => {
                if !opened {
                    let pos = header_pos.unwrap_or(at);
                    return Err(pos.error(SourceErrorKind::MissingHeader));
                }
                stack.push((c, at));
            }
            '}' | ']' => {
                let expected_open = if c == '}' { '{' } else { '[' };
                match stack.pop() {
                    None => return Err(at.error(SourceErrorKind::UnexpectedClose { found: c })),
                    Some((open, _)) if open != expected_open => {
                        return Err(at.error(SourceErrorKind::Mismatched {
                            expected: closing(open),
                            found: c,
                        }));
                    }
                    Some(_) => {}
                }
                if stack.is_empty() {
                    closed = true;
                }
            }
            _ => {
                if !opened {
                    header_pos.get_or_insert(at);
                    header.push(c);
                }
            }
        }
    }

    if let Some(start) = quote_start {
        return Err(start.error(SourceErrorKind::UnterminatedString));
    }
    if let Some(&(open, at)) = stack.last() {
        return Err(at.error(SourceErrorKind::Unclosed { open }));
    }
    if !opened {
        let pos = header_pos.unwrap_or(Pos { line: 1, column: 1 });
        return Err(pos.error(SourceErrorKind::MissingHeader));
    }
    Ok(())
}

fn closing(open: char) -> char {
    match open {
        '{' => '}',
        _ => ']',
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::*;
use core::cmp;
use core::fmt::{self, Debug, Formatter};

use anyhow::{anyhow, bail, Result};

struct SourceInternal {
    file: String,
    contents: String,
    // Byte offset at which each line starts.
    line_starts: Vec<usize>,
}

/// A named piece of policy text. Cloning is cheap; clones share the contents.
#[derive(Clone)]
pub struct Source {
    src: Rc<SourceInternal>,
}

impl cmp::PartialEq for Source {
    fn eq(&self, other: &Source) -> bool {
        Rc::ptr_eq(&self.src, &other.src)
    }
}

impl cmp::Eq for Source {}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.src.file.fmt(f)
    }
}

impl Source {
    pub fn from_contents(file: String, contents: String) -> Result<Source> {
        // Offsets are stored as u32 in spans.
        let max_size = u32::MAX as usize - 1;
        if contents.len() > max_size {
            bail!("{file} exceeds maximum allowed policy size {max_size}");
        }

        let line_starts = core::iter::once(0)
            .chain(contents.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Ok(Self {
            src: Rc::new(SourceInternal {
                file,
                contents,
                line_starts,
            }),
        })
    }

    pub fn file(&self) -> &String {
        &self.src.file
    }

    pub fn contents(&self) -> &str {
        &self.src.contents
    }

    /// Text of the 1-based line `line`, without its terminator.
    fn line_text(&self, line: u32) -> Option<&str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.src.line_starts.get(idx)?;
        let end = self
            .src
            .line_starts
            .get(idx + 1)
            .copied()
            .unwrap_or(self.src.contents.len());
        Some(self.src.contents[start..end].trim_end_matches(['\n', '\r']))
    }

    /// Error pointing at `line:col`, with the offending line and a caret.
    pub fn error(&self, line: u32, col: u32, msg: &str) -> anyhow::Error {
        let Some(text) = self.line_text(line) else {
            return anyhow!("{}:{line}:{col}: error: {msg}", self.src.file);
        };

        let gutter = " ".repeat(line.to_string().len() + 1);
        let pad = " ".repeat(col.saturating_sub(1) as usize);
        anyhow!(
            "\n--> {file}:{line}:{col}\n{gutter}|\n{line:<width$}| {text}\n{gutter}| {pad}^\nerror: {msg}",
            file = self.src.file,
            width = gutter.len(),
        )
    }
}

/// Location of a token or term within its [`Source`].
#[derive(Clone)]
pub struct Span {
    pub source: Source,
    pub line: u32,
    pub col: u32,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn text(&self) -> &str {
        &self.source.contents()[self.start as usize..self.end as usize]
    }

    pub fn error(&self, msg: &str) -> anyhow::Error {
        self.source.error(self.line, self.col, msg)
    }
}

impl Debug for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        const MAX_CHARS: usize = 32;
        let text = self.text();
        let (text, trailer) = match text.char_indices().nth(MAX_CHARS) {
            Some((cut, _)) => (&text[..cut], "..."),
            None => (text, ""),
        };
        write!(
            f,
            "{}:{}:{}:{}, \"{}{trailer}\"",
            self.line,
            self.col,
            self.start,
            self.end,
            text.escape_debug()
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenKind {
    Symbol,
    String,
    RawString,
    Number,
    Ident,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token(pub TokenKind, pub Span);

// Two-character symbols come first so that `:-` wins over `:`.
const SYMBOLS: [&str; 16] = [
    ":-", "!=", "<=", ">=", "{", "}", "[", "]", "(", ")", ",", ".", ":", "=", "<", ">",
];

#[derive(Clone)]
pub struct Lexer<'source> {
    source: Source,
    text: &'source str,
    pos: usize,
    line: u32,
    col: u32,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source Source) -> Self {
        Self {
            source: source.clone(),
            text: source.contents(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn rest(&self) -> &'source str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    // Advances over `len` bytes that contain no newline.
    fn advance(&mut self, len: usize) {
        self.col += self.text[self.pos..self.pos + len].chars().count() as u32;
        self.pos += len;
    }

    fn error(&self, msg: &str) -> anyhow::Error {
        self.source.error(self.line, self.col, msg)
    }

    fn token(&self, kind: TokenKind, line: u32, col: u32, start: usize, end: usize) -> Token {
        Token(
            kind,
            Span {
                source: self.source.clone(),
                line,
                col,
                start: start as u32,
                end: end as u32,
            },
        )
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.col = 1;
                }
                ' ' | '\t' | '\r' => self.advance(1),
                '#' => {
                    let len = self.rest().find('\n').unwrap_or(self.rest().len());
                    self.advance(len);
                }
                _ => break,
            }
        }
    }

    fn digits(&self, from: usize) -> usize {
        self.text[from..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.text.len() - from)
    }

    // JSON number grammar: -?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?
    fn read_number(&mut self) -> Result<Token> {
        let (start, line, col) = (self.pos, self.line, self.col);
        let text = self.text;
        let bytes = text.as_bytes();
        let mut end = start;
        if bytes.get(end) == Some(&b'-') {
            end += 1;
        }

        let int = self.digits(end);
        if int > 1 && bytes[end] == b'0' {
            return Err(self.error("invalid number"));
        }
        end += int;

        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end += 1;
            end += self.digits(end);
        }

        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            end += 1;
            if matches!(bytes.get(end), Some(b'+' | b'-')) {
                end += 1;
            }
            match self.digits(end) {
                0 => return Err(self.error("invalid number")),
                n => end += n,
            }
        }

        self.advance(end - start);
        if self.peek().is_some_and(|c| c == '_' || c == '.' || c.is_ascii_alphanumeric()) {
            return Err(self.error("invalid number"));
        }
        Ok(self.token(TokenKind::Number, line, col, start, end))
    }

    fn read_raw_string(&mut self) -> Result<Token> {
        let (line, col) = (self.line, self.col);
        self.advance(1);
        let start = self.pos;
        let Some(len) = self.rest().find('`') else {
            return Err(self.source.error(line, col, "unmatched `"));
        };

        let text = &self.rest()[..len];
        match text.rfind('\n') {
            Some(nl) => {
                self.line += text.matches('\n').count() as u32;
                self.col = text[nl + 1..].chars().count() as u32 + 2;
                self.pos += len + 1;
            }
            None => self.advance(len + 1),
        }
        Ok(self.token(TokenKind::RawString, line, col + 1, start, start + len))
    }

    // The span covers the escaped contents; the parser decodes them.
    fn read_string(&mut self) -> Result<Token> {
        let (line, col) = (self.line, self.col);
        self.advance(1);
        let start = self.pos;
        loop {
            match self.peek() {
                Some('"') => break,
                Some('\\') => {
                    self.advance(1);
                    match self.peek() {
                        Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => self.advance(1),
                        Some('u') => {
                            self.advance(1);
                            let hex: Vec<char> = self.rest().chars().take(4).collect();
                            if hex.len() != 4 || !hex.iter().all(char::is_ascii_hexdigit) {
                                return Err(self.error("invalid hex escape sequence"));
                            }
                            self.advance(4);
                        }
                        _ => return Err(self.error("invalid escape sequence")),
                    }
                }
                Some(ch) if ch >= '\u{0020}' => self.advance(ch.len_utf8()),
                Some(_) => return Err(self.error("invalid character in string")),
                None => return Err(self.source.error(line, col, "unmatched \"")),
            }
        }
        let end = self.pos;
        self.advance(1);
        Ok(self.token(TokenKind::String, line, col + 1, start, end))
    }

    fn read_ident(&mut self) -> Token {
        let (start, line, col) = (self.pos, self.line, self.col);
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(self.rest().len());
        self.advance(len);
        self.token(TokenKind::Ident, line, col, start, start + len)
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_ws();

        let (start, line, col) = (self.pos, self.line, self.col);
        let rest = self.rest();
        let Some(ch) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, line, col, start, start));
        };

        let starts_number = ch.is_ascii_digit()
            || (ch == '-' && rest[1..].starts_with(|c: char| c.is_ascii_digit()));
        if starts_number {
            return self.read_number();
        }

        match ch {
            '"' => return self.read_string(),
            '`' => return self.read_raw_string(),
            _ if ch.is_ascii_alphabetic() || ch == '_' => return Ok(self.read_ident()),
            _ => (),
        }

        match SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            Some(sym) => {
                self.advance(sym.len());
                Ok(self.token(TokenKind::Symbol, line, col, start, start + sym.len()))
            }
            None => Err(self.error("invalid character")),
        }
    }
}

use std::io::BufRead;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Longest accepted name token. Characters beyond this are reported once per
/// token and then dropped.
pub const MAX_NAME: usize = 1000;

const EOF_CHAR: char = '\0';

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n' || c == '\r'
}

/// Character that terminated the most recently read name. Callers branch on
/// this to decide how to interpret what follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Colon,
    /// The two-character `:=`, introducing a derived-attribute definition.
    Assign,
    Comma,
    Newline,
    EndOfInput,
    Other(char),
}

/// Line-buffered character source with a 1-based line counter.
pub struct LineReader<R> {
    source: R,
    line_chars: Vec<char>,
    pos: usize,
    line: u32,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            line_chars: vec![],
            pos: 0,
            line: 0,
        }
    }

    /// Line the most recently returned character came from.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Next character of the stream, pulling a new line in when the current
    /// one is exhausted. `None` once the stream is done.
    pub fn next_char(&mut self) -> anyhow::Result<Option<char>> {
        if self.pos >= self.line_chars.len() {
            let mut buf = String::new();
            if self.source.read_line(&mut buf)? == 0 {
                self.line_chars.clear();
                self.pos = 0;
                return Ok(None);
            }
            self.line += 1;
            self.line_chars = buf.chars().collect();
            self.pos = 0;
        }
        let c = self.line_chars[self.pos];
        self.pos += 1;
        Ok(Some(c))
    }

    /// Consume `expected` only if it is the next character of the line
    /// currently buffered. Never pulls a new line in.
    pub fn match_in_line(&mut self, expected: char) -> bool {
        if self.line_chars.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

/// Produces delimited name tokens from a names file: pipe comments, backslash
/// escapes, whitespace collapsing and trailing-period termination are all
/// resolved here so the parser only ever sees clean names.
pub struct NameScanner<R> {
    reader: LineReader<R>,
    delimiter: Delimiter,
}

impl<R: BufRead> NameScanner<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: LineReader::new(source),
            delimiter: Delimiter::EndOfInput,
        }
    }

    /// Delimiter of the most recently read name.
    pub fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    pub fn line(&self) -> u32 {
        self.reader.line()
    }

    fn in_char(&mut self) -> anyhow::Result<char> {
        Ok(self.reader.next_char()?.unwrap_or(EOF_CHAR))
    }

    /// Consume the rest of the line; the newline (or end of input) becomes
    /// the pending character.
    fn skip_comment(&mut self) -> anyhow::Result<char> {
        loop {
            let c = self.in_char()?;
            if c == '\n' || c == EOF_CHAR {
                return Ok(c);
            }
        }
    }

    fn push_char(
        name: &mut String,
        c: char,
        remaining: &mut usize,
        overflowed: &mut bool,
        line: u32,
        diags: &mut Diagnostics,
    ) {
        if *remaining == 0 {
            if !*overflowed {
                *overflowed = true;
                diags.report(DiagnosticKind::TokenTooLong, line, name.as_str(), "");
            }
            return;
        }
        *remaining -= 1;
        name.push(c);
    }

    /// Read the next name, or `None` once the input is exhausted.
    ///
    /// - Embedded periods are kept, but a period followed by whitespace, a
    ///   comment or end of input terminates the name early.
    /// - Runs of embedded spaces and tabs collapse to a single space.
    /// - Any character can be escaped with `\`.
    /// - `|` starts a comment running to the end of the line.
    /// - A colon delimits only when `colon_is_delimiter` is set; `:=` is
    ///   recognized as a single delimiter.
    ///
    /// An empty name reports `MissingName` and is still returned, so the
    /// caller can keep going and surface further problems.
    pub fn read_name(
        &mut self,
        max: usize,
        colon_is_delimiter: bool,
        diags: &mut Diagnostics,
    ) -> anyhow::Result<Option<String>> {
        let mut c = self.in_char()?;

        // Skip to the first character that is not whitespace or comment.
        loop {
            if c == '|' {
                c = self.skip_comment()?;
            } else if is_space(c) {
                c = self.in_char()?;
            } else {
                break;
            }
        }

        if c == EOF_CHAR {
            self.delimiter = Delimiter::EndOfInput;
            return Ok(None);
        }

        let mut name = String::new();
        let mut remaining = max;
        let mut overflowed = false;

        loop {
            if c == ','
                || c == '\n'
                || c == '|'
                || c == EOF_CHAR
                || (colon_is_delimiter && c == ':')
            {
                break;
            }

            if c == '.' {
                // A trailing period is punctuation, not part of the name.
                let next = self.in_char()?;
                if next == '|' || next == EOF_CHAR || is_space(next) {
                    c = next;
                    break;
                }
                Self::push_char(
                    &mut name,
                    '.',
                    &mut remaining,
                    &mut overflowed,
                    self.reader.line(),
                    diags,
                );
                c = next;
                continue;
            }

            if c == '\\' {
                c = self.in_char()?;
                if c == EOF_CHAR {
                    break;
                }
            }

            if is_space(c) {
                Self::push_char(
                    &mut name,
                    ' ',
                    &mut remaining,
                    &mut overflowed,
                    self.reader.line(),
                    diags,
                );
                loop {
                    c = self.in_char()?;
                    if c != ' ' && c != '\t' {
                        break;
                    }
                }
            } else {
                Self::push_char(
                    &mut name,
                    c,
                    &mut remaining,
                    &mut overflowed,
                    self.reader.line(),
                    diags,
                );
                c = self.in_char()?;
            }
        }

        if c == '|' {
            c = self.skip_comment()?;
        }

        self.delimiter = match c {
            ':' => {
                if self.reader.match_in_line('=') {
                    Delimiter::Assign
                } else {
                    Delimiter::Colon
                }
            }
            ',' => Delimiter::Comma,
            '\n' => Delimiter::Newline,
            EOF_CHAR => Delimiter::EndOfInput,
            other => Delimiter::Other(other),
        };

        while name.ends_with(' ') {
            name.pop();
        }

        if name.is_empty() {
            let context = if is_space(c) || c == EOF_CHAR {
                String::from(".")
            } else {
                c.to_string()
            };
            diags.report(
                DiagnosticKind::MissingName,
                self.reader.line(),
                "",
                &context,
            );
        }

        Ok(Some(name))
    }

    /// Raw remainder of the current line, with any pipe comment stripped.
    /// Used as the source text of a derived-attribute definition.
    pub fn read_definition(&mut self) -> anyhow::Result<String> {
        let mut source = String::new();
        loop {
            let mut c = self.in_char()?;
            if c == '|' {
                c = self.skip_comment()?;
            }
            if c == '\n' || c == EOF_CHAR {
                self.delimiter = if c == EOF_CHAR {
                    Delimiter::EndOfInput
                } else {
                    Delimiter::Newline
                };
                break;
            }
            source.push(c);
        }
        Ok(source.trim().to_owned())
    }
}

//! Path expression tokenizer
//!
//! Splits a path string into raw, still unparsed segments. Dots separate
//! segments except inside `[...]` predicate clauses and `{...}` wildcards; a
//! run of two dots is the parent marker. Clause bodies are kept verbatim (escapes
//! included) for the predicate parser.

use crate::error::MalformedPath;

/// A bracket clause suffixed to a segment, without its brackets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawClause {
    pub body: String,
    /// Byte offset of the opening `[`
    pub offset: usize,
}

/// One step of a path expression before typing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSegment {
    /// Token text with escapes resolved
    pub text: String,
    /// Byte offset of the first character of the token
    pub offset: usize,
    /// Whether the token used backslash escapes (escaped tokens are always literal)
    pub escaped: bool,
    /// Whether this is a `..` parent marker
    pub parent: bool,
    pub clauses: Vec<RawClause>,
}

impl RawSegment {
    fn parent_marker(offset: usize) -> Self {
        Self {
            text: "..".to_string(),
            offset,
            escaped: false,
            parent: true,
            clauses: Vec::new(),
        }
    }
}

/// Split `path` into raw segments
///
/// The empty string is valid and yields no segments (the root itself).
pub fn tokenize(path: &str) -> Result<Vec<RawSegment>, MalformedPath> {
    Tokenizer::new(path).run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    AfterSegment,
    AfterSeparator,
    AfterParent,
}

struct Tokenizer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    segments: Vec<RawSegment>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
            segments: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.input.len())
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn error(&self, start: usize, end: usize, reason: impl Into<String>) -> MalformedPath {
        let end = end.clamp(start, self.input.len());
        MalformedPath::new(self.input, &self.input[start..end], start, reason)
    }

    fn run(mut self) -> Result<Vec<RawSegment>, MalformedPath> {
        let mut state = State::Start;
        let mut last_separator = 0;

        while let Some(c) = self.peek() {
            if c == '.' {
                let start = self.offset();
                let dots = self.take_dots();
                if dots == 1 {
                    if state == State::Start {
                        return Err(self.error(start, start + 1, "empty segment before `.`"));
                    }
                    last_separator = start;
                    state = State::AfterSeparator;
                } else if dots % 2 == 0 {
                    self.push_parents(start, dots);
                    self.take_parent_aliases()?;
                    state = State::AfterParent;
                } else {
                    return Err(self.error(start, start + dots, "empty segment between dots"));
                }
            } else {
                if state == State::AfterSegment {
                    let start = self.offset();
                    return Err(self.error(start, start + c.len_utf8(), "unexpected character"));
                }
                self.segment()?;
                state = State::AfterSegment;
            }
        }

        if state == State::AfterSeparator {
            return Err(self.error(last_separator, last_separator + 1, "empty segment after `.`"));
        }

        Ok(self.segments)
    }

    fn take_dots(&mut self) -> usize {
        let mut count = 0;
        while self.peek() == Some('.') {
            self.advance();
            count += 1;
        }
        count
    }

    fn push_parents(&mut self, start: usize, dots: usize) {
        for i in 0..dots / 2 {
            self.segments.push(RawSegment::parent_marker(start + 2 * i));
        }
    }

    /// `../..` is accepted as a spelling of `....`; any other `/` after a
    /// parent run is an error
    fn take_parent_aliases(&mut self) -> Result<(), MalformedPath> {
        while self.peek() == Some('/') {
            if self.peek_at(1) != Some('.') {
                let start = self.offset();
                return Err(self.error(start, start + 1, "expected `..` after `/`"));
            }
            self.advance();
            let start = self.offset();
            let dots = self.take_dots();
            if dots % 2 != 0 {
                return Err(self.error(start, start + dots, "expected `..` after `/`"));
            }
            self.push_parents(start, dots);
        }
        Ok(())
    }

    fn segment(&mut self) -> Result<(), MalformedPath> {
        let start = self.offset();
        let mut text = String::new();
        let mut escaped = false;
        let mut brace_depth = 0usize;
        let mut brace_open = start;

        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    let at = self.offset();
                    self.advance();
                    match self.advance() {
                        Some(next) => {
                            text.push(next);
                            escaped = true;
                        }
                        None => return Err(self.error(at, at + 1, "dangling escape")),
                    }
                }
                '{' => {
                    if brace_depth == 0 {
                        brace_open = self.offset();
                    }
                    brace_depth += 1;
                    text.push(c);
                    self.advance();
                }
                '}' => {
                    if brace_depth == 0 {
                        let at = self.offset();
                        return Err(self.error(at, at + 1, "unbalanced `}`"));
                    }
                    brace_depth -= 1;
                    text.push(c);
                    self.advance();
                }
                '.' | '[' if brace_depth == 0 => break,
                ']' if brace_depth == 0 => {
                    let at = self.offset();
                    return Err(self.error(at, at + 1, "unbalanced `]`"));
                }
                _ => {
                    text.push(c);
                    self.advance();
                }
            }
        }

        if brace_depth > 0 {
            return Err(self.error(brace_open, self.input.len(), "unbalanced `{`"));
        }

        if text.is_empty() {
            let end = self.segment_end(start);
            return Err(self.error(start, end, "predicate without a segment"));
        }

        let mut clauses = Vec::new();
        while self.peek() == Some('[') {
            clauses.push(self.clause()?);
        }

        if let Some(c) = self.peek() {
            if c != '.' {
                let at = self.offset();
                return Err(self.error(
                    at,
                    at + c.len_utf8(),
                    "unexpected character after predicate",
                ));
            }
        }

        self.segments.push(RawSegment {
            text,
            offset: start,
            escaped,
            parent: false,
            clauses,
        });
        Ok(())
    }

    fn clause(&mut self) -> Result<RawClause, MalformedPath> {
        let open = self.offset();
        self.advance();
        let mut depth = 1usize;
        let mut body = String::new();

        loop {
            let c = match self.advance() {
                Some(c) => c,
                None => return Err(self.error(open, self.input.len(), "unbalanced `[`")),
            };
            match c {
                '\\' => {
                    body.push(c);
                    match self.advance() {
                        Some(next) => body.push(next),
                        None => return Err(self.error(open, self.input.len(), "unbalanced `[`")),
                    }
                }
                '[' => {
                    depth += 1;
                    body.push(c);
                }
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    body.push(c);
                }
                _ => body.push(c),
            }
        }

        Ok(RawClause { body, offset: open })
    }

    fn segment_end(&self, start: usize) -> usize {
        self.input[start..]
            .find('.')
            .map(|i| start + i)
            .unwrap_or(self.input.len())
    }
}

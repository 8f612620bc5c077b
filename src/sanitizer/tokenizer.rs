//! Linear-time tag-stream tokenizer.
//!
//! Splits markup into text runs and tag tokens without building a tree. Each
//! `<` is inspected once; quoted attribute values are skipped so a `>` inside
//! a value does not end the tag early.

use std::borrow::Cow;
use std::collections::HashSet;

/// One piece of the tag stream.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Character data between tags, verbatim.
    Text(&'a str),
    /// An opening or closing tag.
    Tag(TagToken<'a>),
    /// Comment, doctype or processing instruction.
    Markup(&'a str),
    /// A `<` that does not start any tag.
    StrayLt,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TagToken<'a> {
    /// Lower-cased tag name.
    pub name: String,
    pub closing: bool,
    /// Everything between the name and the closing `>`, minus a trailing `/`.
    pub attributes: &'a str,
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Per byte, a bitset of [`Scan`] states known to run off the end of the
    /// input without closing a tag. Allocated on the first unterminated tag.
    dead: Vec<u8>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            dead: Vec::new(),
        }
    }

    /// Finds the `>` closing a tag whose attributes start at byte `from`.
    ///
    /// A failed scan marks every state it passed through as dead, and later
    /// scans give up as soon as they reach a dead state. Each byte holds at
    /// most four states, so all scans together stay linear in the input.
    fn find_tag_end(&mut self, from: usize) -> Option<usize> {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut state = Scan::Plain;
        let mut stop = bytes.len();
        for (i, &b) in bytes.iter().enumerate().skip(from) {
            if self.dead.get(i).is_some_and(|known| known & state.bit() != 0) {
                stop = i;
                break;
            }
            match state.step(b) {
                Some(next) => state = next,
                None => return Some(i),
            }
        }
        self.mark_dead(from, stop);
        None
    }

    fn mark_dead(&mut self, from: usize, stop: usize) {
        if self.dead.is_empty() {
            self.dead = vec![0; self.input.len()];
        }
        let input = self.input;
        let mut state = Scan::Plain;
        for (known, &b) in self.dead[from..stop].iter_mut().zip(&input.as_bytes()[from..stop]) {
            *known |= state.bit();
            let Some(next) = state.step(b) else {
                break;
            };
            state = next;
        }
    }

    fn markup(&mut self, rest: &'a str, terminator: &str) -> Token<'a> {
        let end = rest
            .find(terminator)
            .map_or(rest.len(), |i| i + terminator.len());
        self.pos += end;
        Token::Markup(&rest[..end])
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let input = self.input;
        let rest = &input[self.pos..];
        if rest.is_empty() {
            return None;
        }

        if !rest.starts_with('<') {
            let end = rest.find('<').unwrap_or(rest.len());
            self.pos += end;
            return Some(Token::Text(&rest[..end]));
        }

        if rest.starts_with("<!--") {
            return Some(self.markup(rest, "-->"));
        }
        if rest.starts_with("<!") || rest.starts_with("<?") {
            return Some(self.markup(rest, ">"));
        }

        let bytes = rest.as_bytes();
        let closing = bytes.get(1) == Some(&b'/');
        let name_start = if closing { 2 } else { 1 };
        if !bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
            self.pos += 1;
            return Some(Token::StrayLt);
        }

        let name_end = bytes[name_start..]
            .iter()
            .position(|b| !(b.is_ascii_alphanumeric() || *b == b'-'))
            .map_or(bytes.len(), |i| name_start + i);

        let Some(gt) = self.find_tag_end(self.pos + name_end).map(|i| i - self.pos) else {
            // Unterminated tag: treat the `<` as text and keep scanning after it.
            self.pos += 1;
            return Some(Token::StrayLt);
        };

        let attributes = rest[name_end..gt].trim_end_matches('/');
        self.pos += gt + 1;
        Some(Token::Tag(TagToken {
            name: rest[name_start..name_end].to_ascii_lowercase(),
            closing,
            attributes,
        }))
    }
}

/// Scanner state while looking for the `>` that closes a tag.
///
/// A quote only opens a value when it directly follows `=` (modulo
/// whitespace); stray quotes elsewhere are ordinary characters.
#[derive(Debug, Clone, Copy)]
enum Scan {
    Plain,
    AfterEquals,
    Quoted(u8),
}

impl Scan {
    fn bit(self) -> u8 {
        match self {
            Scan::Plain => 1,
            Scan::AfterEquals => 2,
            Scan::Quoted(b'"') => 4,
            Scan::Quoted(_) => 8,
        }
    }

    /// Consumes one byte. `None` means the byte is the closing `>`.
    fn step(self, b: u8) -> Option<Scan> {
        match self {
            Scan::Quoted(q) if b == q => Some(Scan::Plain),
            Scan::Quoted(_) => Some(self),
            _ if b == b'>' => None,
            _ if b == b'=' => Some(Scan::AfterEquals),
            Scan::AfterEquals if b == b'"' || b == b'\'' => Some(Scan::Quoted(b)),
            _ if b.is_ascii_whitespace() => Some(self),
            _ => Some(Scan::Plain),
        }
    }
}

/// A single attribute as written in the source.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RawAttribute<'a> {
    /// Lower-cased attribute name.
    pub name: String,
    /// Entity-decoded value, or `None` for a bare boolean attribute.
    pub value: Option<Cow<'a, str>>,
}

/// Parses an attribute string into its attributes, in source order.
///
/// Handles `name="v"`, `name='v'`, `name=v` and bare `name`. When a name
/// repeats, only the first occurrence is returned.
pub(crate) fn parse_attributes(input: &str) -> Vec<RawAttribute<'_>> {
    let bytes = input.as_bytes();
    let mut attributes: Vec<RawAttribute<'_>> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < bytes.len() && !is_name_terminator(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            // A lone `=` with no name in front of it.
            i += 1;
            continue;
        }
        let name = input[name_start..i].to_ascii_lowercase();

        let mut j = skip_whitespace(bytes, i);
        let value = if bytes.get(j) == Some(&b'=') {
            j = skip_whitespace(bytes, j + 1);
            let (raw, next) = match bytes.get(j) {
                Some(&q @ (b'"' | b'\'')) => {
                    let start = j + 1;
                    let end = bytes[start..]
                        .iter()
                        .position(|&b| b == q)
                        .map_or(bytes.len(), |p| start + p);
                    (&input[start..end], (end + 1).min(bytes.len()))
                }
                _ => {
                    let start = j;
                    let end = bytes[start..]
                        .iter()
                        .position(u8::is_ascii_whitespace)
                        .map_or(bytes.len(), |p| start + p);
                    (&input[start..end], end)
                }
            };
            i = next;
            Some(html_escape::decode_html_entities(raw))
        } else {
            i = j;
            None
        };

        if seen.insert(name.clone()) {
            attributes.push(RawAttribute { name, value });
        }
    }

    attributes
}

fn is_name_terminator(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'=' || b == b'/'
}

fn skip_whitespace(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

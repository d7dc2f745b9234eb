//! Single-pass scanner producing the token stream.
//!
//! The scanner walks the template bytes once, left to right, in one of five
//! mutually exclusive states: `Start` (pristine), `Text` (accumulating a
//! literal span), and one accumulating state per tag shape (`Tag`,
//! `UnescapedTag`, `SetDelimitersTag`). At each position a state-specific
//! lookahead tests whether the remaining input begins with one of the active
//! [`DelimiterSet`] markers; comparisons are literal, case-sensitive, and
//! prefix-exact.
//!
//! Marker priority in `Start` and `Text` is fixed: unescaped-tag start, then
//! set-delimiters start, then tag start. The order matters for delimiter
//! choices where one marker is a prefix of another (`{{{` vs `{{=` vs `{{`
//! under the defaults) and must not be reordered.
//!
//! # Fast path
//!
//! Between marker candidates the scanner does not re-test every byte: it
//! uses memchr to jump straight to the next byte that could begin a marker
//! or be a newline. The newline is always in the needle set, so line
//! accounting never misses, and observable behavior is byte-for-byte
//! identical to the naive loop.

use crate::delimiter_set::{DelimiterSet, UNESCAPED_TAG_END, UNESCAPED_TAG_START};
use crate::parse_error::ParseError;
use crate::token::{Token, TokenKind};

/// Receives the scan's output, in source order.
///
/// Callbacks are invoked synchronously on the calling thread, one at a time.
/// The consumer must not re-enter the same scan from within a callback.
pub trait TokenConsumer<'t> {
    /// Called once per emitted token. Return `false` to halt the scan
    /// immediately: no further callbacks follow, and no error is reported.
    /// This is cooperative early termination, not failure.
    fn on_token(&mut self, token: Token<'t>) -> bool;

    /// Called at most once, only on malformed input; the scan halts after.
    fn on_error(&mut self, error: ParseError);
}

/// Tokenizer for one complete template text.
///
/// Holds only the construction-time delimiter configuration; all scan state
/// lives in locals of [`parse`](Self::parse), so one parser can serve any
/// number of independent `parse` calls.
///
/// ```
/// use mustache_lexer::{TemplateParser, Token, TokenConsumer, TokenKind};
///
/// struct Collect<'t>(Vec<Token<'t>>);
///
/// impl<'t> TokenConsumer<'t> for Collect<'t> {
///     fn on_token(&mut self, token: Token<'t>) -> bool {
///         self.0.push(token);
///         true
///     }
///     fn on_error(&mut self, error: mustache_lexer::ParseError) {
///         panic!("parse error: {error}");
///     }
/// }
///
/// let mut collect = Collect(Vec::new());
/// TemplateParser::new().parse("Hi {{name}}!", &mut collect);
/// assert_eq!(collect.0[1].kind, TokenKind::EscapedVariable("name"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TemplateParser {
    initial: DelimiterSet,
}

impl TemplateParser {
    /// A parser with the standard `{{` / `}}` delimiters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A parser with the embedding configuration's initial delimiters.
    ///
    /// The strings are not validated; empty or otherwise degenerate
    /// delimiters are accepted but unsupported (an empty marker matches
    /// nowhere).
    pub fn with_delimiters(tag_start: &str, tag_end: &str) -> Self {
        Self {
            initial: DelimiterSet::new(tag_start, tag_end),
        }
    }

    /// Scan `template` to completion, feeding `consumer`.
    ///
    /// Fully synchronous and always returns normally: success, malformed
    /// input, and consumer-initiated cancellation are all communicated
    /// through the consumer callbacks, never in-band.
    pub fn parse<'t>(&self, template: &'t str, consumer: &mut impl TokenConsumer<'t>) {
        Scan {
            template,
            bytes: template.as_bytes(),
            consumer,
            delimiters: self.initial.clone(),
            state: State::Start,
            pos: 0,
            span_start: 0,
            line: 1,
            span_line: 1,
        }
        .run();
    }
}

/// The five scanner modes. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    /// Pristine: no pending span. Re-dispatches into `Text` or a tag state
    /// without ever emitting a zero-length text token.
    Start,
    /// Accumulating a literal text span.
    Text,
    /// Accumulating the interior of a plain tag.
    Tag,
    /// Accumulating the interior of a triple-mustache tag. Reachable only
    /// under standard delimiters.
    UnescapedTag,
    /// Accumulating the body of a set-delimiters tag.
    SetDelimitersTag,
}

/// One scan in progress: cursor, span bookkeeping, and the active grammar.
struct Scan<'t, 'c, C> {
    template: &'t str,
    bytes: &'t [u8],
    consumer: &'c mut C,
    /// Grammar in effect at the cursor. Replaced wholesale when a
    /// set-delimiters tag parses; the replacement applies to everything
    /// scanned after that tag.
    delimiters: DelimiterSet,
    state: State,
    /// Cursor: next byte position to examine.
    pos: usize,
    /// First position of the in-progress span.
    span_start: usize,
    /// Running 1-based line number, incremented at every `\n` crossed.
    line: u32,
    /// Line number recorded when the current span began; emitted tokens
    /// report this, not the line at emission time.
    span_line: u32,
}

impl<'t, C: TokenConsumer<'t>> Scan<'t, '_, C> {
    fn run(mut self) {
        while self.pos < self.bytes.len() {
            let keep_going = match self.state {
                State::Start => self.start_state(),
                State::Text => self.text_state(),
                State::Tag => self.tag_state(),
                State::UnescapedTag => self.unescaped_tag_state(),
                State::SetDelimitersTag => self.set_delimiters_state(),
            };
            if !keep_going {
                return;
            }
        }
        self.finish();
    }

    // ─── States ──────────────────────────────────────────────────────────

    fn start_state(&mut self) -> bool {
        self.span_start = self.pos;
        self.span_line = self.line;
        if self.bytes[self.pos] == b'\n' {
            self.state = State::Text;
            self.line += 1;
            self.pos += 1;
        } else if let Some(target) = self.match_open_marker() {
            self.enter_tag_state(target);
        } else {
            self.state = State::Text;
            self.pos += 1;
        }
        true
    }

    fn text_state(&mut self) -> bool {
        if self.bytes[self.pos] == b'\n' {
            self.line += 1;
            self.pos += 1;
            return true;
        }
        if let Some(target) = self.match_open_marker() {
            if self.span_start != self.pos {
                let text = &self.template[self.span_start..self.pos];
                if !self.emit(self.span_line, text, TokenKind::Text(text)) {
                    return false;
                }
            }
            self.enter_tag_state(target);
            return true;
        }
        self.pos = self.skip_inert(Some(self.delimiters.open_probe()));
        true
    }

    fn tag_state(&mut self) -> bool {
        if self.bytes[self.pos] == b'\n' {
            self.line += 1;
            self.pos += 1;
            return true;
        }
        let Some(end_len) = self.marker_len_at(self.delimiters.tag_end()) else {
            self.pos = self.skip_inert(first_byte(self.delimiters.tag_end()));
            return true;
        };
        let raw = &self.template[self.span_start..self.pos + end_len];
        let interior =
            &self.template[self.span_start + self.delimiters.tag_start().len()..self.pos];
        if !self.emit(self.span_line, raw, TokenKind::from_tag_interior(interior)) {
            return false;
        }
        self.leave_tag_state(end_len);
        true
    }

    fn unescaped_tag_state(&mut self) -> bool {
        if self.bytes[self.pos] == b'\n' {
            self.line += 1;
            self.pos += 1;
            return true;
        }
        // This state is only reachable under standard delimiters, where the
        // triple-mustache markers are the fixed `{{{` / `}}}` pair.
        let Some(end_len) = self.marker_len_at(UNESCAPED_TAG_END) else {
            self.pos = self.skip_inert(first_byte(UNESCAPED_TAG_END));
            return true;
        };
        let raw = &self.template[self.span_start..self.pos + end_len];
        let interior = &self.template[self.span_start + UNESCAPED_TAG_START.len()..self.pos];
        if !self.emit(self.span_line, raw, TokenKind::UnescapedVariable(interior)) {
            return false;
        }
        self.leave_tag_state(end_len);
        true
    }

    fn set_delimiters_state(&mut self) -> bool {
        if self.bytes[self.pos] == b'\n' {
            self.line += 1;
            self.pos += 1;
            return true;
        }
        let Some(end_len) = self.marker_len_at(self.delimiters.set_delimiters_end()) else {
            self.pos = self.skip_inert(first_byte(self.delimiters.set_delimiters_end()));
            return true;
        };
        // Body between the leading `=` (end of the open marker) and the
        // trailing `=` (start of the close marker).
        let body_start = self.span_start + self.delimiters.set_delimiters_start().len();
        let body = &self.template[body_start..self.pos];
        let mut fragments = body.split_whitespace();
        let (Some(tag_start), Some(tag_end), None) =
            (fragments.next(), fragments.next(), fragments.next())
        else {
            // Reported at the closing marker's line, not the tag's opening
            // line.
            self.consumer
                .on_error(ParseError::invalid_set_delimiters_tag(self.line));
            return false;
        };
        let raw = &self.template[self.span_start..self.pos + end_len];
        if !self.emit(self.span_line, raw, TokenKind::SetDelimiters) {
            return false;
        }
        self.delimiters = DelimiterSet::new(tag_start, tag_end);
        self.leave_tag_state(end_len);
        true
    }

    /// Flush or fail whatever is pending once the input is exhausted.
    fn finish(&mut self) {
        match self.state {
            State::Start => {}
            State::Text => {
                if self.span_start < self.bytes.len() {
                    let text = &self.template[self.span_start..];
                    // Last token of the scan; the continue flag has nothing
                    // left to cancel.
                    let _ = self.emit(self.span_line, text, TokenKind::Text(text));
                }
            }
            State::Tag | State::UnescapedTag | State::SetDelimitersTag => {
                self.consumer
                    .on_error(ParseError::unclosed_tag(self.span_line));
            }
        }
    }

    // ─── Marker matching ─────────────────────────────────────────────────

    /// Test the open markers at the cursor in priority order: unescaped
    /// tag, set-delimiters tag, plain tag. Returns the state to enter and
    /// the matched marker's length.
    fn match_open_marker(&self) -> Option<(State, usize)> {
        if let Some(len) = self
            .delimiters
            .unescaped_tag_start()
            .and_then(|marker| self.marker_len_at(marker))
        {
            return Some((State::UnescapedTag, len));
        }
        if let Some(len) = self.marker_len_at(self.delimiters.set_delimiters_start()) {
            return Some((State::SetDelimitersTag, len));
        }
        if let Some(len) = self.marker_len_at(self.delimiters.tag_start()) {
            return Some((State::Tag, len));
        }
        None
    }

    /// Byte length of `marker` if the remaining input starts with it.
    ///
    /// An empty marker never matches; a zero-length prefix would match at
    /// every position and the scan would never advance past it.
    fn marker_len_at(&self, marker: &str) -> Option<usize> {
        (!marker.is_empty() && self.bytes[self.pos..].starts_with(marker.as_bytes()))
            .then_some(marker.len())
    }

    // ─── Transitions ─────────────────────────────────────────────────────

    /// Begin a tag span at the cursor and jump past its open marker.
    fn enter_tag_state(&mut self, (state, marker_len): (State, usize)) {
        self.span_start = self.pos;
        self.span_line = self.line;
        self.state = state;
        self.pos += marker_len;
    }

    /// Close the current tag span: jump past the end marker and reset.
    fn leave_tag_state(&mut self, end_len: usize) {
        self.pos += end_len;
        self.span_start = self.pos;
        self.state = State::Start;
    }

    // ─── Emission ────────────────────────────────────────────────────────

    /// Hand one token to the consumer. Returns `false` when the consumer
    /// requested early termination.
    fn emit(&mut self, line: u32, raw_text: &'t str, kind: TokenKind<'t>) -> bool {
        self.consumer.on_token(Token {
            line,
            raw_text,
            kind,
        })
    }

    // ─── Fast path ───────────────────────────────────────────────────────

    /// Jump from the byte after the cursor to the next byte that could
    /// begin the interesting marker or be a newline, or to end of input.
    ///
    /// Every byte skipped is provably inert: it is neither the marker's
    /// first byte nor `\n`, so it can neither open/close anything nor
    /// affect line accounting. `probe` is `None` for a degenerate empty
    /// marker, which matches nowhere; only newlines remain interesting.
    fn skip_inert(&self, probe: Option<u8>) -> usize {
        let from = self.pos + 1;
        if from >= self.bytes.len() {
            return self.bytes.len();
        }
        let hay = &self.bytes[from..];
        let found = match probe {
            Some(byte) if byte != b'\n' => memchr::memchr2(b'\n', byte, hay),
            _ => memchr::memchr(b'\n', hay),
        };
        found.map_or(self.bytes.len(), |offset| from + offset)
    }
}

/// First byte of a marker, or `None` for the degenerate empty marker.
fn first_byte(marker: &str) -> Option<u8> {
    marker.as_bytes().first().copied()
}

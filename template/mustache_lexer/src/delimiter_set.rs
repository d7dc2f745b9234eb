//! Delimiter grammar in effect at a scan position.
//!
//! A [`DelimiterSet`] is an immutable value describing the bracket pairs the
//! scanner currently recognizes: the tag markers themselves, the derived
//! set-delimiters markers, and (under standard `{{` / `}}` delimiters only)
//! the triple-mustache markers for unescaped variables. The scanner replaces
//! the whole set when a set-delimiters tag parses; nothing is mutated in
//! place.
//!
//! Construction never fails. Validating a redefinition (exactly two
//! non-empty fragments) is the scanner's job at the point it parses the
//! set-delimiters tag, not the constructor's.

/// Default tag open marker.
pub const DEFAULT_TAG_START: &str = "{{";
/// Default tag close marker.
pub const DEFAULT_TAG_END: &str = "}}";

/// Unescaped-variable open marker, recognized under standard delimiters only.
pub(crate) const UNESCAPED_TAG_START: &str = "{{{";
/// Unescaped-variable close marker, recognized under standard delimiters only.
pub(crate) const UNESCAPED_TAG_END: &str = "}}}";

/// The bracket pairs currently in effect.
///
/// Derived entirely from the `(tag_start, tag_end)` pair:
///
/// ```text
/// tag_start            = S              e.g.  {{
/// tag_end              = E                    }}
/// unescaped_tag_start  = {{{   (only when S == "{{" and E == "}}")
/// unescaped_tag_end    = }}}   (ditto)
/// set_delimiters_start = S + "="              {{=
/// set_delimiters_end   = "=" + E              =}}
/// ```
///
/// Markers are compared byte-wise and case-sensitively; lengths are byte
/// lengths via [`str::len`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelimiterSet {
    tag_start: String,
    tag_end: String,
    set_delimiters_start: String,
    set_delimiters_end: String,
    /// Standard `{{` / `}}` delimiters, which alone enable the
    /// triple-mustache markers.
    standard: bool,
}

impl DelimiterSet {
    /// Build the set derived from a `(tag_start, tag_end)` pair.
    ///
    /// Accepts any strings, including degenerate ones (empty, or one a
    /// prefix of the other). An empty marker is never matched by the
    /// scanner, so empty delimiters effectively disable tag recognition
    /// rather than matching everywhere.
    pub fn new(tag_start: &str, tag_end: &str) -> Self {
        let standard = tag_start == DEFAULT_TAG_START && tag_end == DEFAULT_TAG_END;
        Self {
            set_delimiters_start: format!("{tag_start}="),
            set_delimiters_end: format!("={tag_end}"),
            tag_start: tag_start.to_owned(),
            tag_end: tag_end.to_owned(),
            standard,
        }
    }

    /// Marker opening a plain tag.
    pub fn tag_start(&self) -> &str {
        &self.tag_start
    }

    /// Marker closing a plain tag.
    pub fn tag_end(&self) -> &str {
        &self.tag_end
    }

    /// Marker opening an unescaped-variable tag, or `None` when the active
    /// delimiters are not the standard `{{` / `}}` pair.
    pub fn unescaped_tag_start(&self) -> Option<&'static str> {
        self.standard.then_some(UNESCAPED_TAG_START)
    }

    /// Marker closing an unescaped-variable tag; gated like
    /// [`unescaped_tag_start`](Self::unescaped_tag_start).
    pub fn unescaped_tag_end(&self) -> Option<&'static str> {
        self.standard.then_some(UNESCAPED_TAG_END)
    }

    /// Marker opening a set-delimiters tag (`tag_start` + `=`).
    pub fn set_delimiters_start(&self) -> &str {
        &self.set_delimiters_start
    }

    /// Marker closing a set-delimiters tag (`=` + `tag_end`).
    pub fn set_delimiters_end(&self) -> &str {
        &self.set_delimiters_end
    }

    /// First byte of every marker that can open a tag.
    ///
    /// `set_delimiters_start` is `tag_start + "="` (never empty), and the
    /// unescaped marker exists only under standard delimiters where it
    /// shares the `{` prefix, so the three open markers always agree on
    /// their first byte. The scanner's fast path searches for this byte.
    pub(crate) fn open_probe(&self) -> u8 {
        self.set_delimiters_start.as_bytes()[0]
    }
}

impl Default for DelimiterSet {
    /// The standard `{{` / `}}` set.
    fn default() -> Self {
        Self::new(DEFAULT_TAG_START, DEFAULT_TAG_END)
    }
}

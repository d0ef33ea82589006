use std::sync::OnceLock;

use regex::Regex;

const BLANK_PATTERN: &str = r"\[\$([0-9]+)\]";

fn blank_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BLANK_PATTERN).expect("blank token pattern is valid"))
}

/// A piece of `fillBlankText`: literal text, or a `[$N]` blank with its hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Blank { raw: &'a str, max_chars: u32 },
}

impl<'a> Segment<'a> {
    /// The exact source text this segment was cut from.
    pub fn raw(&self) -> &'a str {
        match self {
            Segment::Text(text) => text,
            Segment::Blank { raw, .. } => raw,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Segment::Blank { .. })
    }
}

/// Splits `text` into literal runs and blanks, in order. Empty runs are skipped.
pub fn tokenize(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for captures in blank_regex().captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };

        if whole.start() > cursor {
            segments.push(Segment::Text(&text[cursor..whole.start()]));
        }

        // The hint is display-only, so an absurd payload saturates instead of failing.
        let max_chars = captures
            .get(1)
            .map(|digits| digits.as_str().parse::<u32>().unwrap_or(u32::MAX))
            .unwrap_or(u32::MAX);

        segments.push(Segment::Blank { raw: whole.as_str(), max_chars });
        cursor = whole.end();
    }

    if cursor < text.len() {
        segments.push(Segment::Text(&text[cursor..]));
    }

    segments
}

/// Max-character hints of every blank, in answer order.
pub fn blank_hints(text: &str) -> Vec<u32> {
    tokenize(text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Blank { max_chars, .. } => Some(max_chars),
            Segment::Text(_) => None,
        })
        .collect()
}

pub fn blank_count(text: &str) -> usize {
    blank_regex().find_iter(text).count()
}

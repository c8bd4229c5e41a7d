use std::ops::Range;

use crate::engine::MIN_SEARCH_TERM_CHARS;

/// Byte ranges in `source` where any space-separated word of `query`
/// occurs, ignoring case. Overlapping and adjacent ranges are merged.
///
/// Returns nothing for an empty source or a query too short to search.
pub fn match_spans(source: &str, query: &str) -> Vec<Range<usize>> {
    if source.is_empty() || query.trim().chars().count() < MIN_SEARCH_TERM_CHARS
    {
        return Vec::new();
    }

    let lowered = LoweredText::new(source);
    let mut spans: Vec<Range<usize>> = Vec::new();

    for word in query.split(' ').filter(|w| !w.is_empty()) {
        let needle = word.to_lowercase();
        let mut from = 0;
        while let Some(pos) = lowered.text[from..].find(&needle) {
            let start = from + pos;
            let end = start + needle.len();
            spans.push(lowered.original_range(start..end));
            from = end;
        }
    }

    merge(spans)
}

/// Wrap every match of `query` in `source` with `open` and `close`.
pub fn highlight(source: &str, query: &str, open: &str, close: &str) -> String {
    let spans = match_spans(source, query);
    if spans.is_empty() {
        return source.to_string();
    }

    let mut out = String::with_capacity(
        source.len() + spans.len() * (open.len() + close.len()),
    );
    let mut cursor = 0;
    for span in spans {
        out.push_str(&source[cursor..span.start]);
        out.push_str(open);
        out.push_str(&source[span.clone()]);
        out.push_str(close);
        cursor = span.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Lower-cased copy of a string that remembers, for every byte, which
/// original character produced it. Lower-casing can change byte lengths,
/// so offsets found in the copy must be mapped back.
struct LoweredText {
    text: String,
    /// Per lowered byte: (start, end) of the originating source char.
    origin: Vec<(usize, usize)>,
}

impl LoweredText {
    fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len());
        for (start, ch) in source.char_indices() {
            let end = start + ch.len_utf8();
            for lower in ch.to_lowercase() {
                text.push(lower);
                origin.extend(std::iter::repeat_n((start, end), lower.len_utf8()));
            }
        }
        Self { text, origin }
    }

    fn original_range(&self, range: Range<usize>) -> Range<usize> {
        let start = self.origin[range.start].0;
        let end = self.origin[range.end - 1].1;
        start..end
    }
}

fn merge(mut spans: Vec<Range<usize>>) -> Vec<Range<usize>> {
    spans.sort_by_key(|s| (s.start, s.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => {
                last.end = last.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}

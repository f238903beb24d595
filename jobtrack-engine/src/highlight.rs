//! Match spans for on-screen highlighting
//!
//! Display only: splitting a string into matched and unmatched segments
//! uses the same case-insensitive substring rule as the filters, but never
//! influences which records are shown.

use crate::search::fold_case;

/// A run of text and whether it matched the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub is_match: bool,
}

/// Split `text` into ordered spans, marking every case-insensitive
/// occurrence of `query`. Non-overlapping, scanned left to right.
///
/// # Examples
/// ```
/// use jobtrack_engine::highlight::highlight_spans;
///
/// let spans = highlight_spans("Blue cotton, blue dye", "BLUE");
/// let matched: Vec<_> = spans.iter().filter(|s| s.is_match).map(|s| s.text).collect();
/// assert_eq!(matched, vec!["Blue", "blue"]);
/// ```
pub fn highlight_spans<'a>(text: &'a str, query: &str) -> Vec<Span<'a>> {
    if query.is_empty() || text.is_empty() {
        return vec![Span {
            text,
            is_match: false,
        }];
    }

    let folded_query = fold_case(query);

    // For every byte of the folded text, the byte range of the source char
    // that produced it.
    let mut folded = String::with_capacity(text.len());
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(text.len());
    for (start, ch) in text.char_indices() {
        let end = start + ch.len_utf8();
        for lower in ch.to_lowercase() {
            folded.push(lower);
            origin.extend(std::iter::repeat((start, end)).take(lower.len_utf8()));
        }
    }

    let mut spans = Vec::new();
    let mut cursor = 0usize;
    let mut search_from = 0usize;

    while let Some(offset) = folded[search_from..].find(&folded_query) {
        let folded_start = search_from + offset;
        let folded_end = folded_start + folded_query.len();
        let start = origin[folded_start].0;
        let end = origin[folded_end - 1].1;
        search_from = folded_end;

        // A match that begins inside an already emitted char is skipped
        if start < cursor {
            continue;
        }
        if start > cursor {
            spans.push(Span {
                text: &text[cursor..start],
                is_match: false,
            });
        }
        spans.push(Span {
            text: &text[start..end],
            is_match: true,
        });
        cursor = end;
    }

    if cursor < text.len() || spans.is_empty() {
        spans.push(Span {
            text: &text[cursor..],
            is_match: false,
        });
    }

    spans
}

/// Render `text` with every match wrapped in `open`/`close` markers
pub fn mark_matches(text: &str, query: &str, open: &str, close: &str) -> String {
    highlight_spans(text, query)
        .into_iter()
        .map(|span| {
            if span.is_match {
                format!("{}{}{}", open, span.text, close)
            } else {
                span.text.to_string()
            }
        })
        .collect()
}

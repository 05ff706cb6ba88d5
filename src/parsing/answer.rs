//! Answer key and reaction-time extraction.
//!
//! Which column pair holds the response depends on which trial-type
//! handler recorded the row; only one variant is populated per row.

use super::sheet::{Row, Sheet};

/// Key/RT column pairs in recording-handler priority order.
const ANSWER_VARIANTS: [(&str, &str); 3] = [
    ("key_resp.keys", "key_resp.rt"),
    ("key_resp_3.keys", "key_resp_3.rt"),
    ("key_resp_6.keys", "key_resp_6.rt"),
];

/// Extract the answer keypress and its latency from whichever variant this
/// row populates. The first variant with a non-missing key cell wins;
/// variants are never merged. Returns (None, None) when no response was
/// recorded.
pub fn decode_answer(row: &Row<'_>) -> (Option<String>, Option<f64>) {
    for (key_col, rt_col) in ANSWER_VARIANTS {
        if let Some(key) = row.get(key_col) {
            return (Some(key.to_string()), row.parse_f64(rt_col));
        }
    }
    (None, None)
}

/// True when at least one variant's key column exists in the sheet.
pub fn has_answer_variant(sheet: &Sheet) -> bool {
    ANSWER_VARIANTS
        .iter()
        .any(|(key_col, _)| sheet.has_column(key_col))
}

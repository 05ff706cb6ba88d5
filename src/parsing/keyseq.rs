//! Decoder for the serialized keypress sequences the rating controls
//! record.
//!
//! The control widget logs something like `["comma","period"]`. Only a
//! bracketed, comma-separated list of quoted tokens is accepted; anything
//! else is a decode anomaly, not an error, and the raw text is never
//! evaluated.

/// Map the last keypress of a control sequence onto the 4-point scale.
/// Used identically for the strategy and vividness controls.
pub fn decode_keypress_sequence(raw: &str) -> Option<u8> {
    let tokens = match parse_token_list(raw) {
        Some(tokens) => tokens,
        None => {
            log::warn!("unparseable keypress sequence: {raw:?}");
            return None;
        }
    };

    // An empty sequence means no rating was given; only the last keypress
    // counts when the participant corrected themselves.
    let last = tokens.last()?;
    let rating = rating_for_key(last);
    if rating.is_none() {
        log::debug!("keypress '{last}' has no rating mapping");
    }
    rating
}

/// `rshift`/`slash`/`period`/`comma` map to 4/3/2/1.
fn rating_for_key(key: &str) -> Option<u8> {
    match key {
        "rshift" => Some(4),
        "slash" => Some(3),
        "period" => Some(2),
        "comma" => Some(1),
        _ => None,
    }
}

/// Parse a bracketed, comma-separated list of quoted tokens. Tokens may be
/// single- or double-quoted. Returns None for anything outside that
/// grammar.
fn parse_token_list(raw: &str) -> Option<Vec<String>> {
    let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut rest = inner;
    loop {
        let mut chars = rest.chars();
        let quote = match chars.next() {
            Some(q @ ('\'' | '"')) => q,
            _ => return None,
        };
        let body = chars.as_str();
        let end = body.find(quote)?;
        tokens.push(body[..end].to_string());
        rest = body[end + 1..].trim_start();

        if rest.is_empty() {
            return Some(tokens);
        }
        rest = rest.strip_prefix(',')?.trim_start();
        if rest.is_empty() {
            // Trailing comma is outside the grammar.
            return None;
        }
    }
}

// src/news/text.rs
use once_cell::sync::OnceCell;
use regex::Regex;

/// Strip tags, decode entities, fold quotes and whitespace.
pub fn clean_text(s: &str) -> String {
    // 1) Strip HTML tags; escaped `&lt;` text survives as content
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags =
        RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z!][^>]*>").expect("tag regex"));
    let stripped = re_tags.replace_all(s, " ");

    // 2) HTML entity decode
    let mut out = html_escape::decode_html_entities(&stripped).to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (incl. NBSP)
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Cut to at most `max_chars` characters (not bytes).
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].trim_end().to_string(),
        None => s.to_string(),
    }
}

/// Snippet for downstream payloads: cleaned, bounded, `None` when empty.
pub fn snippet(raw: Option<&str>, max_chars: usize) -> Option<String> {
    let cleaned = clean_text(raw?);
    let cut = truncate_chars(&cleaned, max_chars);
    if cut.is_empty() {
        None
    } else {
        Some(cut)
    }
}

/// Non-empty cleaned value, or `None`.
pub fn non_blank(raw: Option<&str>) -> Option<String> {
    let v = clean_text(raw?);
    (!v.is_empty()).then_some(v)
}

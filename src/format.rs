//! Turn text formatting for HTML renderers
//!
//! Backend text is untrusted: it is escaped first, and only then are the
//! lightweight markup rules applied, so nothing the backend echoes can
//! inject markup of its own.

use crate::transcript::Speaker;
use regex::Regex;
use std::sync::OnceLock;

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render turn text as an HTML fragment.
///
/// `**bold**` becomes `<strong>`, `*italic*` becomes `<em>` and line breaks
/// become `<br>`. Everything else is escaped.
pub fn format_turn_html(text: &str) -> String {
    static BOLD_RE: OnceLock<Regex> = OnceLock::new();
    static ITALIC_RE: OnceLock<Regex> = OnceLock::new();

    let bold = BOLD_RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"));
    let italic =
        ITALIC_RE.get_or_init(|| Regex::new(r"\*([^*\n]+?)\*").expect("valid italic regex"));

    let escaped = escape_html(text);
    let out = bold.replace_all(&escaped, "<strong>$1</strong>");
    let out = italic.replace_all(&out, "<em>$1</em>");
    out.replace("\r\n", "\n").replace('\n', "<br>")
}

/// Display label for a speaker
pub fn speaker_label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "You",
        Speaker::Bot => "Assistant",
        Speaker::System => "System",
    }
}

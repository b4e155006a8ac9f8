use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::types::{Directive, DirectiveKind};

static ACTION_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[ACTION:(GAME|MUSIC|EMERGENCY|BREATHING|JOURNAL)(?::([^\]]*))?\]")
        .expect("action tag pattern is valid")
});

/// Display text with every action tag stripped, plus the tags in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedReply {
    pub text: String,
    pub directives: Vec<Directive>,
}

/// Pulls `[ACTION:KIND]` / `[ACTION:KIND:payload]` tags out of generated text.
///
/// Unknown kinds and malformed brackets are not tags; they stay in the text.
pub fn parse_directives(text: &str) -> ParsedReply {
    let mut directives = Vec::new();
    let mut clean = String::with_capacity(text.len());
    let mut cursor = 0;

    for caps in ACTION_TAG.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(kind) = caps.get(1).and_then(|m| DirectiveKind::from_tag(m.as_str())) else {
            continue;
        };
        let payload = caps.get(2).map(|m| m.as_str()).filter(|p| !p.is_empty());

        directives.push(Directive::from_tag(kind, payload));
        splice(&mut clean, &text[cursor..whole.start()]);
        cursor = whole.end();
    }
    splice(&mut clean, &text[cursor..]);

    ParsedReply {
        text: clean.trim().to_string(),
        directives,
    }
}

// Joins the text on either side of a removed tag without leaving a doubled gap.
fn splice(out: &mut String, segment: &str) {
    let segment_leads_with_space = segment.starts_with(char::is_whitespace);
    if segment_leads_with_space && out.ends_with(char::is_whitespace) {
        let kept = out.trim_end_matches([' ', '\t']).len();
        out.truncate(kept);
    }
    out.push_str(segment);
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DirectiveKind {
    Game,
    Music,
    Emergency,
    Breathing,
    Journal,
}

impl DirectiveKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.to_ascii_uppercase().as_str() {
            "GAME" => DirectiveKind::Game,
            "MUSIC" => DirectiveKind::Music,
            "EMERGENCY" => DirectiveKind::Emergency,
            "BREATHING" => DirectiveKind::Breathing,
            "JOURNAL" => DirectiveKind::Journal,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            DirectiveKind::Game => "GAME",
            DirectiveKind::Music => "MUSIC",
            DirectiveKind::Emergency => "EMERGENCY",
            DirectiveKind::Breathing => "BREATHING",
            DirectiveKind::Journal => "JOURNAL",
        }
    }
}

/// An in-app action requested by a chat reply.
///
/// Serialized the way the UI consumes it: `{"type": "GAME", "gameType": "relaxing"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Directive {
    Game {
        #[serde(rename = "gameType", default, skip_serializing_if = "Option::is_none")]
        game_type: Option<String>,
    },
    Music,
    Emergency,
    Breathing,
    Journal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
    },
}

impl Directive {
    /// Game hints are lower-cased, journal prompts kept verbatim, other
    /// payloads dropped.
    pub fn from_tag(kind: DirectiveKind, payload: Option<&str>) -> Self {
        match kind {
            DirectiveKind::Game => Directive::Game {
                game_type: payload.map(str::to_lowercase),
            },
            DirectiveKind::Music => Directive::Music,
            DirectiveKind::Emergency => Directive::Emergency,
            DirectiveKind::Breathing => Directive::Breathing,
            DirectiveKind::Journal => Directive::Journal {
                prompt: payload.map(str::to_string),
            },
        }
    }

    /// Renders the directive back into its inline `[ACTION:...]` form.
    pub fn to_tag(&self) -> String {
        match self {
            Directive::Game { game_type: Some(game) } => format!("[ACTION:GAME:{game}]"),
            Directive::Journal { prompt: Some(prompt) } => format!("[ACTION:JOURNAL:{prompt}]"),
            other => format!("[ACTION:{}]", other.kind().as_tag()),
        }
    }

    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Game { .. } => DirectiveKind::Game,
            Directive::Music => DirectiveKind::Music,
            Directive::Emergency => DirectiveKind::Emergency,
            Directive::Breathing => DirectiveKind::Breathing,
            Directive::Journal { .. } => DirectiveKind::Journal,
        }
    }
}

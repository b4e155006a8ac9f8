use super::types::Emotion;

/// Supportive nudge attached to an `emotion_update` when the stable emotion
/// changes. Neutral has none.
pub fn suggestion_for(emotion: Emotion) -> Option<&'static str> {
    match emotion {
        Emotion::Angry => Some(
            "I notice you might be feeling frustrated. Would you like to try a breathing exercise to help calm down?",
        ),
        Emotion::Disgusted => Some(
            "It seems something is bothering you. Would you like to talk about what's on your mind?",
        ),
        Emotion::Fear => Some(
            "I sense you might be feeling anxious. Remember, it's okay to feel this way. Would you like some relaxation techniques?",
        ),
        Emotion::Happy => Some(
            "It's wonderful to see you in good spirits! Is there something positive you'd like to share?",
        ),
        Emotion::Sad => Some(
            "I notice you might be feeling down. I'm here to listen if you'd like to talk about it.",
        ),
        Emotion::Surprise => Some(
            "Something seems to have caught your attention! Would you like to discuss what's on your mind?",
        ),
        Emotion::Neutral => None,
    }
}

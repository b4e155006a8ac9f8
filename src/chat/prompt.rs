use super::history::{ChatMessage, Sender};
use crate::services::llm::CompletionMessage;

const MAX_HISTORY_MESSAGES: usize = 20;

/// Builds the system directive for one chat turn: persona, the in-app action
/// tags the model may emit, and the caller's emotional and health context.
pub fn system_prompt(emotion: &str, health_context: &str) -> String {
    format!(
        "You are Dr.Chat, a caring medical and mental-health assistant. \
Only answer health, wellness and emotional-support questions; politely decline anything else.\n\
Keep replies to 2-4 sentences and answer in the user's language.\n\
\n\
In-app actions you may append when appropriate:\n\
- [ACTION:EMERGENCY] for self-harm, suicide or danger (also mention 108 / 112)\n\
- [ACTION:BREATHING] for anxiety or panic\n\
- [ACTION:MUSIC] for relaxation\n\
- [ACTION:JOURNAL:prompt] for emotional processing, with a journaling prompt\n\
- [ACTION:GAME:relaxing] for stress relief\n\
Link games as markdown, e.g. [Bunny Runner](/game/1).\n\
\n\
User health profile: {health_context}\n\
Current detected emotion: {emotion}"
    )
}

/// System directive, the most recent history, then the new user message.
pub fn completion_messages(
    emotion: &str,
    health_context: &str,
    history: &[ChatMessage],
    user_message: &str,
) -> Vec<CompletionMessage> {
    let start = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
    let mut messages = Vec::with_capacity(history.len() - start + 2);
    messages.push(CompletionMessage::system(system_prompt(emotion, health_context)));
    messages.extend(history[start..].iter().map(|m| match m.sender {
        Sender::User => CompletionMessage::user(m.text.clone()),
        Sender::Bot => CompletionMessage::assistant(m.with_tags()),
    }));
    messages.push(CompletionMessage::user(user_message));
    messages
}

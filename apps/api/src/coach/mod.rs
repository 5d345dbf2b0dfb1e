//! Recruiter coach — a free-form chat grounded on the session's résumé, posting
//! and analysis. The chat history lives in `Session::coach_log`.

pub mod handlers;
pub mod prompts;

use tracing::info;

use crate::coach::prompts::build_coach_prompt;
use crate::interview::models::{ConversationLog, SessionContext};
use crate::llm_client::{ChatMessage, ChatModel, LlmError};

const COACH_TEMPERATURE: f32 = 0.7;

/// Result of one coach exchange. Nothing is stored until the caller commits `log`.
#[derive(Debug, Clone)]
pub struct CoachExchange {
    pub reply: String,
    pub log: ConversationLog,
}

/// Sends the context prompt, the last `history_window` chat messages and the new
/// `message`, and returns the reply with the extended log.
pub async fn coach_reply(
    context: &SessionContext,
    log: &ConversationLog,
    message: &str,
    model: &dyn ChatModel,
    history_window: usize,
) -> Result<CoachExchange, LlmError> {
    let mut messages = Vec::with_capacity(history_window + 2);
    messages.push(ChatMessage::system(build_coach_prompt(context)));
    messages.extend_from_slice(log.window(history_window));
    messages.push(ChatMessage::user(message));

    let reply = model.complete(&messages, COACH_TEMPERATURE).await?;

    let mut log = log.clone();
    log.push(ChatMessage::user(message));
    log.push(ChatMessage::assistant(reply.clone()));
    info!(
        "Coach exchange: message_chars={} history={}",
        message.chars().count(),
        log.len()
    );

    Ok(CoachExchange { reply, log })
}

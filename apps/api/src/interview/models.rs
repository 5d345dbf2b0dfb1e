use serde::{Deserialize, Serialize};

use crate::llm_client::{ChatMessage, Role};

/// Number of questions asked before the interview moves on to its summary.
pub const QUESTION_TARGET: u32 = 3;

/// The résumé / posting / analysis bundle every turn of a session is grounded on.
/// Fields are free text; truncation happens where prompts are built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionContext {
    pub resume_text: String,
    pub job_posting_text: String,
    pub gap_analysis_text: String,
    pub rewritten_resume_text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Collecting,
    Summarizing,
    Done,
}

/// Question counter plus phase. Only the turn controller produces new values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewState {
    pub questions_asked: u32,
    pub phase: Phase,
}

/// Ordered user / assistant utterances of one conversation (interview or coach chat).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationLog {
    messages: Vec<ChatMessage>,
}

impl ConversationLog {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// The last `limit` messages, oldest first. This is what gets resent to the model.
    pub fn window(&self, limit: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    pub fn user_utterances(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

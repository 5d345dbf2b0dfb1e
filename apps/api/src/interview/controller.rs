//! Turn-taking controller — decides, for each candidate utterance, whether to ask
//! the next question, announce the summary, or deliver it.
//!
//! Phase transitions (target = 3 questions):
//!
//! ```text
//! collecting, asked < 3   → ask question asked+1, asked += 1
//! collecting, asked >= 3  → fixed transition message, phase = summarizing (no model call)
//! summarizing             → recruiter summary of every answer, phase = done
//! done                    → fresh summary of every answer, phase stays done
//! ```
//!
//! The phase flip to `summarizing` happens one turn after the third question, so
//! the candidate answers it and hears the transition before the summary.
//!
//! The controller never mutates the session: it returns the next log and state in
//! a `TurnOutcome`, and the caller commits it once the reply has been voiced.

use serde::Serialize;
use tracing::info;

use crate::interview::models::{ConversationLog, InterviewState, Phase, QUESTION_TARGET};
use crate::interview::prompts::{
    build_context_prompt, build_question_instruction, build_summary_prompt, limit_sentences,
    SUMMARY_MAX_SENTENCES, TRANSITION_MESSAGE,
};
use crate::interview::session::Session;
use crate::llm_client::{ChatMessage, ChatModel, LlmError};

/// Sampling temperature for interview questions and the summary.
const INTERVIEW_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnAction {
    AskQuestion { number: u32 },
    Transition,
    Summarize,
}

/// What the interview state machine will do with the next utterance.
pub fn next_action(state: &InterviewState) -> TurnAction {
    match state.phase {
        Phase::Collecting if state.questions_asked < QUESTION_TARGET => TurnAction::AskQuestion {
            number: state.questions_asked + 1,
        },
        Phase::Collecting => TurnAction::Transition,
        Phase::Summarizing | Phase::Done => TurnAction::Summarize,
    }
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub action: TurnAction,
    pub reply: String,
    pub log: ConversationLog,
    pub state: InterviewState,
}

#[derive(Debug, Clone, Copy)]
pub struct TurnController {
    /// Log messages resent with each question prompt.
    history_window: usize,
}

impl TurnController {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub async fn take_turn(
        &self,
        session: &Session,
        utterance: &str,
        model: &dyn ChatModel,
    ) -> Result<TurnOutcome, LlmError> {
        let action = next_action(&session.state);
        let mut log = session.log.clone();
        let mut state = session.state;

        // The answer is recorded whatever the phase, so the summary sees it.
        log.push(ChatMessage::user(utterance));

        let reply = match action {
            TurnAction::AskQuestion { number } => {
                let mut messages = Vec::with_capacity(self.history_window + 3);
                messages.push(ChatMessage::system(build_context_prompt(&session.context)));
                messages.extend_from_slice(session.log.window(self.history_window));
                messages.push(ChatMessage::user(utterance));
                messages.push(ChatMessage::system(build_question_instruction(
                    number,
                    QUESTION_TARGET,
                )));

                let question = model.complete(&messages, INTERVIEW_TEMPERATURE).await?;
                state.questions_asked += 1;
                log.push(ChatMessage::assistant(question.clone()));
                question
            }
            TurnAction::Transition => {
                state.phase = Phase::Summarizing;
                TRANSITION_MESSAGE.to_string()
            }
            TurnAction::Summarize => {
                let prompt = build_summary_prompt(&session.context, log.user_utterances());
                let summary = model
                    .complete(&[ChatMessage::system(prompt)], INTERVIEW_TEMPERATURE)
                    .await?;
                let summary = limit_sentences(&summary, SUMMARY_MAX_SENTENCES).to_string();
                state.phase = Phase::Done;
                log.push(ChatMessage::assistant(summary.clone()));
                summary
            }
        };

        info!(
            "Interview turn: utterance_chars={} action={:?} questions_asked={} phase={:?}",
            utterance.chars().count(),
            action,
            state.questions_asked,
            state.phase
        );

        Ok(TurnOutcome {
            action,
            reply,
            log,
            state,
        })
    }
}

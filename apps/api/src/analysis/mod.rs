//! Résumé analysis — gap analysis, résumé rewrite, and fit score against a posting.
//! All LLM calls go through `llm_client::ChatModel`.

pub mod handlers;
pub mod prompts;

use crate::analysis::prompts::{
    gap_analysis_system, rewrite_system, score_system, GAP_ANALYSIS_PROMPT_TEMPLATE,
    REWRITE_PROMPT_TEMPLATE, SCORE_PROMPT_TEMPLATE,
};
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, ChatModel};

const CREATIVE_TEMPERATURE: f32 = 0.7;
const SCORING_TEMPERATURE: f32 = 0.0;

async fn ask(
    llm: &dyn ChatModel,
    system: String,
    prompt: String,
    temperature: f32,
    task: &str,
) -> Result<String, AppError> {
    let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
    llm.complete(&messages, temperature)
        .await
        .map_err(|e| AppError::Llm(format!("{task} failed: {e}")))
}

/// Gaps, suggestions, likely interview questions and a skills roadmap.
pub async fn analyze_gap(
    llm: &dyn ChatModel,
    cv_text: &str,
    offer_text: &str,
) -> Result<String, AppError> {
    let prompt = GAP_ANALYSIS_PROMPT_TEMPLATE
        .replace("{cv_text}", cv_text)
        .replace("{offer_text}", offer_text);
    ask(llm, gap_analysis_system(), prompt, CREATIVE_TEMPERATURE, "Gap analysis").await
}

/// The résumé rewritten with `suggestions` folded in.
pub async fn rewrite_resume(
    llm: &dyn ChatModel,
    cv_text: &str,
    suggestions: &str,
) -> Result<String, AppError> {
    let prompt = REWRITE_PROMPT_TEMPLATE
        .replace("{cv_text}", cv_text)
        .replace("{suggestions}", suggestions);
    ask(llm, rewrite_system(), prompt, CREATIVE_TEMPERATURE, "Resume rewrite").await
}

/// Match score between 0 and 100.
pub async fn score_fit(
    llm: &dyn ChatModel,
    cv_text: &str,
    offer_text: &str,
) -> Result<u8, AppError> {
    let prompt = SCORE_PROMPT_TEMPLATE
        .replace("{cv_text}", cv_text)
        .replace("{offer_text}", offer_text);
    let reply = ask(llm, score_system(), prompt, SCORING_TEMPERATURE, "Fit scoring").await?;
    Ok(parse_score(&reply))
}

/// First run of digits in the reply, clamped to 100. No digits → 0.
/// "85/100" scores 85: the denominator is never read.
fn parse_score(reply: &str) -> u8 {
    let digits: String = reply
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return 0;
    }
    // Anything too long for u32 is past 100 anyway.
    digits
        .parse::<u32>()
        .map(|n| n.min(100) as u8)
        .unwrap_or(100)
}

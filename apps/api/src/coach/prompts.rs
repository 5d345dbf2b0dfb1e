// Coach chat prompt templates.

use crate::interview::models::SessionContext;
use crate::interview::prompts::truncate_chars;
use crate::llm_client::prompts::RECRUITER_PERSONA;

/// Résumés and posting are cut to this many characters in the coach prompt.
pub const COACH_FIELD_LIMIT: usize = 1000;

/// The gap analysis is longer than the other fields and gets more room.
pub const COACH_ANALYSIS_LIMIT: usize = 1500;

/// System message that opens every coach exchange.
pub fn build_coach_prompt(ctx: &SessionContext) -> String {
    format!(
        "{RECRUITER_PERSONA} You are coaching the candidate on their application.\n\n\
         Context:\n\
         - Original resume: {}\n\
         - Resume rewritten by the AI: {}\n\
         - Job posting: {}\n\
         - AI gap analysis: {}\n\n\
         Answer as a recruiter: explain, advise, rephrase, and anticipate the \
         interview questions the candidate is likely to face.",
        truncate_chars(&ctx.resume_text, COACH_FIELD_LIMIT),
        truncate_chars(&ctx.rewritten_resume_text, COACH_FIELD_LIMIT),
        truncate_chars(&ctx.job_posting_text, COACH_FIELD_LIMIT),
        truncate_chars(&ctx.gap_analysis_text, COACH_ANALYSIS_LIMIT),
    )
}

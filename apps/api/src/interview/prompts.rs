// Interview prompt templates and fixed replies.

use crate::interview::models::SessionContext;
use crate::llm_client::prompts::{RECRUITER_PERSONA, SPOKEN_OUTPUT_RULES};

/// Each context field is cut to this many characters before it reaches the model.
pub const CONTEXT_FIELD_LIMIT: usize = 1000;

/// Reply sent, without a model call, on the turn after the last question.
pub const TRANSITION_MESSAGE: &str =
    "Thank you for your answers. Here is a spoken summary of your interview.";

/// Upper bound on the sentences kept from the summary reply.
pub const SUMMARY_MAX_SENTENCES: usize = 4;

/// First `limit` characters of `text`. Not word-aware.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// System message seeding every interview model call.
pub fn build_context_prompt(ctx: &SessionContext) -> String {
    format!(
        "{RECRUITER_PERSONA} You are simulating a job interview with the candidate.\n\n\
         Context:\n\
         - Resume: {}\n\
         - Job posting: {}\n\
         - AI gap analysis: {}\n\
         - Rewritten resume: {}\n",
        truncate_chars(&ctx.resume_text, CONTEXT_FIELD_LIMIT),
        truncate_chars(&ctx.job_posting_text, CONTEXT_FIELD_LIMIT),
        truncate_chars(&ctx.gap_analysis_text, CONTEXT_FIELD_LIMIT),
        truncate_chars(&ctx.rewritten_resume_text, CONTEXT_FIELD_LIMIT),
    )
}

/// Instruction appended after the candidate's latest utterance when a question is due.
pub fn build_question_instruction(number: u32, total: u32) -> String {
    format!(
        "Ask one relevant HR question tailored to the position, without commenting \
         on the previous answer. This is question {number} of {total}. {SPOKEN_OUTPUT_RULES}"
    )
}

/// Single-message prompt asking for the final recruiter feedback.
pub fn build_summary_prompt<'a>(
    ctx: &SessionContext,
    answers: impl Iterator<Item = &'a str>,
) -> String {
    let mut prompt = build_context_prompt(ctx);
    prompt.push_str("\nHere are the candidate's answers:\n");
    for answer in answers {
        prompt.push_str("- ");
        prompt.push_str(answer);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nGive overall recruiter feedback in {SUMMARY_MAX_SENTENCES} sentences maximum. \
         {SPOKEN_OUTPUT_RULES}"
    ));
    prompt
}

/// Keeps at most `max` sentences. A sentence ends at `.`, `!` or `?` followed by
/// whitespace or the end of the text.
pub fn limit_sentences(text: &str, max: usize) -> &str {
    let mut count = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                count += 1;
                if count == max {
                    return text[..idx + ch.len_utf8()].trim();
                }
            }
        }
    }
    text.trim()
}

// Résumé analysis prompt templates.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{INTEGER_ONLY_RULES, RECRUITER_PERSONA};

pub fn gap_analysis_system() -> String {
    format!(
        "{RECRUITER_PERSONA} You will receive two blocks of text:\n\
         1. The full text of a resume.\n\
         2. The full text of a job posting.\n\n\
         Your task:\n\
         - Analyse the gaps between the resume and the job posting.\n\
         - For each gap, give concrete suggestions: skills to add, experience to highlight.\n\
         - List the interview questions the candidate is likely to be asked for this posting.\n\
         - Give a detailed roadmap to acquire the missing skills.\n\
         - Return ONLY the structured suggestions; do not repeat the resume or the posting."
    )
}

/// Replace `{cv_text}` and `{offer_text}` before sending.
pub const GAP_ANALYSIS_PROMPT_TEMPLATE: &str = "=== ORIGINAL RESUME ===\n{cv_text}\n\n\
=== JOB POSTING ===\n{offer_text}\n\n\
=== WRITE YOUR ANALYSIS BELOW ===";

pub fn rewrite_system() -> String {
    format!(
        "{RECRUITER_PERSONA} You will receive:\n\
         1. A complete resume (plain text).\n\
         2. A list of suggestions to improve it.\n\n\
         Your task:\n\
         - Rewrite the resume, integrating the improvements without repeating what is already there.\n\
         - Missing experience may be presented as personal projects or relevant training, never invented.\n\
         - Match the writing style of the target employer: sober and structured for large \
           companies, more dynamic and concise for start-ups.\n\
         - Keep the structure of the original resume: headings, lists, bullets, capitalisation.\n\
         - Improve readability and wording; avoid redundancy and overly long lists.\n\
         - Return ONLY the final resume text."
    )
}

/// Replace `{cv_text}` and `{suggestions}` before sending.
pub const REWRITE_PROMPT_TEMPLATE: &str = "=== ORIGINAL RESUME ===\n{cv_text}\n\n\
=== AI SUGGESTIONS ===\n{suggestions}\n\n\
=== WRITE THE UPDATED RESUME HERE ===";

pub fn score_system() -> String {
    format!(
        "{RECRUITER_PERSONA} Rate how well a resume matches a job posting \
         from 0 (no match) to 100 (perfect match). {INTEGER_ONLY_RULES}"
    )
}

/// Replace `{cv_text}` and `{offer_text}` before sending.
pub const SCORE_PROMPT_TEMPLATE: &str = "=== ORIGINAL RESUME ===\n{cv_text}\n\n\
=== JOB POSTING ===\n{offer_text}\n\n\
=== GIVE THE SCORE (0 to 100) ===";

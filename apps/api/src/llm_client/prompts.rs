// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting persona and output rules.

/// Persona used for every recruiter-facing prompt (interview and analysis).
pub const RECRUITER_PERSONA: &str = "You are an experienced HR recruiter.";

/// Appended to prompts whose output is read aloud by the speech synthesizer.
pub const SPOKEN_OUTPUT_RULES: &str = "\
    Your reply will be read aloud. Write plain sentences only: \
    no markdown, no lists, no headings, no emojis.";

/// Appended to prompts whose output must be a bare number.
pub const INTEGER_ONLY_RULES: &str = "\
    Reply with a single integer only. \
    Do NOT add comments, units, or explanations.";

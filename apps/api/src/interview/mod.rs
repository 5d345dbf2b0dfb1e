// Mock interview: session state, turn-taking controller, and its HTTP handlers.
// Model calls go through llm_client::ChatModel; audio goes through speech::SpeechIo.

pub mod controller;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod session;

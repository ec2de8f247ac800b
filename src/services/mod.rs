pub mod extraction;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod queue;
pub mod webhook;

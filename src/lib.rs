//! Call transcription classifier
//!
//! This library provides the worker that pops call-transcription jobs from a
//! Redis queue, asks an OpenAI-compatible model for a title and category, and
//! forwards the result to a webhook.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;

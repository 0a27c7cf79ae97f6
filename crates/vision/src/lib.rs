//! Try-on video frame validation through a vision-language model.
//!
//! The client extracts still frames and uploads them as base64 JPEG. Each
//! frame is sent to an OpenAI-compatible chat-completions endpoint in its
//! own request; the per-frame verdicts are combined by
//! [`fitback_core::video_validation::aggregate`].

pub mod analyzer;
pub mod client;
pub mod config;

pub use analyzer::{validate_frames, FrameAnalyzer, ScriptedAnalyzer};
pub use client::{VisionClient, VisionError};
pub use config::VisionConfig;

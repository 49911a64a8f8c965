//! Chat tutor backed by a hosted language model.
//!
//! # Data Flow
//! ```text
//! question
//!     → client.rs (generateContent with fixed system instruction)
//!     → reply text, or a static fallback on any failure
//! ```

pub mod client;

pub use client::{ReplySource, TutorClient, TutorError, TutorReply, EMPTY_REPLY, FALLBACK_REPLY, GREETING};

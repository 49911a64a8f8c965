//! Supplementary teaching demos.
//!
//! Small deterministic units that sit next to the core engines:
//! - cache.rs: cold miss then warm hits
//! - journey.rs: the eight stages of a request inside a gateway
//! - orchestration.rs: one order fanned out across three services
//! - quiz.rs: static questions and scoring

pub mod cache;
pub mod journey;
pub mod orchestration;
pub mod quiz;

pub use cache::{CacheFetch, EdgeCache};
pub use journey::{JourneyView, RequestJourney, Stage};
pub use orchestration::{OrderPhase, PhaseEvent};
pub use quiz::{AnswerOutcome, QuizError, QuizQuestion, QuizSession, QuizView, QUESTIONS};

//! Quiz dataset and scoring.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub id: u32,
    pub question: &'static str,
    pub options: [&'static str; 4],
    #[serde(skip)]
    pub answer: &'static str,
}

pub static QUESTIONS: [QuizQuestion; 3] = [
    QuizQuestion {
        id: 1,
        question: "What is the primary architectural role of an API Gateway?",
        options: [
            "To act as a central database for all microservices",
            "To provide a single, unified entry point for clients",
            "To replace the need for frontend development",
            "To handle the physical hardware of servers",
        ],
        answer: "To provide a single, unified entry point for clients",
    },
    QuizQuestion {
        id: 2,
        question: "Which Gateway feature is specifically designed to prevent resource abuse?",
        options: [
            "Request Transformation",
            "Protocol Translation",
            "Rate Limiting",
            "Service Discovery",
        ],
        answer: "Rate Limiting",
    },
    QuizQuestion {
        id: 3,
        question: "Where does the API Gateway sit in relation to backend services?",
        options: [
            "Before backend services (facing the client)",
            "Inside each microservice container",
            "After the database layer",
            "It only exists on the developer's machine",
        ],
        answer: "Before backend services (facing the client)",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("quiz is finished; restart to play again")]
    Finished,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: &'static str,
    pub score: u32,
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub score: u32,
    pub total: usize,
    pub finished: bool,
    pub question: Option<QuizQuestion>,
}

/// One learner's pass through [`QUESTIONS`].
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    current: usize,
    score: u32,
    finished: bool,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&'static QuizQuestion> {
        if self.finished {
            None
        } else {
            QUESTIONS.get(self.current)
        }
    }

    /// Score the selected option against the current question, then advance.
    pub fn answer(&mut self, option: &str) -> Result<AnswerOutcome, QuizError> {
        let question = self.current().ok_or(QuizError::Finished)?;

        let correct = option == question.answer;
        if correct {
            self.score += 1;
        }

        if self.current + 1 < QUESTIONS.len() {
            self.current += 1;
        } else {
            self.finished = true;
        }

        Ok(AnswerOutcome {
            correct,
            correct_answer: question.answer,
            score: self.score,
            finished: self.finished,
        })
    }

    pub fn restart(&mut self) {
        *self = Self::default();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn view(&self) -> QuizView {
        QuizView {
            score: self.score,
            total: QUESTIONS.len(),
            finished: self.finished,
            question: self.current().copied(),
        }
    }
}

//! Request lifecycle walkthrough.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub details: &'static str,
}

pub static STAGES: [Stage; 8] = [
    Stage {
        id: 1,
        title: "Reception",
        description: "Request Arrives",
        details: "The gateway listens on a public port (usually 80/443) and receives the incoming HTTP/gRPC request from the client.",
    },
    Stage {
        id: 2,
        title: "Validation",
        description: "Structure Check",
        details: "The gateway ensures the request is well-formed, contains required headers, and matches the expected JSON/XML schema.",
    },
    Stage {
        id: 3,
        title: "Auth",
        description: "Identity Verification",
        details: "The gateway validates tokens (e.g., JWT, OAuth2) or API Keys. It ensures the user has permission to access the resource.",
    },
    Stage {
        id: 4,
        title: "Rate Limit",
        description: "Traffic Control",
        details: "Checks if the user has exceeded their quota. If so, it returns a 429 status code immediately without hitting backends.",
    },
    Stage {
        id: 5,
        title: "Transform (Req)",
        description: "Preprocessing",
        details: "The gateway might strip internal headers, add correlation IDs for logging, or change the request path.",
    },
    Stage {
        id: 6,
        title: "Routing",
        description: "Upstream Delivery",
        details: "Service discovery finds the private IP/Port of the target service. The gateway proxies the request to the backend.",
    },
    Stage {
        id: 7,
        title: "Transform (Res)",
        description: "Postprocessing",
        details: "The backend response is received. The gateway may mask sensitive internal data or add security headers like CORS.",
    },
    Stage {
        id: 8,
        title: "Response",
        description: "Final Delivery",
        details: "The finalized response is sent back to the original client. The lifecycle of this request is complete.",
    },
];

/// Cursor over [`STAGES`]. Moving past either end wraps around.
#[derive(Debug, Clone, Default)]
pub struct RequestJourney {
    index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct JourneyView {
    pub stage: Stage,
    pub step: usize,
    pub total: usize,
    pub progress: f64,
}

impl RequestJourney {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &'static Stage {
        &STAGES[self.index]
    }

    pub fn next(&mut self) -> &'static Stage {
        self.index = (self.index + 1) % STAGES.len();
        self.current()
    }

    pub fn prev(&mut self) -> &'static Stage {
        self.index = (self.index + STAGES.len() - 1) % STAGES.len();
        self.current()
    }

    /// Fraction of the pipeline covered, current stage included.
    pub fn progress(&self) -> f64 {
        (self.index + 1) as f64 / STAGES.len() as f64
    }

    pub fn view(&self) -> JourneyView {
        JourneyView {
            stage: *self.current(),
            step: self.index + 1,
            total: STAGES.len(),
            progress: self.progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_reception() {
        let journey = RequestJourney::new();
        assert_eq!(journey.current().title, "Reception");
        assert_eq!(journey.progress(), 0.125);
    }

    #[test]
    fn test_next_wraps_to_start() {
        let mut journey = RequestJourney::new();
        for _ in 0..7 {
            journey.next();
        }
        assert_eq!(journey.current().title, "Response");
        assert_eq!(journey.progress(), 1.0);
        assert_eq!(journey.next().title, "Reception");
    }

    #[test]
    fn test_prev_wraps_to_end() {
        let mut journey = RequestJourney::new();
        assert_eq!(journey.prev().id, 8);
        assert_eq!(journey.prev().title, "Transform (Res)");
    }
}

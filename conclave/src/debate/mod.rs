//! Multi-round debate between remote backends.
//!
//! # Flow
//!
//! ```text
//! DebateOrchestrator::run
//!   └─ for each RoundSpec of the mode
//!        RoundRunner::run ── FanOut::call_many ── BackendClient::call × N
//!        └─ DebateSession::add_round
//!   └─ final answer: final_synthesis round │ fallback synthesis │ best response
//!   └─ DebateSession::complete → SessionStore::save
//! ```

pub mod context;
pub mod final_answer;
pub mod orchestrator;
pub mod persistence;
pub mod report;
pub mod rounds;
pub mod state;

pub use final_answer::{AnswerSource, FinalAnswer, FALLBACK_CONFIDENCE, SYNTHESIS_CONFIDENCE};
pub use orchestrator::DebateOrchestrator;
pub use persistence::{IntegrityStatus, SessionStore};
pub use rounds::{RoundOutcome, RoundRunner};
pub use state::{AIResponse, DebateRound, DebateSession};

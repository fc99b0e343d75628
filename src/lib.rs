//! Finance chat client
//!
//! Forwards prompts to a remote text-generation backend and keeps the
//! conversation:
//!
//! - [`topics`] extracts keywords and applies the forbidden-topic filter
//! - [`storage`] persists the keywords seen across sessions
//! - [`ai`] probes the backend endpoints and classifies what comes back
//! - [`session`] ties it together as a two-phase chat controller
//! - [`config`] reads the `FINCHAT_*` environment
pub mod ai;
pub mod config;
pub mod session;
pub mod storage;
pub mod topics;
pub mod types;

pub use session::{ChatSession, Phase, SubmitOutcome};

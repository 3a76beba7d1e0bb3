//! Chatline - terminal client for a conversational chat service
//!
//! A session core that keeps a local transcript in step with a remote chat
//! service: one request in flight at a time, history loaded on start, and a
//! confirmed reset that clears both sides.

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod history;
pub mod runtime;
pub mod session_id;
pub mod state_machine;
pub mod transcript;
pub mod transport;

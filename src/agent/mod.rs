//! Matchmaking Agent
//!
//! The tool registry and the bounded tool-calling loop that turns one
//! user request into one outcome.

pub mod runner;
pub mod system_prompt;
pub mod tools;

pub use runner::AgentRunner;

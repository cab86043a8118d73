//! Rishta -- AI Matchmaker Agent
//!
//! A terminal matchmaking assistant: one free-text request goes to a
//! tool-calling agent (record filter + web search) and the final answer
//! is rendered on screen and optionally delivered over WhatsApp.

pub mod agent;
pub mod config;
pub mod error;
pub mod gemini;
pub mod records;
pub mod search;
pub mod shell;
pub mod types;
pub mod whatsapp;

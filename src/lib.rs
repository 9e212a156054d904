//! ctf-agent: autonomous tool-calling agent loop.
//!
//! Drives an OpenAI-compatible chat model that calls a fixed set of local
//! tools (files, processes, network, archives) until it produces a final
//! answer or runs out of turns.

pub mod agent;
pub mod config;
pub mod inference;
pub mod tools;
pub mod types;

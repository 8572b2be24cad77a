//! Knowledge-store access
//!
//! Typed client for the remote store plus the `Node` record it serves.

mod client;
mod node;

pub use client::{KnowledgeClient, SessionInvalidation};
pub use node::{generate_local_id, Node};

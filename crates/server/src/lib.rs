// coauthor-server library: HTTP service for documents, chat, AI edits, and
// search. The binary in main.rs wires config, state, and the router.

pub mod ai;
pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod search;
pub mod store;
pub mod validation;

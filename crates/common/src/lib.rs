// coauthor-common: shared types and utilities for the Coauthor workspace

pub mod error;
pub mod protocol;
pub mod types;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and simulator calls into use-case level APIs.
//! - Keep CLI/driver layers decoupled from storage details.

pub mod outbreak_service;

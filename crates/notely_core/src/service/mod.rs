//! Client use-case services.
//!
//! # Responsibility
//! - Orchestrate remote collaborator calls into use-case level APIs.
//! - Keep the controller decoupled from transport and storage details.

pub mod note_service;
pub mod notification;
pub mod session_service;

//! Client-side domain model.
//!
//! # Responsibility
//! - Define the records shared by services, collaborators and the controller.
//!
//! # Invariants
//! - Notes are identified by their server-assigned `NoteId`.
//! - Exactly one session is active at a time.

pub mod note;
pub mod notification;
pub mod session;

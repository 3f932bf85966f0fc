//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the gradebook use-cases.
//! - Validate caller input before it reaches the core entities.
//! - Map absence and failures onto stable outcome messages.

pub mod classroom_service;
pub mod error;
pub mod request;
pub mod student_service;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep dialogue and transport layers decoupled from storage details.

pub mod catalog_service;
pub mod favorite_service;
pub mod recommendation_service;
pub mod stats_service;

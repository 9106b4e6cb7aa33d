//! Catalog domain model.
//!
//! # Responsibility
//! - Define the book, genre and user records shared by repositories,
//!   services and the dialogue engine.
//!
//! # Invariants
//! - Books are identified by a store-assigned integer id.
//! - Users are identified by their external (chat network) id.

pub mod book;
pub mod field;
pub mod genre;
pub mod user;

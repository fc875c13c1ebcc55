//! The blog's data model on top of `quill-orm`.
//!
//! Declares the `users`, `blogs` and `comments` tables, the id and
//! timestamp generators their defaults use, and the configuration the
//! `quill` binary starts from. Handler code works through [`BlogModels`]
//! and never touches the pool directly.

pub mod config;
pub mod models;

pub use models::{next_id, now, Blog, BlogModels, Comment, User};

// src/models/mod.rs
//! Domain records shared by the repositories, the HTTP layer and the CLI.

pub mod application;
pub mod company;
pub mod content;
pub mod job;
pub mod profile;
pub mod saved_job;

pub use application::*;
pub use company::*;
pub use content::*;
pub use job::*;
pub use profile::*;
pub use saved_job::*;

/// Generate a new opaque row identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

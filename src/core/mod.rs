// src/core/mod.rs
//! Infrastructure shared by the server and the admin CLI

pub mod config_manager;
pub mod database;
pub mod fs_ops;
pub mod mailer;

pub use config_manager::ConfigManager;
pub use database::Database;
pub use fs_ops::FsOps;
pub use mailer::{ContactMessage, EmailClient};

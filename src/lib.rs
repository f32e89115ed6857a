// src/lib.rs
//! The Germany Jobs: job board API for employers and job seekers in Germany

pub mod admin_cli;
pub mod auth;
pub mod core;
pub mod models;
pub mod recommend;
pub mod reminders;
pub mod repository;
pub mod storage;
pub mod utils;
pub mod validation;
pub mod web;

pub use web::start_web_server;

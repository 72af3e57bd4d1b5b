//! State synchronization and validation engine for group-trip recruitment
//! posts.
//!
//! - `query`: keeps the list query and the address bar in step
//! - `form`: the registration form session, its rules and its draft
//! - `submit`: turns the form into the backend payload
//! - `api`: HTTP collaborators for listing and submitting

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod form;
pub mod logger;
pub mod query;
pub mod submit;

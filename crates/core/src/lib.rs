//! Core business logic for trackdrop.

pub mod services;

pub use services::*;

//! Common utilities and shared types for trackdrop.
//!
//! This crate provides foundational components used across all trackdrop crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Media URLs**: Host-allowlist validation for external audio links
//!
//! # Example
//!
//! ```no_run
//! use trackdrop_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod media;

pub use config::{CommunityConfig, Config, MediaConfig, RewardTable};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use media::{embed_url, is_allowed_media_url, normalize_media_url};

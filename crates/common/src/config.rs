//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Community rule-engine configuration.
    #[serde(default)]
    pub community: CommunityConfig,
    /// External media host configuration.
    #[serde(default)]
    pub media: MediaConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Community verification, archival, and reputation tunables.
///
/// Every product rule the rule engine applies is configured here rather than
/// hardcoded at call sites.
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityConfig {
    /// Net score at which a pending song becomes community-verified (>=).
    #[serde(default = "default_verify_threshold")]
    pub verify_threshold: i64,
    /// Net score at or below which a song is archived as community-rejected.
    #[serde(default = "default_archive_threshold")]
    pub archive_threshold: i64,
    /// Points required for the `verified_contributor` role.
    #[serde(default = "default_contributor_points")]
    pub contributor_points: i64,
    /// Reputation reward table.
    #[serde(default)]
    pub rewards: RewardTable,
    /// Maximum conditional-update attempts before surfacing a conflict.
    #[serde(default = "default_max_write_attempts")]
    pub max_write_attempts: u32,
}

/// Reputation points granted per event kind.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RewardTable {
    /// Credited to the uploader on song creation.
    #[serde(default = "default_reward_upload")]
    pub upload: i64,
    /// Credited to the uploader when their song becomes verified.
    #[serde(default = "default_reward_verified_upload")]
    pub verified_upload: i64,
    /// Credited to the voter on a new upvote.
    #[serde(default = "default_reward_confirm_vote")]
    pub confirm_vote: i64,
    /// Credited to the reporter when a report is filed.
    #[serde(default = "default_reward_report")]
    pub report: i64,
}

/// External media host configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Hostnames accepted for external audio links.
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_verify_threshold() -> i64 {
    3
}

const fn default_archive_threshold() -> i64 {
    -3
}

const fn default_contributor_points() -> i64 {
    1000
}

const fn default_max_write_attempts() -> u32 {
    3
}

const fn default_reward_upload() -> i64 {
    1
}

const fn default_reward_verified_upload() -> i64 {
    200
}

const fn default_reward_confirm_vote() -> i64 {
    10
}

const fn default_reward_report() -> i64 {
    50
}

fn default_allowed_hosts() -> Vec<String> {
    vec!["soundcloud.com".to_string(), "on.soundcloud.com".to_string()]
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            verify_threshold: default_verify_threshold(),
            archive_threshold: default_archive_threshold(),
            contributor_points: default_contributor_points(),
            rewards: RewardTable::default(),
            max_write_attempts: default_max_write_attempts(),
        }
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            upload: default_reward_upload(),
            verified_upload: default_reward_verified_upload(),
            confirm_vote: default_reward_confirm_vote(),
            report: default_reward_report(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: default_allowed_hosts(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `TRACKDROP_ENV`)
    /// 3. Environment variables with `TRACKDROP_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("TRACKDROP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TRACKDROP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TRACKDROP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_defaults() {
        let community = CommunityConfig::default();
        assert_eq!(community.verify_threshold, 3);
        assert_eq!(community.archive_threshold, -3);
        assert_eq!(community.contributor_points, 1000);
        assert_eq!(community.max_write_attempts, 3);
    }

    #[test]
    fn test_reward_table_defaults() {
        let rewards = RewardTable::default();
        assert_eq!(rewards.upload, 1);
        assert_eq!(rewards.verified_upload, 200);
        assert_eq!(rewards.confirm_vote, 10);
        assert_eq!(rewards.report, 50);
    }

    #[test]
    fn test_media_defaults() {
        let media = MediaConfig::default();
        assert!(media.allowed_hosts.contains(&"soundcloud.com".to_string()));
        assert!(media.allowed_hosts.contains(&"on.soundcloud.com".to_string()));
    }
}

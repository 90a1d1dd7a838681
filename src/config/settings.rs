//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-recognition adapter.
///
/// Continuous capture and interim results are inherent to the adapter
/// contract and are not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// BCP-47 language tag passed to the recognition engine.
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TimingConfig
// ---------------------------------------------------------------------------

/// The fixed durations that pace the interaction loop.
///
/// | Field               | Purpose                                            |
/// |---------------------|----------------------------------------------------|
/// | `silence_ms`        | Quiet period that ends an utterance                |
/// | `restart_delay_ms`  | Delay before re-warming the engine after it ends   |
/// | `relisten_delay_ms` | Delay before listening resumes after a fetch       |
/// | `confirm_hold_ms`   | How long the add-confirmation acknowledgment shows |
/// | `resume_delay_ms`   | Delay before listening resumes after an add        |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Milliseconds of silence after the last result before the utterance is
    /// considered complete.
    pub silence_ms: u64,
    /// Milliseconds between the engine ending capture and the automatic
    /// restart that keeps the microphone warm.
    pub restart_delay_ms: u64,
    /// Milliseconds between a successful fetch and listening re-arming so the
    /// user can immediately speak a confirmation.
    pub relisten_delay_ms: u64,
    /// Milliseconds the add-to-cart acknowledgment stays visible before the
    /// cart is committed.
    pub confirm_hold_ms: u64,
    /// Milliseconds between the cart commit and listening re-arming.
    pub resume_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            silence_ms: 2_000,
            restart_delay_ms: 100,
            relisten_delay_ms: 500,
            confirm_hold_ms: 500,
            resume_delay_ms: 300,
        }
    }
}

impl TimingConfig {
    pub fn silence(&self) -> Duration {
        Duration::from_millis(self.silence_ms)
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn relisten_delay(&self) -> Duration {
        Duration::from_millis(self.relisten_delay_ms)
    }

    pub fn confirm_hold(&self) -> Duration {
        Duration::from_millis(self.confirm_hold_ms)
    }

    pub fn resume_delay(&self) -> Duration {
        Duration::from_millis(self.resume_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Settings for the product-recommendation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the recommendation service; requests go to `{base_url}/chat`.
    pub base_url: String,
    /// Session identifier sent with every request.
    pub session_id: String,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hungryai.asmirabdimazhit.com".into(),
            session_id: "eats1".into(),
            timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_shop::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech-recognition settings.
    pub speech: SpeechConfig,
    /// Interaction-loop pacing.
    pub timing: TimingConfig,
    /// Recommendation-endpoint settings.
    pub api: ApiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

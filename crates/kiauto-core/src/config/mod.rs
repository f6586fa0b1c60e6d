//! # Configuration System
//!
//! Hierarchical TOML configuration for the automation layer.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.kiauto/config.toml` (global user preferences)
//! 3. **Project config** - `./.kiauto/config.toml` (project-specific overrides)
//! 4. **CLI arguments** - Command-line flags (highest priority)
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use kiauto_core::config::AutomationConfig;
//!
//! fn example() -> Result<(), kiauto_core::errors::ConfigError> {
//!     let config = AutomationConfig::load_hierarchy()?;
//!     let polling = config.polling.window();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{AutomationConfig, DisplayConfig, PollingConfig, RecordingConfig, ToolsConfig};
pub use validation::{VALID_COLOR_DEPTHS, validate_config};

impl AutomationConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}

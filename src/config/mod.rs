pub mod settings;

pub use settings::{
    AuditConfig, Config, ConfigError, EnvLookup, FixedRoot, GitConfig, SettingsLookup, REPO_ROOT_KEY,
};

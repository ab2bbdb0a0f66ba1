mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{
    HubSettings, LoggingSettings, PartialHubSettings, PartialLoggingSettings,
    PartialServerSettings, PartialSettings, ServerSettings, Settings,
};

/// Prefix for environment overrides, e.g. `LIVECOMMENTS__HUB__SEND_TIMEOUT_MS=500`.
pub const ENV_PREFIX: &str = "LIVECOMMENTS";

/// Loads the configuration from `config/default.*` and environment variables,
/// merged over `Settings::default()`.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge_onto(Settings::default()))
}

mod settings;

use config::{Config, Environment, File};

use settings::PartialSettings;

use crate::utils::error::Result;

pub use settings::{BrokerSettings, ClientSettings, LoggingSettings, Settings, default_name};

/// Loads the configuration from `config/default.*` and `MQ_`-prefixed
/// environment variables, then merges it over `Settings::default()`.
///
/// Nested keys use a double underscore, e.g. `MQ_CLIENT__POLL_INTERVAL_MS`.
pub fn load_config() -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("MQ")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge(Settings::default()))
}

#[cfg(test)]
mod tests;

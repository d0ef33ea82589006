mod parsing;
mod settings;
mod types;

pub use types::{
    ApiSettings, BaseUrl, ConfigError, Environment, HttpSettings, PreferencesSettings,
    RuntimeSettings, Settings, TelemetrySettings, UploadSettings,
};

use super::parsing::{
    env_optional, env_or_default, is_supported_log_level, parse_bool, parse_environment, parse_u64,
};
use super::types::{
    ApiSettings, BaseUrl, ConfigError, HttpSettings, PreferencesSettings, RuntimeSettings,
    Settings, TelemetrySettings, UploadSettings,
};

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let environment = parse_environment(
            env_optional("ACTIVITY_EDITOR_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("ACTIVITY_EDITOR_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let base_url = env_or_default("ACTIVITY_EDITOR_API_BASE_URL", DEFAULT_API_BASE_URL);
        let session_cookie = env_optional("ACTIVITY_EDITOR_SESSION_COOKIE");

        let connect_timeout_seconds = parse_u64(
            "ACTIVITY_EDITOR_CONNECT_TIMEOUT_SECONDS",
            env_or_default("ACTIVITY_EDITOR_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;
        let request_timeout_seconds = parse_u64(
            "ACTIVITY_EDITOR_REQUEST_TIMEOUT_SECONDS",
            env_or_default("ACTIVITY_EDITOR_REQUEST_TIMEOUT_SECONDS", "60"),
        )?;

        let max_upload_size_mb = parse_u64(
            "ACTIVITY_EDITOR_MAX_UPLOAD_SIZE_MB",
            env_or_default("ACTIVITY_EDITOR_MAX_UPLOAD_SIZE_MB", "25"),
        )?;

        let preferences_path = env_or_default(
            "ACTIVITY_EDITOR_PREFERENCES_PATH",
            ".activity-editor/preferences.json",
        );

        let log_level = env_or_default("ACTIVITY_EDITOR_LOG_LEVEL", "info");
        let json = env_optional("ACTIVITY_EDITOR_LOG_JSON")
            .map(|value| parse_bool(&value))
            .unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { base_url: BaseUrl::parse(base_url)?, session_cookie },
            http: HttpSettings { connect_timeout_seconds, request_timeout_seconds },
            upload: UploadSettings { max_upload_size_mb },
            preferences: PreferencesSettings { path: preferences_path },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Points the settings at another backend, keeping everything else.
    pub fn with_api_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.api.base_url = BaseUrl::parse(base_url.to_string())?;
        self.validate()?;
        Ok(self)
    }

    pub fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub fn http(&self) -> &HttpSettings {
        &self.http
    }

    pub fn upload(&self) -> &UploadSettings {
        &self.upload
    }

    pub fn preferences(&self) -> &PreferencesSettings {
        &self.preferences
    }

    pub fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.upload.max_upload_size_mb.saturating_mul(1024 * 1024)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ACTIVITY_EDITOR_REQUEST_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.upload.max_upload_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ACTIVITY_EDITOR_MAX_UPLOAD_SIZE_MB",
                value: "0".to_string(),
            });
        }

        let level = self.telemetry.log_level.to_ascii_lowercase();
        if !level.contains('=') && !is_supported_log_level(&level) {
            return Err(ConfigError::InvalidValue {
                field: "ACTIVITY_EDITOR_LOG_LEVEL",
                value: self.telemetry.log_level.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if !self.api.base_url.is_https() {
            return Err(ConfigError::InvalidBaseUrl(self.api.base_url.as_str().to_string()));
        }
        if self.api.session_cookie.is_none() {
            return Err(ConfigError::MissingSecret("ACTIVITY_EDITOR_SESSION_COOKIE"));
        }

        Ok(())
    }
}

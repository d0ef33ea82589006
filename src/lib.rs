pub mod api;
pub mod core;
pub mod editor;
pub mod errors;
pub mod schemas;
pub mod services;

#[cfg(test)]
mod test_support;

use crate::api::client::ApiClient;
use crate::core::{config::Settings, telemetry};
use crate::editor::ActivityEditor;

/// Loads settings from the environment (and `.env`), installs tracing and
/// returns an editor talking to the configured backend.
pub fn connect() -> anyhow::Result<ActivityEditor<ApiClient>> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    if let Err(err) = telemetry::init_tracing(&settings) {
        eprintln!("tracing already initialised: {err}");
    }

    let client = ApiClient::from_settings(&settings)?;

    tracing::info!(
        base_url = %client.base_url().as_str(),
        environment = %settings.runtime().environment.as_str(),
        "Activity editor connected"
    );

    Ok(ActivityEditor::new(client))
}

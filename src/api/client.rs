use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::api::backend::{ActivityBackend, MediaFile};
use crate::api::errors::{extract_error_message, ApiError};
use crate::core::config::{BaseUrl, Settings};
use crate::schemas::activity::Activity;
use crate::schemas::{
    ApiEnvelope, ReorderRequest, SectionActivities, SessionSections, UploadedMedia,
};
use crate::services::media::guess_mime;
use crate::services::reorder::ReorderTarget;

/// JSON-over-HTTP client for the platform backend. Cookies set by the server
/// are kept and sent back on every request.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: BaseUrl,
    max_upload_bytes: u64,
}

impl ApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = settings.api().session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .context("Session cookie is not a valid header")?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(settings.http().connect_timeout_seconds))
            .timeout(Duration::from_secs(settings.http().request_timeout_seconds))
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.api().base_url.clone(),
            max_upload_bytes: settings.max_upload_bytes(),
        })
    }

    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let payload = self.execute(endpoint, request).await?;
        let envelope = ApiEnvelope::<T>::deserialize(&payload)
            .map_err(|err| ApiError::decode(endpoint, err))?;
        check_success(endpoint, &envelope, &payload)?;
        envelope.data.ok_or_else(|| ApiError::decode(endpoint, "response has no data"))
    }

    /// Like `send`, for endpoints whose `data` is irrelevant or absent.
    async fn send_unit(&self, endpoint: &str, request: RequestBuilder) -> Result<(), ApiError> {
        let payload = self.execute(endpoint, request).await?;
        if payload.is_null() {
            return Ok(());
        }
        let envelope = ApiEnvelope::<Value>::deserialize(&payload)
            .map_err(|err| ApiError::decode(endpoint, err))?;
        check_success(endpoint, &envelope, &payload)
    }

    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<Value, ApiError> {
        tracing::debug!(endpoint, "Calling backend");

        let response = request.send().await.map_err(|err| {
            tracing::warn!(endpoint, error = %err, "Backend request failed");
            ApiError::network(endpoint, err)
        })?;

        let status = response.status();
        let raw_body = response.text().await.map_err(|err| ApiError::network(endpoint, err))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<Value>(&raw_body) {
                Ok(parsed) => extract_error_message(&parsed),
                Err(_) if raw_body.trim().is_empty() => status.to_string(),
                Err(_) => raw_body.trim().to_string(),
            };
            tracing::warn!(
                endpoint,
                status = %status,
                message = %message,
                "Backend returned error"
            );
            return Err(ApiError::Status { endpoint: endpoint.to_string(), status, message });
        }

        if raw_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str::<Value>(&raw_body).map_err(|err| {
            ApiError::decode(endpoint, format!("non-JSON body (status {status}): {err}"))
        })
    }
}

fn check_success<T>(
    endpoint: &str,
    envelope: &ApiEnvelope<T>,
    payload: &Value,
) -> Result<(), ApiError> {
    if envelope.success {
        return Ok(());
    }

    let message = envelope.message.clone().unwrap_or_else(|| extract_error_message(payload));
    tracing::warn!(endpoint, message = %message, "Backend reported failure");
    Err(ApiError::Application { message })
}

#[async_trait]
impl ActivityBackend for ApiClient {
    async fn list_section_activities(
        &self,
        section_id: &str,
    ) -> Result<SectionActivities, ApiError> {
        let endpoint = self.base_url.join("template-or-batch/activities");
        let request = self.client.get(&endpoint).query(&[("sectionId", section_id)]);
        self.send(&endpoint, request).await
    }

    async fn list_session_sections(&self, session_id: &str) -> Result<SessionSections, ApiError> {
        let endpoint = self.base_url.join("template-or-batch/sections");
        let request = self.client.get(&endpoint).query(&[("sessionId", session_id)]);
        self.send(&endpoint, request).await
    }

    async fn get_activity(&self, activity_id: &str) -> Result<Activity, ApiError> {
        let endpoint = self.base_url.join(&format!("activities/{activity_id}"));
        let request = self.client.get(&endpoint);
        self.send(&endpoint, request).await
    }

    async fn create_activity(&self, activity: &Activity) -> Result<Activity, ApiError> {
        let endpoint = self.base_url.join("activities");
        let request = self.client.post(&endpoint).json(activity);
        let created: Activity = self.send(&endpoint, request).await?;
        tracing::info!(activity_id = ?created.id, "Activity created");
        Ok(created)
    }

    async fn update_activity(
        &self,
        activity_id: &str,
        activity: &Activity,
    ) -> Result<Activity, ApiError> {
        let endpoint = self.base_url.join(&format!("activities/{activity_id}"));
        let request = self.client.put(&endpoint).json(activity);
        let updated = self.send(&endpoint, request).await?;
        tracing::info!(activity_id, "Activity updated");
        Ok(updated)
    }

    async fn delete_activity(&self, activity_id: &str) -> Result<(), ApiError> {
        let endpoint = self.base_url.join(&format!("activities/{activity_id}"));
        let request = self.client.delete(&endpoint);
        self.send_unit(&endpoint, request).await?;
        tracing::info!(activity_id, "Activity deleted");
        Ok(())
    }

    async fn reorder(&self, target: ReorderTarget, ordered_ids: &[String]) -> Result<(), ApiError> {
        let endpoint = self.base_url.join(target.endpoint());
        let request = self.client.post(&endpoint).json(&ReorderRequest { ordered_ids });
        self.send_unit(&endpoint, request).await
    }

    async fn upload_media(
        &self,
        file: MediaFile,
        media_type: &str,
    ) -> Result<UploadedMedia, ApiError> {
        let endpoint = self.base_url.join("upload-media");

        let size = file.size();
        if size > self.max_upload_bytes {
            return Err(ApiError::FileTooLarge { size, limit: self.max_upload_bytes });
        }

        let mime = guess_mime(&file.file_name);
        let file_name = file.file_name;
        let part = Part::bytes(file.bytes)
            .file_name(file_name.clone())
            .mime_str(mime)
            .map_err(|err| ApiError::network(&endpoint, err))?;
        let form = Form::new().part("file", part).text("mediaType", media_type.to_string());

        let request = self.client.post(&endpoint).multipart(form);
        let uploaded: UploadedMedia = self.send(&endpoint, request).await?;
        tracing::info!(file_name = %file_name, size, media_type, "Media uploaded");
        Ok(uploaded)
    }
}

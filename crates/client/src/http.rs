use std::sync::Arc;
use std::time::Duration;

use pmflow_core::config::ApiConfig;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{extract_detail, ApiError};
use crate::notify::{Notice, Notifier};

#[derive(Clone, Debug)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub token: Option<SecretString>,
    pub timeout_secs: u64,
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// Thin reqwest wrapper shared by every service.
///
/// Failed requests are reported to the notifier before the error is returned,
/// so callers only decide what to do next.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ApiClientConfig>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;

        Ok(Self { client, config: Arc::new(config), notifier })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn auth_request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.auth_request(self.client.get(self.url(path)));
        self.send(request).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.auth_request(self.client.get(self.url(path))).query(query);
        self.send(request).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.auth_request(self.client.patch(self.url(path))).json(body);
        self.send(request).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.auth_request(self.client.post(self.url(path))).json(body);
        self.send(request).await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let request = self.auth_request(self.client.post(self.url(path))).multipart(form);
        self.send(request).await
    }

    /// Reachability probe; any HTTP answer counts, only transport failures are errors.
    pub async fn ping(&self) -> Result<u16, ApiError> {
        let request = self.auth_request(self.client.get(self.url("/")));
        let response = request.send().await?;
        Ok(response.status().as_u16())
    }

    pub fn notify_success(&self, message: impl Into<String>) {
        self.notifier.notify(Notice::success(message));
    }

    /// Surfaces `error` to the user and hands it back.
    pub fn report(&self, error: ApiError) -> ApiError {
        warn!(
            event_name = "client.request.failed",
            error_class = error.error_class(),
            status = error.status(),
            error = %error,
            "api request failed"
        );
        self.notifier.notify(Notice::error(error.detail()));
        error
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let outcome = match request.send().await {
            Ok(response) => handle_response(response).await,
            Err(error) => Err(ApiError::Http(error)),
        };
        outcome.map_err(|error| self.report(error))
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    debug!(event_name = "client.response", status = status.as_u16(), url = %response.url());

    if status.is_success() {
        let body = response.bytes().await?;
        return serde_json::from_slice::<T>(&body).map_err(|error| ApiError::Decode(error.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let detail = extract_detail(&body).unwrap_or_else(|| {
        status.canonical_reason().map(str::to_string).unwrap_or_else(|| status.to_string())
    });

    match status.as_u16() {
        401 | 403 => Err(ApiError::Unauthorized(detail)),
        404 => Err(ApiError::NotFound(detail)),
        code => Err(ApiError::Status { status: code, detail }),
    }
}

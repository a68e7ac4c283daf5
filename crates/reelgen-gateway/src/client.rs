//! HTTP client for the generation backend.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use reelgen_models::{
    AssemblyRequest, CleanupRequest, Narrative, Product, SceneArtifact, TaskHandle, TaskStatus,
    TaskStatusResponse,
};

use crate::error::{GatewayError, GatewayResult};

/// Base URL of the local development backend.
const LOCAL_BASE_URL: &str = "http://localhost:4000";

/// Base URL of the deployed backend.
const DEPLOYED_BASE_URL: &str = "https://reelgen-api.azurewebsites.net";

/// Client for the remote generation services.
///
/// Holds no state beyond the resolved base URL and the underlying
/// connection pool. Every method is a single request/response; failures
/// surface as [`GatewayError`] and are never retried here.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    base_url: String,
    http: Client,
}

impl GenerationClient {
    /// Create a client against an explicit base URL.
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| GatewayError::config_error(format!("bad base URL {base_url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(GatewayError::config_error(format!(
                "unsupported scheme in base URL: {base_url}"
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        })
    }

    /// Create a client from the environment.
    ///
    /// `REELGEN_API_URL` overrides everything; otherwise the deployed base
    /// URL is used when `REELGEN_ENV=production`, and the local development
    /// backend in any other case.
    pub fn from_env() -> GatewayResult<Self> {
        let base_url = std::env::var("REELGEN_API_URL").unwrap_or_else(|_| {
            let production = std::env::var("REELGEN_ENV")
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false);
            if production {
                DEPLOYED_BASE_URL.to_string()
            } else {
                LOCAL_BASE_URL.to_string()
            }
        });

        Self::new(&base_url)
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the generated narrative for a topic.
    pub async fn fetch_narrative(
        &self,
        product: Product,
        topic: &str,
        language: &str,
    ) -> GatewayResult<Narrative> {
        let operation = "fetch_narrative";
        debug!(product = %product, topic, "Fetching narrative");

        let narrative: Narrative = self
            .get_json(
                operation,
                product.narrative_path(),
                &[("topic", topic), ("language", language)],
            )
            .await?;

        debug!(
            product = %product,
            scenes = narrative.scene_count(),
            "Narrative received"
        );
        Ok(narrative)
    }

    /// Resolve a scene prompt to a media reference.
    ///
    /// The response is plain text. An empty body or a placeholder value is
    /// returned as-is; deciding whether that omits the scene is the
    /// caller's policy, not a gateway error.
    pub async fn resolve_scene_media(&self, prompt: &str) -> GatewayResult<String> {
        self.get_text("resolve_scene_media", "/generic_apis/get_image", &[("prompt", prompt)])
            .await
    }

    /// Resolve narration text to an audio reference.
    pub async fn resolve_scene_audio(&self, text: &str, language: &str) -> GatewayResult<String> {
        self.get_text(
            "resolve_scene_audio",
            "/generic_apis/get_audio",
            &[("text", text), ("language", language)],
        )
        .await
    }

    /// Submit the assembled scene data for video generation.
    pub async fn submit_assembly(
        &self,
        product: Product,
        artifacts: &[SceneArtifact],
    ) -> GatewayResult<TaskHandle> {
        let operation = "submit_assembly";
        let body = AssemblyRequest::from_artifacts(artifacts);
        debug!(product = %product, scenes = body.scene_data.len(), "Submitting assembly job");

        let handle: TaskHandle = self
            .post_json(operation, product.assembly_path(), &body)
            .await?;

        debug!(task_id = %handle.task_id, "Assembly job accepted");
        Ok(handle)
    }

    /// Query the status of an assembly task.
    pub async fn query_status(&self, task_id: &str) -> GatewayResult<TaskStatus> {
        let operation = "query_status";
        let path = format!("/generic_apis/task_status/{task_id}");

        let response: TaskStatusResponse = self.get_json(operation, &path, &[]).await?;
        response
            .into_status()
            .map_err(|detail| GatewayError::invalid_payload(operation, detail))
    }

    /// Best-effort deletion of generated media references.
    ///
    /// Never fails the caller: transport errors and non-2xx responses are
    /// logged and swallowed.
    pub async fn cleanup(&self, media_refs: &[String]) {
        if media_refs.is_empty() {
            return;
        }

        let body = CleanupRequest {
            audio_urls: media_refs.to_vec(),
        };
        let url = format!("{}/generic_apis/delete_audio_files", self.base_url);

        match self.http.post(url).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(count = media_refs.len(), "Cleaned up media references");
            }
            Ok(response) => {
                warn!(status = %response.status(), "Media cleanup was rejected");
            }
            Err(e) => {
                warn!(error = %e, "Media cleanup request failed");
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> GatewayResult<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::transport(operation, e))?;

        let response = Self::check_status(operation, response)?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_payload(operation, e.to_string()))
    }

    async fn get_text(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> GatewayResult<String> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .map_err(|e| GatewayError::transport(operation, e))?;

        let response = Self::check_status(operation, response)?;
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::invalid_payload(operation, e.to_string()))?;
        Ok(text.trim().to_string())
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::transport(operation, e))?;

        let response = Self::check_status(operation, response)?;
        response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_payload(operation, e.to_string()))
    }

    fn check_status(operation: &'static str, response: Response) -> GatewayResult<Response> {
        if !response.status().is_success() {
            return Err(GatewayError::status(operation, response.status()));
        }
        Ok(response)
    }
}

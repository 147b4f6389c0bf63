//! Render service client.
//!
//! The render service turns a near-zero-length clip of a source video into a
//! single still image. Jobs are submitted asynchronously and polled by id
//! (see [`poll`]).

pub mod poll;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use clipscope_models::RenderStatus;

use crate::error::{MediaError, MediaResult};

/// Length of the rendered clip in seconds.
pub const STILL_CLIP_LENGTH_SECS: f64 = 0.1;

/// One observed job state.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObservation {
    pub status: RenderStatus,
    pub url: Option<String>,
}

impl RenderObservation {
    pub fn new(status: RenderStatus, url: Option<String>) -> Self {
        Self { status, url }
    }
}

/// Submit and status operations of a render service.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Submit a still-frame job at `trim_secs` into `video_url`; returns the job id.
    async fn submit(&self, video_url: &str, trim_secs: f64) -> MediaResult<String>;

    /// Current state of a job.
    async fn status(&self, job_id: &str) -> MediaResult<RenderObservation>;
}

/// Render client configuration.
#[derive(Debug, Clone)]
pub struct RenderClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl RenderClientConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the render service.
pub struct RenderClient {
    http: Client,
    config: RenderClientConfig,
}

#[derive(Debug, Serialize)]
struct RenderRequest {
    timeline: Timeline,
    output: Output,
}

#[derive(Debug, Serialize)]
struct Timeline {
    tracks: Vec<Track>,
}

#[derive(Debug, Serialize)]
struct Track {
    clips: Vec<Clip>,
}

#[derive(Debug, Serialize)]
struct Clip {
    asset: Asset,
    start: f64,
    length: f64,
}

#[derive(Debug, Serialize)]
struct Asset {
    #[serde(rename = "type")]
    kind: &'static str,
    src: String,
    trim: f64,
}

#[derive(Debug, Serialize)]
struct Output {
    format: &'static str,
    resolution: &'static str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    url: Option<String>,
}

impl RenderRequest {
    fn still_frame(video_url: &str, trim_secs: f64) -> Self {
        Self {
            timeline: Timeline {
                tracks: vec![Track {
                    clips: vec![Clip {
                        asset: Asset {
                            kind: "video",
                            src: video_url.to_string(),
                            trim: trim_secs.max(0.0),
                        },
                        start: 0.0,
                        length: STILL_CLIP_LENGTH_SECS,
                    }],
                }],
            },
            output: Output {
                format: "jpg",
                resolution: "sd",
            },
        }
    }
}

impl RenderClient {
    pub fn new(config: RenderClientConfig) -> MediaResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(MediaError::Config("render API key is empty".to_string()));
        }
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), suffix)
    }
}

#[async_trait]
impl RenderService for RenderClient {
    async fn submit(&self, video_url: &str, trim_secs: f64) -> MediaResult<String> {
        let response = self
            .http
            .post(self.url("/render"))
            .header("x-api-key", &self.config.api_key)
            .json(&RenderRequest::still_frame(video_url, trim_secs))
            .send()
            .await
            .map_err(|e| MediaError::RenderSubmit(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::RenderSubmit(format!("{}: {}", status, body)));
        }

        let body: Envelope<SubmitResponse> = response
            .json()
            .await
            .map_err(|e| MediaError::RenderSubmit(format!("invalid response: {}", e)))?;

        debug!(job_id = %body.response.id, trim_secs, "Render job submitted");
        Ok(body.response.id)
    }

    async fn status(&self, job_id: &str) -> MediaResult<RenderObservation> {
        let response = self
            .http
            .get(self.url(&format!("/render/{}", job_id)))
            .header("x-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| MediaError::RenderStatus(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaError::RenderStatus(format!(
                "job {} returned {}",
                job_id,
                response.status()
            )));
        }

        let body: Envelope<StatusResponse> = response
            .json()
            .await
            .map_err(|e| MediaError::RenderStatus(format!("invalid response: {}", e)))?;

        Ok(RenderObservation::new(
            RenderStatus::from_provider(&body.response.status),
            body.response.url.filter(|u| !u.is_empty()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> RenderClient {
        RenderClient::new(RenderClientConfig::new("render-key", server.uri())).unwrap()
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = RenderClient::new(RenderClientConfig::new(" ", "http://x")).err().unwrap();
        assert!(matches!(err, MediaError::Config(_)));
    }

    #[tokio::test]
    async fn test_submit_still_frame() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/render"))
            .and(header("x-api-key", "render-key"))
            .and(body_partial_json(serde_json::json!({
                "timeline": {"tracks": [{"clips": [{"asset": {"type": "video", "src": "https://v.example/a.mp4", "trim": 5.0}, "start": 0.0, "length": 0.1}]}]},
                "output": {"format": "jpg"}
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "success": true,
                "response": {"id": "job-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server)
            .submit("https://v.example/a.mp4", 5.0)
            .await
            .unwrap();
        assert_eq!(id, "job-1");
    }

    #[tokio::test]
    async fn test_status_done_with_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/render/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {"status": "done", "url": "https://cdn.example/job-1.jpg"}
            })))
            .mount(&server)
            .await;

        let observation = client_for(&server).status("job-1").await.unwrap();
        assert_eq!(observation.status, RenderStatus::Done);
        assert_eq!(observation.url.as_deref(), Some("https://cdn.example/job-1.jpg"));
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client_for(&server).submit("https://v.example/a.mp4", 0.0).await.unwrap_err();
        assert!(matches!(err, MediaError::RenderSubmit(_)));
    }
}

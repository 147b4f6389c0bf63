//! End-to-end pipeline tests against mocked providers.
//!
//! The live test at the bottom needs real credentials and is ignored by default.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageOutputFormat, Rgb, RgbImage};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clipscope_ml_client::{GenerativeModel, MlResult};
use clipscope_models::{AnalysisMode, FrameSource, PreparedImage, VideoReference};
use clipscope_pipeline::{AnalysisLogger, Orchestrator, PipelineConfig};

const ANSWER: &str = "Replication score: 8/10\nDifficulty: 3/10\nTotal: $120\nBeginner friendly: YES";

struct RecordingModel {
    calls: AtomicUsize,
    images_seen: AtomicUsize,
}

#[async_trait]
impl GenerativeModel for RecordingModel {
    async fn generate(&self, _prompt: &str, images: &[PreparedImage]) -> MlResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images_seen.fetch_add(images.len(), Ordering::SeqCst);
        Ok(ANSWER.to_string())
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(96, 96, Rgb([30, 120, 200]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageOutputFormat::Png).unwrap();
    cursor.into_inner()
}

fn record(server: &MockServer, id: u32) -> serde_json::Value {
    json!({
        "webVideoUrl": format!("https://www.tiktok.com/@maker/video/{id}"),
        "text": "Turning a cereal box into a phone stand",
        "playCount": 120000,
        "diggCount": 9000,
        "authorMeta": {"name": "maker"},
        "videoMeta": {
            "downloadAddr": format!("{}/media/{id}.mp4", server.uri()),
            "coverUrl": format!("{}/cover.png", server.uri()),
            "duration": 12.0
        }
    })
}

async fn mount_providers(server: &MockServer, records: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/run-sync-get-dataset-items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "response": {"id": "still-1"}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/render/still-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {"status": "done", "url": format!("{}/frames/still-1.png", server.uri())}
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/(frames/.*|cover)\.png$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes()))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> PipelineConfig {
    PipelineConfig {
        scraper_api_key: Some("scrape-key".to_string()),
        scraper_base_url: server.uri(),
        embed_base_url: format!("{}/oembed", server.uri()),
        render_api_key: Some("render-key".to_string()),
        render_base_url: server.uri(),
        render_poll_interval: Duration::from_millis(5),
        render_poll_max_attempts: 3,
        ..PipelineConfig::default()
    }
}

fn recording_model() -> Arc<RecordingModel> {
    Arc::new(RecordingModel {
        calls: AtomicUsize::new(0),
        images_seen: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn test_single_video_with_rendered_frames() {
    let server = MockServer::start().await;
    mount_providers(&server, json!([record(&server, 1)])).await;

    let model = recording_model();
    let orchestrator = Orchestrator::from_config(&config_for(&server), model.clone()).unwrap();
    assert_eq!(orchestrator.metadata_strategies(), vec!["scraper", "embed"]);
    assert_eq!(orchestrator.frame_strategies(), vec!["render", "thumbnail_proxy"]);

    let reference = VideoReference::classify("https://www.tiktok.com/@maker/video/1", None).unwrap();
    let logger = AnalysisLogger::new("e2e-single", "analyze_single");
    let envelope = orchestrator.analyze(&reference, &logger).await.unwrap();

    assert_eq!(envelope.mode, AnalysisMode::Single);
    assert_eq!(envelope.succeeded, 1);
    let result = envelope.results[0].result.as_ref().unwrap();
    assert_eq!(result.frame_source, FrameSource::Rendered);
    assert!(result.vision_used);
    assert_eq!(result.frames_analyzed, 3);
    assert_eq!(result.structured.replication_score, 8);
    assert_eq!(result.structured.budget_usd, 120);
    assert_eq!(model.images_seen.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_keyword_batch_analyzes_each_candidate() {
    let server = MockServer::start().await;
    mount_providers(&server, json!([record(&server, 1), record(&server, 2)])).await;

    let model = recording_model();
    let orchestrator = Orchestrator::from_config(&config_for(&server), model.clone()).unwrap();
    assert!(orchestrator.discovery_enabled());

    let reference = VideoReference::classify("phone stand diy", Some(2)).unwrap();
    let logger = AnalysisLogger::new("e2e-batch", "analyze_batch");
    let envelope = orchestrator.analyze(&reference, &logger).await.unwrap();

    assert_eq!(envelope.mode, AnalysisMode::Batch);
    assert_eq!(envelope.requested, 2);
    assert_eq!(envelope.succeeded, 2);
    assert_eq!(model.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_render_failure_falls_back_to_cover() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/render"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_providers(&server, json!([record(&server, 1)])).await;

    let mut config = config_for(&server);
    // Proxy frames point at an unreachable host so only the cover remains
    config.thumbnail_proxy_url = "http://127.0.0.1:9/get/".to_string();

    let orchestrator = Orchestrator::from_config(&config, recording_model()).unwrap();
    let logger = AnalysisLogger::new("e2e-degraded", "analyze_single");
    let result = orchestrator
        .analyze_single("https://www.tiktok.com/@maker/video/1", &logger)
        .await
        .unwrap();

    assert_eq!(result.frame_source, FrameSource::Cover);
    assert!(!result.vision_used);
    assert_eq!(result.frames_analyzed, 1);
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY and network access"]
async fn test_live_embed_analysis() {
    dotenvy::dotenv().ok();

    let model = clipscope_ml_client::GeminiClient::from_env().expect("GEMINI_API_KEY must be set");
    let config = PipelineConfig::from_env();
    let orchestrator = Orchestrator::from_config(&config, Arc::new(model)).expect("orchestrator");

    let url = std::env::var("LIVE_TEST_VIDEO_URL").expect("LIVE_TEST_VIDEO_URL must be set");
    let logger = AnalysisLogger::generate("live_test");
    let result = orchestrator.analyze_single(&url, &logger).await.expect("analysis");

    println!("frame source: {}", result.frame_source.as_str());
    println!("structured: {:?}", result.structured);
    assert!(!result.raw_text.is_empty());
}

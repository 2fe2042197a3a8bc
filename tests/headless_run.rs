//! Headless runner against an in-process detection server

use pothole_scout::{run_headless, RunOptions};
use scout_app::config::Settings;
use scout_app::SessionState;
use scout_core::FailureKind;
use scout_platform::test_utils::{png_bytes, MockDetectionServer, MockResponse};

fn settings_for(server: &MockDetectionServer) -> Settings {
    let mut settings = Settings::default();
    settings.detection.base_url = server.base_url();
    settings.location.latitude = Some(37.421999);
    settings.location.longitude = Some(-122.084);
    settings
}

#[tokio::test]
async fn test_headless_cycle_writes_output() {
    let body = png_bytes(b"annotated");
    let server = MockDetectionServer::start(MockResponse::ok(body.clone())).await;
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("road.jpg");
    std::fs::write(&image, b"\xff\xd8\xff\xe0road").unwrap();
    let output = dir.path().join("out.png");

    let options = RunOptions {
        image: Some(image),
        output: Some(output.clone()),
        open_map: false,
    };
    let state = run_headless(&settings_for(&server), &options).await.unwrap();

    assert!(matches!(state, SessionState::Ready { .. }));
    assert_eq!(std::fs::read(&output).unwrap(), body);

    let requests = server.requests();
    let file = requests[0].file("image").unwrap();
    assert_eq!(file.file_name.as_deref(), Some("road.jpg"));
    assert_eq!(file.content_type.as_deref(), Some("image/jpeg"));
}

#[tokio::test]
async fn test_headless_without_position_reports_service_disabled() {
    let server = MockDetectionServer::start(MockResponse::ok(png_bytes(b"x"))).await;
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("road.jpg");
    std::fs::write(&image, b"\xff\xd8\xff\xe0road").unwrap();

    let mut settings = settings_for(&server);
    settings.location.latitude = None;
    settings.location.longitude = None;
    let options = RunOptions {
        image: Some(image),
        ..Default::default()
    };

    let state = run_headless(&settings, &options).await.unwrap();

    assert_eq!(state, SessionState::Failed(FailureKind::ServiceDisabled));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_headless_requires_image() {
    let server = MockDetectionServer::start(MockResponse::ok(png_bytes(b"x"))).await;

    let result = run_headless(&settings_for(&server), &RunOptions::default()).await;

    assert!(result.is_err());
}

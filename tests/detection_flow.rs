//! End-to-end session tests against an in-process detection server

use scout_app::{Collaborators, Engine, SessionEvent, SessionPhase, SessionState};
use scout_core::{FailureKind, LaunchFailure, LocationFailure};
use scout_platform::test_utils::{
    png_bytes, test_coordinate, test_image, test_processed, CaptureStep, MockDetectionServer,
    MockResponse, RecordingMapLauncher, ScriptedCapture, ScriptedDetector, ScriptedLocation,
};
use scout_platform::{DetectionClient, PlatformLocationProvider, StaticLocationPlatform};

type HttpEngine = Engine<ScriptedCapture, ScriptedLocation, DetectionClient, RecordingMapLauncher>;

fn http_engine(server: &MockDetectionServer, capture: ScriptedCapture) -> HttpEngine {
    Engine::new(Collaborators::new(
        capture,
        ScriptedLocation::always(test_coordinate()),
        DetectionClient::new(&server.base_url()).unwrap(),
        RecordingMapLauncher::new(),
    ))
}

#[tokio::test]
async fn test_ok_response_is_ready_with_exact_bytes() {
    let body = png_bytes(b"bounding boxes");
    let server = MockDetectionServer::start(MockResponse::ok(body.clone())).await;
    let mut engine = http_engine(&server, ScriptedCapture::always(test_image()));

    engine.start_capture();
    let state = engine.run_until_settled().await;

    match state {
        SessionState::Ready { image, coordinate } => {
            assert_eq!(&image.bytes()[..], &body[..]);
            assert_eq!(coordinate, test_coordinate());
        }
        other => panic!("expected Ready, got {other:?}"),
    }
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_non_success_status_preserves_code() {
    for code in [400u16, 401, 413, 500, 502] {
        let server = MockDetectionServer::start(MockResponse::status(code, Vec::new())).await;
        let mut engine = http_engine(&server, ScriptedCapture::always(test_image()));

        engine.start_capture();
        let state = engine.run_until_settled().await;

        assert_eq!(state, SessionState::Failed(FailureKind::ServerError { code }));
    }
}

#[tokio::test]
async fn test_coordinate_fields_reach_the_server_verbatim() {
    let server = MockDetectionServer::start(MockResponse::ok(png_bytes(b"x"))).await;
    let mut engine = http_engine(&server, ScriptedCapture::always(test_image()));

    engine.start_capture();
    engine.run_until_settled().await;

    let requests = server.requests();
    let request = &requests[0];
    assert_eq!(request.path, "/detect");
    assert_eq!(request.field("latitude"), Some("37.421999"));
    assert_eq!(request.field("longitude"), Some("-122.084"));

    let image = request.file("image").unwrap();
    assert_eq!(image.bytes, test_image().bytes().to_vec());
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let base = MockDetectionServer::unused_base_url().await;
    let mut engine = Engine::new(Collaborators::new(
        ScriptedCapture::always(test_image()),
        ScriptedLocation::always(test_coordinate()),
        DetectionClient::new(&base).unwrap(),
        RecordingMapLauncher::new(),
    ));

    engine.start_capture();

    assert_eq!(
        engine.run_until_settled().await,
        SessionState::Failed(FailureKind::NetworkError)
    );
}

#[tokio::test]
async fn test_non_image_body_is_malformed_response() {
    let server =
        MockDetectionServer::start(MockResponse::ok(b"<html>oops</html>".to_vec())).await;
    let mut engine = http_engine(&server, ScriptedCapture::always(test_image()));

    engine.start_capture();

    assert_eq!(
        engine.run_until_settled().await,
        SessionState::Failed(FailureKind::MalformedResponse)
    );
}

#[tokio::test]
async fn test_cancelled_capture_never_locates_or_uploads() {
    let server = MockDetectionServer::start(MockResponse::ok(png_bytes(b"x"))).await;
    let mut engine = http_engine(&server, ScriptedCapture::cancelled());
    let mut events = engine.subscribe();

    engine.start_capture();
    let state = engine.run_until_settled().await;

    assert_eq!(state, SessionState::Idle);
    assert_eq!(engine.collaborators().location.calls(), 0);
    assert!(server.requests().is_empty());

    let mut phases = Vec::new();
    while let Ok(SessionEvent::StateChanged { state, .. }) = events.try_recv() {
        phases.push(state.phase());
    }
    assert_eq!(phases, vec![SessionPhase::Capturing, SessionPhase::Idle]);
}

#[tokio::test]
async fn test_late_result_of_superseded_generation_is_dropped() {
    let detector = ScriptedDetector::new();
    let release = detector.push_gated(Ok(test_processed(b"old")));
    let mut engine = Engine::new(Collaborators::new(
        ScriptedCapture::new(vec![CaptureStep::Image(test_image()), CaptureStep::Cancel]),
        ScriptedLocation::always(test_coordinate()),
        detector.clone(),
        RecordingMapLauncher::new(),
    ));
    let watch = engine.watch_state();

    engine.start_capture();
    while !matches!(engine.state(), SessionState::Uploading { .. }) {
        assert!(engine.step().await);
    }

    engine.start_capture();
    release.send(()).unwrap();

    engine.step().await;
    engine.step().await;

    assert_eq!(engine.state(), &SessionState::Idle);
    assert_eq!(engine.generation(), 2);
    assert_eq!(detector.calls(), 1);
    assert!(!matches!(*watch.borrow(), SessionState::Ready { .. }));
}

#[tokio::test]
async fn test_map_requested_before_ready_is_no_coordinate() {
    let server = MockDetectionServer::start(MockResponse::status(500, Vec::new())).await;
    let mut engine = http_engine(&server, ScriptedCapture::always(test_image()));

    assert_eq!(engine.request_map(), Err(LaunchFailure::NoCoordinate));
    assert_eq!(engine.state(), &SessionState::Idle);

    engine.start_capture();
    let failed = engine.run_until_settled().await;
    assert_eq!(failed, SessionState::Failed(FailureKind::ServerError { code: 500 }));

    assert_eq!(engine.request_map(), Err(LaunchFailure::NoCoordinate));
    assert_eq!(engine.state(), &failed);
    assert!(engine.collaborators().map.opened().is_empty());
}

#[tokio::test]
async fn test_service_disabled_then_fresh_capture() {
    let server = MockDetectionServer::start(MockResponse::ok(png_bytes(b"x"))).await;
    let mut engine = Engine::new(Collaborators::new(
        ScriptedCapture::always(test_image()),
        PlatformLocationProvider::new(StaticLocationPlatform::new(None)),
        DetectionClient::new(&server.base_url()).unwrap(),
        RecordingMapLauncher::new(),
    ));

    engine.start_capture();
    assert_eq!(
        engine.run_until_settled().await,
        SessionState::Failed(FailureKind::from(LocationFailure::ServiceDisabled))
    );

    engine.start_capture();
    assert_eq!(engine.state(), &SessionState::Capturing);
    assert_eq!(engine.state().map_coordinate(), None);
    assert_eq!(engine.state().failure(), None);
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_ready_opens_map_at_detection_coordinate() {
    let server = MockDetectionServer::start(MockResponse::ok(png_bytes(b"x"))).await;
    let mut engine = http_engine(&server, ScriptedCapture::always(test_image()));

    engine.start_capture();
    engine.run_until_settled().await;
    tokio_test::assert_ok!(engine.open_map().await);

    assert_eq!(engine.collaborators().map.opened(), vec![test_coordinate()]);
}

//! Scripted collaborators
//!
//! Each double is `Clone` over shared state, so a test can hand one copy to
//! the session engine and keep another to inspect call counts afterwards.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use scout_core::{
    CapturedImage, Coordinate, DetectionError, Error, LaunchFailure, LocationFailure,
    ProcessedImage,
};

use crate::capture::CaptureProvider;
use crate::detection::DetectionService;
use crate::location::{Accuracy, Fix, FixError, LocationPlatform, LocationProvider, Permission};
use crate::map::MapLauncher;

/// Pop the next scripted item; the last one repeats.
fn next_or_last<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

// ─────────────────────────────────────────────────────────────────
// Capture
// ─────────────────────────────────────────────────────────────────

/// One scripted camera outcome.
#[derive(Debug, Clone)]
pub enum CaptureStep {
    Image(CapturedImage),
    Cancel,
    /// Camera unusable.
    Fail,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedCapture {
    steps: Arc<Mutex<VecDeque<CaptureStep>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCapture {
    pub fn new(steps: Vec<CaptureStep>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            calls: Arc::default(),
        }
    }

    /// Every capture yields `image`.
    pub fn always(image: CapturedImage) -> Self {
        Self::new(vec![CaptureStep::Image(image)])
    }

    /// Every capture is cancelled.
    pub fn cancelled() -> Self {
        Self::new(vec![CaptureStep::Cancel])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CaptureProvider for ScriptedCapture {
    async fn capture_image(&self) -> scout_core::Result<Option<CapturedImage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match next_or_last(&self.steps).unwrap_or(CaptureStep::Cancel) {
            CaptureStep::Image(image) => Ok(Some(image)),
            CaptureStep::Cancel => Ok(None),
            CaptureStep::Fail => Err(Error::camera("scripted camera failure")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Location
// ─────────────────────────────────────────────────────────────────

/// Scripted [`LocationProvider`]: replays coordinate results.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLocation {
    results: Arc<Mutex<VecDeque<Result<Coordinate, LocationFailure>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLocation {
    pub fn new(results: Vec<Result<Coordinate, LocationFailure>>) -> Self {
        Self {
            results: Arc::new(Mutex::new(results.into())),
            calls: Arc::default(),
        }
    }

    pub fn always(coordinate: Coordinate) -> Self {
        Self::new(vec![Ok(coordinate)])
    }

    pub fn failing(failure: LocationFailure) -> Self {
        Self::new(vec![Err(failure)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocationProvider for ScriptedLocation {
    async fn current_coordinate(&self) -> Result<Coordinate, LocationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next_or_last(&self.results).unwrap_or(Err(LocationFailure::PositionUnavailable))
    }
}

/// Scripted [`LocationPlatform`] for exercising the permission sequence.
#[derive(Debug, Clone)]
pub struct ScriptedLocationPlatform {
    enabled: bool,
    permission: Permission,
    after_request: Permission,
    fix: Result<Fix, FixError>,
    fix_delay: Option<Duration>,
    permission_checks: Arc<AtomicUsize>,
    permission_requests: Arc<AtomicUsize>,
    fix_requests: Arc<AtomicUsize>,
}

impl ScriptedLocationPlatform {
    fn with_fix(fix: Result<Fix, FixError>) -> Self {
        Self {
            enabled: true,
            permission: Permission::Granted,
            after_request: Permission::Granted,
            fix,
            fix_delay: None,
            permission_checks: Arc::default(),
            permission_requests: Arc::default(),
            fix_requests: Arc::default(),
        }
    }

    /// Service on, permission granted, fix succeeds.
    pub fn granted(fix: Fix) -> Self {
        Self::with_fix(Ok(fix))
    }

    /// Service on, permission granted, fix fails.
    pub fn failing(err: FixError) -> Self {
        Self::with_fix(Err(err))
    }

    pub fn service_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Permission reported before any request.
    pub fn permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    /// Permission reported after the dialog.
    pub fn after_request(mut self, permission: Permission) -> Self {
        self.after_request = permission;
        self
    }

    pub fn fix_delay(mut self, delay: Duration) -> Self {
        self.fix_delay = Some(delay);
        self
    }

    pub fn permission_checks(&self) -> usize {
        self.permission_checks.load(Ordering::SeqCst)
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests.load(Ordering::SeqCst)
    }

    pub fn fix_requests(&self) -> usize {
        self.fix_requests.load(Ordering::SeqCst)
    }
}

impl LocationPlatform for ScriptedLocationPlatform {
    async fn is_service_enabled(&self) -> bool {
        self.enabled
    }

    async fn check_permission(&self) -> Permission {
        self.permission_checks.fetch_add(1, Ordering::SeqCst);
        self.permission
    }

    async fn request_permission(&self) -> Permission {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        self.after_request
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Fix, FixError> {
        self.fix_requests.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fix_delay {
            tokio::time::sleep(delay).await;
        }
        self.fix.clone()
    }
}

// ─────────────────────────────────────────────────────────────────
// Detection
// ─────────────────────────────────────────────────────────────────

struct DetectorStep {
    result: Result<ProcessedImage, DetectionError>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Scripted [`DetectionService`].
///
/// Steps are consumed in order. A gated step does not return until its
/// release handle fires (or is dropped), which lets a test hold an upload
/// "in flight" while it starts another capture.
#[derive(Clone, Default)]
pub struct ScriptedDetector {
    steps: Arc<Mutex<VecDeque<DetectorStep>>>,
    submissions: Arc<Mutex<Vec<(CapturedImage, Coordinate)>>>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a result returned immediately.
    pub fn push(&self, result: Result<ProcessedImage, DetectionError>) -> &Self {
        self.steps.lock().unwrap().push_back(DetectorStep { result, gate: None });
        self
    }

    /// Queue a result held until the returned sender fires.
    pub fn push_gated(&self, result: Result<ProcessedImage, DetectionError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.steps.lock().unwrap().push_back(DetectorStep {
            result,
            gate: Some(rx),
        });
        tx
    }

    pub fn calls(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn submissions(&self) -> Vec<(CapturedImage, Coordinate)> {
        self.submissions.lock().unwrap().clone()
    }
}

impl DetectionService for ScriptedDetector {
    async fn submit(
        &self,
        image: CapturedImage,
        coordinate: Coordinate,
    ) -> Result<ProcessedImage, DetectionError> {
        self.submissions.lock().unwrap().push((image, coordinate));
        let step = self.steps.lock().unwrap().pop_front();

        match step {
            Some(DetectorStep { result, gate }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                result
            }
            None => Err(DetectionError::network("no scripted detection result")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Map
// ─────────────────────────────────────────────────────────────────

/// Records every coordinate it is asked to show.
#[derive(Debug, Clone, Default)]
pub struct RecordingMapLauncher {
    opened: Arc<Mutex<Vec<Coordinate>>>,
    failure: Option<String>,
}

impl RecordingMapLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every launch fails with `reason` (after being recorded).
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            opened: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    pub fn opened(&self) -> Vec<Coordinate> {
        self.opened.lock().unwrap().clone()
    }
}

impl MapLauncher for RecordingMapLauncher {
    async fn open(&self, coordinate: Coordinate) -> Result<(), LaunchFailure> {
        self.opened.lock().unwrap().push(coordinate);
        match &self.failure {
            Some(reason) => Err(LaunchFailure::launch(reason.clone())),
            None => Ok(()),
        }
    }
}

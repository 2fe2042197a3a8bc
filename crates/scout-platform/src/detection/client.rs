//! Multipart HTTP client for the detection service

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use url::Url;

use scout_core::prelude::*;
use scout_core::{CapturedImage, Coordinate, DetectionError, ProcessedImage};

use super::DetectionService;

/// Path appended to the configured base URL.
pub const DETECT_PATH: &str = "detect";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const IMAGE_FIELD: &str = "image";
const LATITUDE_FIELD: &str = "latitude";
const LONGITUDE_FIELD: &str = "longitude";

/// Posts `image`, `latitude` and `longitude` as multipart/form-data to
/// `{base_url}/detect` and expects raw image bytes back.
#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: Client,
    endpoint: Url,
}

impl DetectionClient {
    /// Build a client with the default timeouts.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeouts(base_url, DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let endpoint = detect_endpoint(base_url)?;
        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve `{base_url}/detect`, keeping any path prefix on the base.
pub fn detect_endpoint(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url.trim())
        .map_err(|e| Error::config_invalid(format!("detection base_url {base_url:?}: {e}")))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(Error::config_invalid(format!(
            "detection base_url must be http or https, got {}",
            base.scheme()
        )));
    }

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(DETECT_PATH)
        .map_err(|e| Error::config_invalid(format!("detection endpoint: {e}")))
}

fn image_part(image: &CapturedImage) -> Part {
    let part = || {
        Part::stream_with_length(Body::from(image.bytes().clone()), image.len() as u64)
            .file_name(image.file_name().to_string())
    };

    match part().mime_str(image.content_type()) {
        Ok(part) => part,
        Err(e) => {
            warn!(
                "Unusable content type {:?} for {}: {}",
                image.content_type(),
                image.file_name(),
                e
            );
            part()
        }
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

impl DetectionService for DetectionClient {
    async fn submit(
        &self,
        image: CapturedImage,
        coordinate: Coordinate,
    ) -> std::result::Result<ProcessedImage, DetectionError> {
        let form = Form::new()
            .part(IMAGE_FIELD, image_part(&image))
            .text(LATITUDE_FIELD, coordinate.latitude_field())
            .text(LONGITUDE_FIELD, coordinate.longitude_field());

        info!(
            "Uploading {} ({} bytes) at {} to {}",
            image.file_name(),
            image.len(),
            coordinate,
            self.endpoint
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| DetectionError::network(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Detection service answered {}", status);
            return Err(DetectionError::Server {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DetectionError::network(describe(&e)))?;

        if body.is_empty() {
            return Err(DetectionError::malformed("empty body"));
        }

        let format = image::guess_format(&body)
            .map_err(|_| DetectionError::malformed("body is not a recognised image"))?;

        debug!("Received {} bytes of {:?}", body.len(), format);
        Ok(ProcessedImage::new(body, format.to_mime_type()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{png_bytes, test_image, MockDetectionServer, MockResponse};

    #[test]
    fn test_detect_endpoint_joins_path() {
        assert_eq!(
            detect_endpoint("http://10.0.2.2:8000").unwrap().as_str(),
            "http://10.0.2.2:8000/detect"
        );
        assert_eq!(
            detect_endpoint("https://api.example.com/v1").unwrap().as_str(),
            "https://api.example.com/v1/detect"
        );
        assert_eq!(
            detect_endpoint("https://api.example.com/v1/").unwrap().as_str(),
            "https://api.example.com/v1/detect"
        );
    }

    #[test]
    fn test_detect_endpoint_rejects_bad_urls() {
        assert!(matches!(
            detect_endpoint("not a url"),
            Err(Error::ConfigInvalid { .. })
        ));
        assert!(matches!(
            detect_endpoint("ftp://example.com"),
            Err(Error::ConfigInvalid { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_returns_exact_bytes() {
        let body = png_bytes(b"annotated");
        let server = MockDetectionServer::start(MockResponse::ok(body.clone())).await;
        let client = DetectionClient::new(&server.base_url()).unwrap();

        let coord = Coordinate::new(37.421999, -122.084).unwrap();
        let processed = client.submit(test_image(), coord).await.unwrap();

        assert_eq!(&processed.bytes()[..], &body[..]);
        assert_eq!(processed.mime_type(), "image/png");
    }

    #[tokio::test]
    async fn test_submit_sends_multipart_fields() {
        let server = MockDetectionServer::start(MockResponse::ok(png_bytes(b"x"))).await;
        let client = DetectionClient::new(&server.base_url()).unwrap();

        let image = CapturedImage::new(b"jpeg-bytes".to_vec(), "image/jpeg", "hole.jpg");
        let coord = Coordinate::new(37.42199900, -122.08400000).unwrap();
        client.submit(image, coord).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/detect");

        let lat: f64 = req.field("latitude").unwrap().parse().unwrap();
        let lon: f64 = req.field("longitude").unwrap().parse().unwrap();
        assert!((lat - 37.421999).abs() < f64::EPSILON);
        assert!((lon - -122.084).abs() < f64::EPSILON);

        let file = req.file("image").unwrap();
        assert_eq!(file.file_name.as_deref(), Some("hole.jpg"));
        assert_eq!(file.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(file.bytes, b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_non_success_status_is_server_error() {
        for status in [400u16, 404, 500, 503] {
            let server =
                MockDetectionServer::start(MockResponse::status(status, b"nope".to_vec())).await;
            let client = DetectionClient::new(&server.base_url()).unwrap();

            let coord = Coordinate::new(0.0, 0.0).unwrap();
            let err = client.submit(test_image(), coord).await.unwrap_err();

            assert_eq!(err, DetectionError::Server { status });
        }
    }

    #[tokio::test]
    async fn test_non_image_body_is_malformed() {
        let server =
            MockDetectionServer::start(MockResponse::ok(b"{\"error\":\"oops\"}".to_vec())).await;
        let client = DetectionClient::new(&server.base_url()).unwrap();

        let err = client
            .submit(test_image(), Coordinate::new(1.0, 1.0).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DetectionError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_empty_body_is_malformed() {
        let server = MockDetectionServer::start(MockResponse::ok(Vec::new())).await;
        let client = DetectionClient::new(&server.base_url()).unwrap();

        let err = client
            .submit(test_image(), Coordinate::new(1.0, 1.0).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DetectionError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let base = MockDetectionServer::unused_base_url().await;
        let client = DetectionClient::new(&base).unwrap();

        let err = client
            .submit(test_image(), Coordinate::new(1.0, 1.0).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DetectionError::Network { .. }));
    }

    #[tokio::test]
    async fn test_slow_server_times_out_as_network_error() {
        let server = MockDetectionServer::start(
            MockResponse::ok(png_bytes(b"late")).delayed(Duration::from_secs(5)),
        )
        .await;
        let client = DetectionClient::with_timeouts(
            &server.base_url(),
            Duration::from_millis(200),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client
            .submit(test_image(), Coordinate::new(1.0, 1.0).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, DetectionError::Network { .. }));
    }
}

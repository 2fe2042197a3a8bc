//! Domain data carried through a detection session

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Marker label shown on maps centred on a detection.
pub const MARKER_LABEL: &str = "pothole detected here";

// ─────────────────────────────────────────────────────────────────
// Coordinate
// ─────────────────────────────────────────────────────────────────

/// A single resolved geolocation reading.
///
/// Fields are private so a `Coordinate` can only be built through
/// [`Coordinate::new`], which rejects non-finite and out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

/// Rejected coordinate values.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if valid {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude as a request field value.
    ///
    /// `f64`'s `Display` is the shortest string that parses back to the same
    /// value and never uses locale separators, so no precision is lost.
    pub fn latitude_field(&self) -> String {
        self.latitude.to_string()
    }

    /// Longitude as a request field value. See [`Coordinate::latitude_field`].
    pub fn longitude_field(&self) -> String {
        self.longitude.to_string()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

// ─────────────────────────────────────────────────────────────────
// Images
// ─────────────────────────────────────────────────────────────────

/// A photograph handed over by the camera, not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    bytes: Bytes,
    content_type: String,
    file_name: String,
}

impl CapturedImage {
    pub fn new(
        bytes: impl Into<Bytes>,
        content_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Image payloads are large; keep debug output to metadata.
impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The annotated image returned by the detection service, rendered as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    bytes: Bytes,
    mime_type: &'static str,
}

impl ProcessedImage {
    pub fn new(bytes: impl Into<Bytes>, mime_type: &'static str) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// MIME type sniffed from the payload's magic bytes.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ProcessedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Guess a content type from a file extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_accepts_valid_range() {
        let c = Coordinate::new(37.421999, -122.084).unwrap();
        assert_eq!(c.latitude(), 37.421999);
        assert_eq!(c.longitude(), -122.084);

        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_coordinate_rejects_out_of_range_and_nan() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.01).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_coordinate_fields_keep_full_precision() {
        let c = Coordinate::new(37.42199900, -122.08400000).unwrap();
        assert_eq!(c.latitude_field(), "37.421999");
        assert_eq!(c.longitude_field(), "-122.084");

        let precise = Coordinate::new(12.345678901234567, 98.76543210987654).unwrap();
        let lat: f64 = precise.latitude_field().parse().unwrap();
        let lon: f64 = precise.longitude_field().parse().unwrap();
        assert_eq!(lat, precise.latitude());
        assert_eq!(lon, precise.longitude());
    }

    #[test]
    fn test_coordinate_display() {
        let c = Coordinate::new(1.5, -2.25).unwrap();
        assert_eq!(c.to_string(), "1.5,-2.25");
    }

    #[test]
    fn test_coordinate_deserialize_validates() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 10.0, "longitude": 20.0}"#).unwrap();
        assert_eq!(ok.latitude(), 10.0);

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 100.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_captured_image_debug_hides_bytes() {
        let img = CapturedImage::new(vec![1u8; 4096], "image/jpeg", "road.jpg");
        let dbg = format!("{:?}", img);
        assert!(dbg.contains("road.jpg"));
        assert!(dbg.contains("4096"));
        assert!(!dbg.contains("[1, 1"));
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(content_type_for_path(Path::new("a/b.JPG")), "image/jpeg");
        assert_eq!(content_type_for_path(Path::new("x.png")), "image/png");
        assert_eq!(content_type_for_path(Path::new("x.webp")), "image/webp");
        assert_eq!(
            content_type_for_path(Path::new("noext")),
            "application/octet-stream"
        );
    }
}

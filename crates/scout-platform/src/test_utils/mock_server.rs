//! Mock detection service for integration testing
//!
//! A plain `TcpListener` speaking just enough HTTP/1.1 to accept one request
//! per connection, decode its multipart body, and answer with a scripted
//! response.
//!
//! # Limitations
//!
//! - **One request per connection**: every response carries `Connection: close`
//! - **No TLS**: the base URL is always `http://127.0.0.1:<port>`
//! - **Multipart only**: other body encodings are recorded as raw bytes

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            delay: None,
        }
    }

    /// Hold the response for `delay` after the request is read.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A file part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFile {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A request as seen by the mock.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub fields: Vec<(String, String)>,
    pub files: Vec<RecordedFile>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn file(&self, name: &str) -> Option<&RecordedFile> {
        self.files.iter().find(|f| f.name == name)
    }
}

struct Shared {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Shared {
    /// Pop the next scripted response; the last one repeats forever.
    fn next_response(&self) -> MockResponse {
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses
                .front()
                .cloned()
                .unwrap_or_else(|| MockResponse::status(500, b"no scripted response".to_vec()))
        }
    }
}

/// In-process stand-in for the detection service.
pub struct MockDetectionServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl MockDetectionServer {
    /// Start a server that always answers with `response`.
    pub async fn start(response: MockResponse) -> Self {
        Self::start_scripted(vec![response]).await
    }

    /// Start a server answering with `responses` in order, repeating the last.
    pub async fn start_scripted(responses: Vec<MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Shared {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        });

        let task_shared = shared.clone();
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let shared = task_shared.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, shared).await {
                        tracing::debug!("mock detection server connection error: {}", e);
                    }
                });
            }
        });

        Self { addr, shared, task }
    }

    /// A base URL nothing is listening on.
    pub async fn unused_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().unwrap().clone()
    }
}

impl Drop for MockDetectionServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle_connection(mut stream: TcpStream, shared: Arc<Shared>) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n", 0) {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let mut request = RecordedRequest {
        method,
        path,
        headers,
        ..Default::default()
    };

    let mut body = buf[header_end + 4..].to_vec();
    if let Some(len) = request
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok())
    {
        while body.len() < len {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body.truncate(len);
    } else if request
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    {
        body = loop {
            if let Some(decoded) = decode_chunked(&body) {
                break decoded;
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break Vec::new();
            }
            body.extend_from_slice(&chunk[..n]);
        };
    }

    if let Some(boundary) = request.header("content-type").and_then(boundary_of) {
        let (fields, files) = parse_multipart(&body, &boundary);
        request.fields = fields;
        request.files = files;
    }
    request.body = body;
    shared.requests.lock().unwrap().push(request);

    let response = shared.next_response();
    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        response.body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&response.body).await?;
    stream.shutdown().await
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Mock",
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Decode a complete chunked body, or `None` if more bytes are needed.
fn decode_chunked(raw: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = 0;
    loop {
        let line_end = find(raw, b"\r\n", pos)?;
        let size_str = std::str::from_utf8(&raw[pos..line_end]).ok()?;
        let size_str = size_str.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_str, 16).ok()?;
        let data_start = line_end + 2;
        if size == 0 {
            return Some(out);
        }
        let data_end = data_start + size;
        if raw.len() < data_end + 2 {
            return None;
        }
        out.extend_from_slice(&raw[data_start..data_end]);
        pos = data_end + 2;
    }
}

fn boundary_of(content_type: &str) -> Option<String> {
    let (mime, params) = content_type.split_once(';')?;
    if !mime.trim().eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params.split(';').find_map(|p| {
        let (k, v) = p.trim().split_once('=')?;
        (k.trim() == "boundary").then(|| v.trim().trim_matches('"').to_string())
    })
}

fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition.split(';').skip(1).find_map(|p| {
        let (k, v) = p.trim().split_once('=')?;
        (k.trim() == key).then(|| v.trim().trim_matches('"').to_string())
    })
}

fn parse_multipart(body: &[u8], boundary: &str) -> (Vec<(String, String)>, Vec<RecordedFile>) {
    let delimiter = format!("--{boundary}");
    let next_delimiter = format!("\r\n--{boundary}");
    let mut fields = Vec::new();
    let mut files = Vec::new();

    let Some(first) = find(body, delimiter.as_bytes(), 0) else {
        return (fields, files);
    };
    let mut pos = first + delimiter.len();

    while !body[pos..].starts_with(b"--") {
        pos += 2;
        let Some(header_end) = find(body, b"\r\n\r\n", pos) else {
            break;
        };
        let headers = String::from_utf8_lossy(&body[pos..header_end]).into_owned();
        let content_start = header_end + 4;
        let Some(content_end) = find(body, next_delimiter.as_bytes(), content_start) else {
            break;
        };
        let content = body[content_start..content_end].to_vec();

        let mut disposition = None;
        let mut content_type = None;
        for line in headers.split("\r\n") {
            if let Some((k, v)) = line.split_once(':') {
                match k.trim().to_ascii_lowercase().as_str() {
                    "content-disposition" => disposition = Some(v.trim().to_string()),
                    "content-type" => content_type = Some(v.trim().to_string()),
                    _ => {}
                }
            }
        }

        if let Some(disposition) = disposition {
            let name = disposition_param(&disposition, "name").unwrap_or_default();
            match disposition_param(&disposition, "filename") {
                Some(file_name) => files.push(RecordedFile {
                    name,
                    file_name: Some(file_name),
                    content_type,
                    bytes: content,
                }),
                None if content_type.is_some() => files.push(RecordedFile {
                    name,
                    file_name: None,
                    content_type,
                    bytes: content,
                }),
                None => fields.push((name, String::from_utf8_lossy(&content).into_owned())),
            }
        }

        pos = content_end + next_delimiter.len();
    }

    (fields, files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multipart_fields_and_file() {
        let body = b"--XyZ\r\n\
Content-Disposition: form-data; name=\"image\"; filename=\"a.jpg\"\r\n\
Content-Type: image/jpeg\r\n\
\r\n\
\x01\x02\r\n\x03\r\n\
--XyZ\r\n\
Content-Disposition: form-data; name=\"latitude\"\r\n\
\r\n\
37.421999\r\n\
--XyZ--\r\n";

        let (fields, files) = parse_multipart(body, "XyZ");

        assert_eq!(fields, vec![("latitude".to_string(), "37.421999".to_string())]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name.as_deref(), Some("a.jpg"));
        assert_eq!(files[0].bytes, b"\x01\x02\r\n\x03");
    }

    #[test]
    fn test_boundary_of() {
        assert_eq!(
            boundary_of("multipart/form-data; boundary=abc123").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            boundary_of("multipart/form-data; boundary=\"q\"").as_deref(),
            Some("q")
        );
        assert_eq!(boundary_of("application/json"), None);
    }

    #[test]
    fn test_decode_chunked() {
        assert_eq!(
            decode_chunked(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n").as_deref(),
            Some(&b"Wikipedia"[..])
        );
        assert_eq!(decode_chunked(b"4\r\nWi"), None);
    }
}

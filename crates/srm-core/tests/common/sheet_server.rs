//! Minimal HTTP/1.1 server that mimics a sheet-backed cloud function for
//! integration tests.
//!
//! Answers GET with a configurable JSON body and POST with a configurable
//! acknowledgment. Supports failure injection: fail the first N requests with
//! HTTP 500, or delay the first response past the client timeout. Counts
//! requests so tests can assert how many attempts reached the wire.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SheetServerOptions {
    /// Body returned for GET requests (list/headers/keyed reads).
    pub get_body: String,
    /// Body returned for POST requests (write acks).
    pub post_body: String,
    /// First N requests are answered with HTTP 500.
    pub fail_first: u32,
    /// Sleep before answering the first request (timeout/supersession tests).
    pub delay_first: Option<Duration>,
}

impl Default for SheetServerOptions {
    fn default() -> Self {
        Self {
            get_body: "[]".to_string(),
            post_body: r#"{"status":"success"}"#.to_string(),
            fail_first: 0,
            delay_first: None,
        }
    }
}

/// Handle to a running server. The server runs until the process exits.
pub struct SheetServer {
    pub base_url: String,
    hits: Arc<AtomicU32>,
    last_request: Arc<Mutex<Option<String>>>,
}

impl SheetServer {
    /// Number of requests that reached the server so far.
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Raw text of the most recent request (request line, headers, body).
    pub fn last_request(&self) -> Option<String> {
        self.last_request.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Returns a handle with the base URL
/// (e.g. "http://127.0.0.1:12345/exec").
pub fn start(opts: SheetServerOptions) -> SheetServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicU32::new(0));
    let last_request = Arc::new(Mutex::new(None));
    let server = SheetServer {
        base_url: format!("http://127.0.0.1:{}/exec", port),
        hits: Arc::clone(&hits),
        last_request: Arc::clone(&last_request),
    };
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let opts = opts.clone();
            let hits = Arc::clone(&hits);
            let last_request = Arc::clone(&last_request);
            thread::spawn(move || handle(stream, &opts, &hits, &last_request));
        }
    });
    server
}

fn handle(
    mut stream: std::net::TcpStream,
    opts: &SheetServerOptions,
    hits: &AtomicU32,
    last_request: &Mutex<Option<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

    let Some(request) = read_request(&mut stream) else {
        return;
    };
    *last_request.lock().unwrap() = Some(request.clone());
    let hit = hits.fetch_add(1, Ordering::SeqCst);

    if hit == 0 {
        if let Some(delay) = opts.delay_first {
            thread::sleep(delay);
        }
    }

    if hit < opts.fail_first {
        let _ = stream.write_all(
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 21\r\n\r\nInternal Server Error",
        );
        return;
    }

    let method = request.split_whitespace().next().unwrap_or("");
    let body = if method.eq_ignore_ascii_case("POST") {
        &opts.post_body
    } else {
        &opts.get_body
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

/// Reads one request: headers plus Content-Length bytes of body.
fn read_request(stream: &mut std::net::TcpStream) -> Option<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut tmp = [0u8; 4096];
    loop {
        let n = match stream.read(&mut tmp) {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        buf.extend_from_slice(&tmp[..n]);
        if let Some(header_end) = find_blank_line(&buf) {
            let headers = String::from_utf8_lossy(&buf[..header_end]);
            let content_length = parse_content_length(&headers);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
        if buf.len() > 1 << 20 {
            break;
        }
    }
    if buf.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&buf).to_string())
    }
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_content_length(headers: &str) -> usize {
    for line in headers.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                return value.trim().parse().unwrap_or(0);
            }
        }
    }
    0
}

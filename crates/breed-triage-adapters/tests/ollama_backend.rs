//! Integration tests for the Ollama backend against a canned local server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use breed_triage_adapters::{OllamaBackend, OllamaConfig};
use breed_triage_core::{FeatureExtractor, JudgmentSource};
use breed_triage_test_support::{FeatureBuilder, SyntheticImageBuilder};

/// Serves one HTTP request with `status` and a chat reply carrying
/// `content`, and hands back the request body.
fn serve_once(status: u16, content: &str) -> (String, JoinHandle<serde_json::Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let body = serde_json::json!({
        "model": "test",
        "message": {"role": "assistant", "content": content},
        "done": true,
    })
    .to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request = vec![0; content_length];
        reader.read_exact(&mut request).unwrap();

        let mut stream = reader.into_inner();
        write!(
            stream,
            "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        serde_json::from_slice(&request).unwrap()
    });

    (url, handle)
}

fn backend(url: String) -> OllamaBackend {
    OllamaBackend::new(OllamaConfig {
        base_url: url,
        timeout: Duration::from_secs(10),
        ..OllamaConfig::default()
    })
    .unwrap()
}

#[test]
fn test_extract_parses_fenced_json() {
    let features = FeatureBuilder::uniform(0.5).json();
    let (url, server) = serve_once(200, &format!("```json\n{features}\n```"));
    let image = SyntheticImageBuilder::png("rex.png", 4, 4);

    let extracted = backend(url).extract(&image).unwrap();
    assert_eq!(extracted.map(serde_json::Value::Object), Some(features));

    let request = server.join().unwrap();
    assert_eq!(request["model"], "llava");
    assert_eq!(request["stream"], false);
    assert!(request["messages"][0]["content"].as_str().unwrap().contains("muzzle-head-ratio"));
    assert!(!request["messages"][0]["images"][0].as_str().unwrap().is_empty());
}

#[test]
fn test_judge_strips_quotes() {
    let (url, server) = serve_once(200, "\"美國史大佛夏牛頭犬 (AmStaff)\"\n");
    let image = SyntheticImageBuilder::png("rex.png", 4, 4);

    let judgment = backend(url).judge(&image).unwrap();
    assert_eq!(judgment, "美國史大佛夏牛頭犬 (AmStaff)");
    assert_eq!(server.join().unwrap()["model"], "gemma3:27b-it-qat");
}

#[test]
fn test_prose_feature_reply_is_an_error() {
    let (url, server) = serve_once(200, "This dog looks friendly.");
    let image = SyntheticImageBuilder::png("rex.png", 4, 4);

    assert!(backend(url).extract(&image).is_err());
    server.join().unwrap();
}

#[test]
fn test_http_error_status_is_an_error() {
    let (url, server) = serve_once(404, "model not found");
    let image = SyntheticImageBuilder::png("rex.png", 4, 4);

    let err = backend(url).judge(&image).unwrap_err();
    assert!(format!("{err:#}").contains("gemma3:27b-it-qat"));
    server.join().unwrap();
}

#[test]
fn test_unreachable_server_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let image = SyntheticImageBuilder::png("rex.png", 4, 4);
    let err = backend(url).extract(&image).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to reach Ollama"));
}

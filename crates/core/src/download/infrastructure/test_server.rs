//! One-shot local HTTP servers for download tests.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Accepts a single connection, consumes the request head and hands the
/// socket to `respond`. Returns the URL to fetch.
pub fn serve_with(respond: impl FnOnce(&mut TcpStream) + Send + 'static) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap_or(0) > 0 {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }
        let mut stream = reader.into_inner();
        let _ = stream.set_nodelay(true);
        respond(&mut stream);
    });
    format!("http://{addr}/clip.mp4")
}

fn head(status: &str, content_length: usize) -> String {
    format!("HTTP/1.1 {status}\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n")
}

/// Complete response in one write.
pub fn serve_once(status: &str, body: &'static [u8]) -> String {
    let status = status.to_string();
    serve_with(move |stream| {
        let _ = stream.write_all(head(&status, body.len()).as_bytes());
        let _ = stream.write_all(body);
    })
}

/// Announces `declared_len` bytes, sends `body` and hangs up.
pub fn serve_truncated(declared_len: usize, body: &'static [u8]) -> String {
    serve_with(move |stream| {
        let _ = stream.write_all(head("200 OK", declared_len).as_bytes());
        let _ = stream.write_all(body);
        let _ = stream.flush();
    })
}

/// Sends the body one byte at a time, pausing `gap` before each byte
/// after the first.
pub fn serve_trickle(body: &'static [u8], gap: Duration) -> String {
    serve_with(move |stream| {
        let _ = stream.write_all(head("200 OK", body.len()).as_bytes());
        for (i, byte) in body.iter().enumerate() {
            if i > 0 {
                std::thread::sleep(gap);
            }
            if stream.write_all(&[*byte]).is_err() {
                return;
            }
            let _ = stream.flush();
        }
    })
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

//! Integration test: a real stash server on loopback, driven by the curl client
//! and by raw sockets.

mod common;

use remotestash_core::client::RemoteClient;
use remotestash_core::item::{Item, ItemInfo};
use remotestash_core::mime;
use remotestash_core::server::ServerOptions;
use remotestash_core::stash::Stash;
use std::io::{Read, Write};
use std::net::{Ipv4Addr, TcpStream};
use std::time::Duration;
use tempfile::tempdir;

fn client(url: &str) -> RemoteClient {
    RemoteClient::new(url, Some(Duration::from_secs(10))).unwrap()
}

/// Send raw bytes and read the whole reply until the server closes.
fn raw_exchange(server: &common::stash_server::RunningServer, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.write_all(request).unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).unwrap();
    String::from_utf8_lossy(&reply).into_owned()
}

#[test]
fn push_last_pull_over_http() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start(dir.path(), 1024 * 1024);
    let remote = client(&server.base_url(false));

    let reply = remote
        .push(&Item::from_string(ItemInfo::new(mime::DEFAULT_CONTENT_TYPE), "first"))
        .unwrap();
    assert_eq!(reply, r#"{"success":1}"#);
    let mut info = ItemInfo::new(mime::IMAGE_PNG);
    info.filename = Some("dot.png".to_string());
    remote
        .push(&Item::from_bytes(info, vec![0x89, b'P', b'N', b'G']))
        .unwrap();

    let stash = Stash::open(dir.path()).unwrap();
    assert_eq!(stash.len(), 2);
    assert_eq!(stash.list()[1].filename.as_deref(), Some("dot.png"));

    let last = remote.last().unwrap().unwrap();
    assert_eq!(last.info.content_type, mime::IMAGE_PNG);
    assert_eq!(last.info.filename.as_deref(), Some("dot.png"));
    assert_eq!(last.size(), 4);

    let png = remote.pull().unwrap().unwrap();
    assert_eq!(png.as_bytes(), Some(&[0x89, b'P', b'N', b'G'][..]));
    let text = remote.pull().unwrap().unwrap();
    assert_eq!(text.as_str().as_deref(), Some("first"));
    assert!(remote.pull().unwrap().is_none());
    assert!(remote.last().unwrap().is_none());

    // Only the index is left behind.
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["contents.json".to_string()]);

    server.stop();
}

#[test]
fn status_reports_count_and_last() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start(dir.path(), 1024 * 1024);
    let remote = client(&server.base_url(false));

    let status = remote.status().unwrap();
    assert_eq!(status.items_count, 0);
    assert!(status.last.is_none());

    remote
        .push(&Item::from_string(ItemInfo::new(mime::TEXT_HTML), "<b>x</b>"))
        .unwrap();
    let status = remote.status().unwrap();
    assert_eq!(status.items_count, 1);
    let last = status.last.unwrap();
    assert_eq!(last.size, 8);
    assert_eq!(last.content_type, mime::TEXT_HTML);
}

#[test]
fn debug_query_echoes_without_storing() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start(dir.path(), 1024 * 1024);
    let remote = client(&server.base_url(false));

    let response = remote
        .post("push?debug", b"hello", mime::TEXT_PLAIN, None)
        .unwrap();
    let text = String::from_utf8(response.body).unwrap();
    assert!(text.contains("command=POST"));
    assert!(text.contains("BODY [5 bytes]"));
    assert!(Stash::open(dir.path()).unwrap().is_empty());
}

#[test]
fn unknown_route_is_an_error() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start(dir.path(), 1024 * 1024);
    let err = client(&server.base_url(false)).get("elsewhere").unwrap_err();
    assert!(err.to_string().contains("HTTP 500"));
}

#[test]
fn oversized_body_gets_413() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start(dir.path(), 8);
    let reply = raw_exchange(
        &server,
        b"POST /push HTTP/1.1\r\nContent-Length: 100\r\n\r\n",
    );
    assert!(reply.starts_with("HTTP/1.1 413 "));
    assert!(Stash::open(dir.path()).unwrap().is_empty());
}

#[test]
fn expect_continue_then_body() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start(dir.path(), 1024);

    let mut stream = TcpStream::connect(server.addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream
        .write_all(b"POST /push HTTP/1.1\r\nContent-Type: text/plain\r\nExpect: 100-continue\r\nContent-Length: 3\r\n\r\n")
        .unwrap();
    let mut interim = [0u8; 25];
    stream.read_exact(&mut interim).unwrap();
    assert_eq!(&interim, b"HTTP/1.1 100 Continue\r\n\r\n");
    stream.write_all(b"abc").unwrap();
    let mut reply = String::new();
    stream.read_to_string(&mut reply).unwrap();
    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert!(reply.ends_with(r#"{"success":1}"#));
    assert_eq!(Stash::open(dir.path()).unwrap().len(), 1);
}

#[test]
fn server_keeps_serving_after_bad_request() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start(dir.path(), 1024);

    let reply = raw_exchange(&server, b"garbage\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 400 "));
    // A client that connects and leaves without sending anything.
    drop(TcpStream::connect(server.addr).unwrap());

    let status = client(&server.base_url(false)).status().unwrap();
    assert_eq!(status.items_count, 0);
}

#[test]
fn push_and_pull_over_tls() {
    let dir = tempdir().unwrap();
    let server = common::stash_server::start_tls(dir.path());
    let remote = client(&server.base_url(true));

    remote
        .push(&Item::from_string(ItemInfo::new(mime::DEFAULT_CONTENT_TYPE), "secret"))
        .unwrap();
    let item = remote.pull().unwrap().unwrap();
    assert_eq!(item.as_str().as_deref(), Some("secret"));

    server.stop();
}

#[test]
fn stored_filename_cannot_split_headers() {
    let dir = tempdir().unwrap();
    let mut stash = Stash::open(dir.path()).unwrap();
    let mut info = ItemInfo::new(mime::TEXT_PLAIN);
    info.filename = Some("a.txt\r\nX-Injected: yes".to_string());
    stash.push(Item::from_string(info, "payload")).unwrap();

    let server = common::stash_server::start(dir.path(), 1024);
    let reply = raw_exchange(&server, b"GET /last HTTP/1.1\r\n\r\n");
    let (head, body) = reply.split_once("\r\n\r\n").unwrap();
    assert!(!head.lines().any(|l| l.starts_with("X-Injected")));
    assert!(head.contains("Content-Disposition: inline; filename=\"a.txtX-Injected: yes\"\r\n"));
    assert_eq!(body, "payload");
}

#[test]
fn zero_io_timeout_still_answers() {
    let dir = tempdir().unwrap();
    let mut options = ServerOptions::new(Ipv4Addr::LOCALHOST.into(), 0);
    options.io_timeout = Some(Duration::ZERO);
    let server = common::stash_server::start_with_options(dir.path(), options);

    let reply = raw_exchange(&server, b"GET /status HTTP/1.1\r\n\r\n");
    assert!(reply.starts_with("HTTP/1.1 200 OK"));
    assert!(reply.ends_with(r#"{"items_count":0,"last":null}"#));

    let mut options = ServerOptions::new(Ipv4Addr::LOCALHOST.into(), 0);
    options.io_timeout = None;
    let server = common::stash_server::start_with_options(dir.path(), options);
    let status = client(&server.base_url(false)).status().unwrap();
    assert_eq!(status.items_count, 0);
}

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use kiln_core::config::GlobalConfig;
use kiln_core::pattern::RefPattern;
use kiln_core::reference::PackageReference;
use kiln_core::search::RemoteSearch;
use kiln_store::index::{RemoteIndex, RemoteSet};
use kiln_store::remote::Remote;
use kiln_util::errors::KilnError;

/// Serve one canned response per connection and return the raw requests.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
            }
            requests.push(String::from_utf8_lossy(&raw).into_owned());
            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                401 => "Unauthorized",
                _ => "Internal Server Error",
            };
            write!(
                stream,
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
        }
        requests
    });
    (url, handle)
}

fn r(s: &str) -> PackageReference {
    PackageReference::parse(s).unwrap()
}

fn zlib_versions() -> RefPattern {
    RefPattern::versions_of("zlib", None, None).unwrap()
}

#[test]
fn search_sends_pattern_and_parses_results() {
    let (url, server) = serve(vec![(
        200,
        r#"{"results": ["zlib/1.3", "zlib/1.2.13", "zlib/1.2.11@lasote/stable"]}"#,
    )]);
    let index = RemoteIndex::new(Remote::new("center", &url)).unwrap();

    let refs = index.search(&zlib_versions()).unwrap();
    assert_eq!(refs, vec![r("zlib/1.2.13"), r("zlib/1.3")]);

    let requests = server.join().unwrap();
    assert!(
        requests[0].starts_with("GET /v1/conans/search?q=zlib%2F* HTTP/1.1"),
        "got: {}",
        requests[0]
    );
}

#[test]
fn not_found_is_empty() {
    let (url, server) = serve(vec![(404, "")]);
    let index = RemoteIndex::new(Remote::new("center", &url)).unwrap();
    assert!(index.search(&zlib_versions()).unwrap().is_empty());
    server.join().unwrap();
}

#[test]
fn basic_auth_is_sent() {
    let (url, server) = serve(vec![(200, r#"{"results": []}"#)]);
    let mut remote = Remote::new("internal", &url);
    remote.username = Some("alice".to_string());
    remote.password = Some("secret".to_string());
    let index = RemoteIndex::new(remote).unwrap();
    index.search(&zlib_versions()).unwrap();

    let requests = server.join().unwrap();
    assert!(requests[0]
        .to_ascii_lowercase()
        .contains("authorization: basic ywxpy2u6c2vjcmv0"));
}

#[test]
fn bearer_token_is_sent() {
    let (url, server) = serve(vec![(200, r#"{"results": []}"#)]);
    let mut remote = Remote::new("internal", &url);
    remote.password = Some("tok123".to_string());
    RemoteIndex::new(remote)
        .unwrap()
        .search(&zlib_versions())
        .unwrap();

    let requests = server.join().unwrap();
    assert!(requests[0]
        .to_ascii_lowercase()
        .contains("authorization: bearer tok123"));
}

#[test]
fn server_errors_are_retried() {
    let (url, server) = serve(vec![
        (500, ""),
        (503, ""),
        (200, r#"{"results": ["zlib/1.3"]}"#),
    ]);
    let index = RemoteIndex::new(Remote::new("center", &url)).unwrap();
    assert_eq!(index.search(&zlib_versions()).unwrap(), vec![r("zlib/1.3")]);
    assert_eq!(server.join().unwrap().len(), 3);
}

#[test]
fn persistent_server_errors_give_up() {
    let (url, server) = serve(vec![(500, ""), (500, ""), (500, "")]);
    let index = RemoteIndex::new(Remote::new("center", &url)).unwrap();
    let err = index.search(&zlib_versions()).unwrap_err();
    assert!(matches!(err, KilnError::Network { .. }));
    assert!(err.to_string().contains("Failed after 3 attempts"));
    server.join().unwrap();
}

#[test]
fn client_errors_are_not_retried() {
    let (url, server) = serve(vec![(401, "")]);
    let index = RemoteIndex::new(Remote::new("center", &url)).unwrap();
    let err = index.search(&zlib_versions()).unwrap_err();
    assert!(err.to_string().contains("401"));
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn set_returns_first_non_empty_remote() {
    let (first, first_server) = serve(vec![(200, r#"{"results": []}"#)]);
    let (second, second_server) = serve(vec![(200, r#"{"results": ["zlib/1.2.13"]}"#)]);
    let config = GlobalConfig::parse_toml(&format!(
        "[[remotes]]\nname = \"first\"\nurl = \"{first}\"\n\n[[remotes]]\nname = \"second\"\nurl = \"{second}\"\n"
    ))
    .unwrap();
    let set = RemoteSet::from_config(&config).unwrap();
    let names: Vec<&str> = set.remotes().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);

    let found = set.search_remotes(&zlib_versions(), None).unwrap();
    assert_eq!(found, vec![r("zlib/1.2.13")]);
    first_server.join().unwrap();
    second_server.join().unwrap();
}

#[test]
fn set_stops_at_first_answer() {
    let (first, first_server) = serve(vec![(200, r#"{"results": ["zlib/1.3"]}"#)]);
    let set = RemoteSet::new(vec![
        RemoteIndex::new(Remote::new("first", &first)).unwrap(),
        RemoteIndex::new(Remote::new("unused", "http://127.0.0.1:9")).unwrap(),
    ]);
    let found = set.search_remotes(&zlib_versions(), None).unwrap();
    assert_eq!(found, vec![r("zlib/1.3")]);
    first_server.join().unwrap();
}

#[test]
fn named_remote_is_the_only_one_queried() {
    let (second, second_server) = serve(vec![(200, r#"{"results": ["zlib/1.2.11"]}"#)]);
    let set = RemoteSet::new(vec![
        RemoteIndex::new(Remote::new("first", "http://127.0.0.1:9")).unwrap(),
        RemoteIndex::new(Remote::new("second", &second)).unwrap(),
    ]);
    let found = set.search_remotes(&zlib_versions(), Some("second")).unwrap();
    assert_eq!(found, vec![r("zlib/1.2.11")]);
    second_server.join().unwrap();
}

//! Lookup orchestration over scripted sources

mod common;

use std::time::Duration;

use common::{sample_book, Scripted, ScriptedSource};
use proptest::prelude::*;
use rstest::rstest;
use shelf_core::http::{HttpClient, DEFAULT_USER_AGENT};
use shelf_core::sources::{OpenLibrarySearchSource, OpenLibrarySource};
use shelf_core::{BookSource, Config, Lookup, LookupError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn chain(sources: &[&ScriptedSource]) -> Lookup {
    Lookup::new(
        sources
            .iter()
            .map(|s| Box::new((*s).clone()) as Box<dyn BookSource>)
            .collect(),
    )
}

fn test_client() -> HttpClient {
    HttpClient::new(DEFAULT_USER_AGENT, Duration::from_secs(5)).unwrap()
}

/// Answers every request with 503 until the test ends.
async fn unavailable_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;
        }
    });
    format!("http://{}", addr)
}

/// A local address with nothing listening on it.
fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[test]
fn test_default_chain_order() {
    let lookup = Lookup::from_config(&Config::default()).unwrap();
    assert_eq!(
        lookup.source_ids(),
        vec!["openlibrary", "openlibrary-search", "googlebooks"]
    );
}

#[tokio::test]
async fn test_http_failures_fall_through_to_later_source() {
    let unavailable = unavailable_server().await;
    let unreachable = unreachable_url();
    let last = ScriptedSource::new("last", Scripted::Found(sample_book("gb-7", "Fallback")));

    let lookup = Lookup::new(vec![
        Box::new(OpenLibrarySource::new(test_client(), unavailable.clone())) as Box<dyn BookSource>,
        Box::new(OpenLibrarySearchSource::new(test_client(), unreachable, unavailable)),
        Box::new(last.clone()),
    ]);

    let book = lookup.find_by_isbn("978-0-13-468599-1").await.unwrap();
    assert_eq!(book.id, "gb-7");
    assert_eq!(last.calls(), vec!["9780134685991"]);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
#[case("---")]
#[case(" - - ")]
#[tokio::test]
async fn test_blank_query_is_rejected_without_network(#[case] input: &str) {
    let primary = ScriptedSource::new("primary", Scripted::Empty);
    let lookup = chain(&[&primary]);

    let err = lookup.find_by_isbn(input).await.unwrap_err();
    assert!(matches!(err, LookupError::Validation(_)));
    assert!(primary.calls().is_empty());
}

#[tokio::test]
async fn test_primary_hit_stops_the_chain() {
    let primary = ScriptedSource::new("primary", Scripted::Found(sample_book("ol-1", "Primary")));
    let secondary = ScriptedSource::new("secondary", Scripted::Found(sample_book("ols-1", "Secondary")));
    let lookup = chain(&[&primary, &secondary]);

    let book = lookup.find_by_isbn("9780134685991").await.unwrap();
    assert_eq!(book.title, "Primary");
    assert_eq!(primary.calls().len(), 1);
    assert!(secondary.calls().is_empty());
}

#[tokio::test]
async fn test_failure_and_empty_fall_through() {
    let failing = ScriptedSource::new("failing", Scripted::Fail);
    let empty = ScriptedSource::new("empty", Scripted::Empty);
    let last = ScriptedSource::new("last", Scripted::Found(sample_book("gb-1", "Last")));
    let lookup = chain(&[&failing, &empty, &last]);

    let book = lookup.find_by_isbn("9780134685991").await.unwrap();
    assert_eq!(book.id, "gb-1");
    assert_eq!(failing.calls().len(), 1);
    assert_eq!(empty.calls().len(), 1);
    assert_eq!(last.calls().len(), 1);
}

#[tokio::test]
async fn test_exhausted_chain_is_not_found() {
    let a = ScriptedSource::new("a", Scripted::Fail);
    let b = ScriptedSource::new("b", Scripted::Empty);
    let lookup = chain(&[&a, &b]);

    let err = lookup.find_by_isbn("0000000000").await.unwrap_err();
    assert_eq!(
        err,
        LookupError::NotFound {
            isbn: "0000000000".into()
        }
    );
    assert!(err.to_string().contains("0000000000"));
}

#[tokio::test]
async fn test_hyphens_are_stripped_before_querying() {
    let source = ScriptedSource::new("only", Scripted::Empty);
    let lookup = chain(&[&source]);

    let _ = lookup.find_by_isbn(" 978-0-13-468599-1 ").await;
    assert_eq!(source.calls(), vec!["9780134685991"]);
}

proptest! {
    #[test]
    fn prop_whitespace_only_never_queries(input in "[ \t\r\n]{0,12}") {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let source = ScriptedSource::new("only", Scripted::Found(sample_book("x", "X")));
        let lookup = chain(&[&source]);

        let result = runtime.block_on(lookup.find_by_isbn(&input));
        prop_assert!(matches!(result, Err(LookupError::Validation(_))));
        prop_assert!(source.calls().is_empty());
    }
}

//! HTTP fetcher tests.
//!
//! These tests use wiremock to stand in for the register's web server.

use std::collections::BTreeMap;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use register_crawler::error::AppError;
use register_crawler::models::{Category, CategoryProfile, CrawlerConfig};
use register_crawler::services::{Endpoint, Extractor, HttpFetcher, PageFetcher};

fn fetcher(server: &MockServer) -> HttpFetcher {
    let config = CrawlerConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..CrawlerConfig::default()
    };
    HttpFetcher::new(&config).unwrap()
}

#[tokio::test]
async fn test_list_request_carries_query_and_ajax_header() {
    let server = MockServer::start().await;
    let body = r#"<a class="table-row" href="/firm/acme">
        <div class="col"><p>Name: Acme Capital</p><p class="grey">Reference number: F001</p></div>
    </a>"#;

    Mock::given(method("GET"))
        .and(path("/public-register/firms"))
        .and(query_param("page", "2"))
        .and(query_param("isAjax", "true"))
        .and(query_param("keywords", "acme"))
        .and(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let profile = CategoryProfile::for_category(Category::Firms);
    let filters = BTreeMap::from([("keywords".to_string(), "acme".to_string())]);
    let html = fetcher(&server)
        .fetch(&profile, &Endpoint::list(2, &filters))
        .await
        .unwrap();

    let rows = Extractor::new(&profile).unwrap().extract_list(&html);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name(), "Acme Capital");
    assert_eq!(rows[0].link(), Some("/firm/acme"));
}

#[tokio::test]
async fn test_detail_request_uses_absolute_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/firm/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>detail</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let profile = CategoryProfile::for_category(Category::Firms);
    let url = format!("{}/firm/acme", server.uri());
    let html = fetcher(&server)
        .fetch(&profile, &Endpoint::detail(url))
        .await
        .unwrap();

    assert!(html.contains("detail"));
}

#[tokio::test]
async fn test_error_status_is_a_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let profile = CategoryProfile::for_category(Category::Funds);
    let url = format!("{}/fund/missing", server.uri());
    let err = fetcher(&server)
        .fetch(&profile, &Endpoint::detail(url))
        .await
        .unwrap_err();

    match err {
        AppError::Fetch { url, status } => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/fund/missing"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

//! Integration tests for search harvesting using wiremock

mod common;

use common::{scraper_config, serp_fixture, wp_config};
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tripdesk::config::FetchMode;
use tripdesk::crawler::Harvester;
use tripdesk::error::Error;
use tripdesk::models::{ContentId, SearchResult, UrlRow};
use tripdesk::storage::{CsvSink, DedupBuffer};
use tripdesk::wp::{ContentClient, RelationClient};
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_search_through_proxy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/general"))
        .and(query_param("x-api-key", "test-key"))
        .and(query_param("browser", "false"))
        .and(query_param("country", "es"))
        .and(query_param(
            "url",
            format!("{}/search?q=hoteles+tenerife&num=5&hl=es", server.uri()),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(serp_fixture("modern")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = scraper_config(&server.uri(), FetchMode::Proxy, Some("test-key"));
    let results = Harvester::new(&config)
        .unwrap()
        .search("hoteles tenerife")
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(
        results.iter().map(|r| r.rank).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert!(results.iter().all(|r| r.keyword == "hoteles tenerife"));
    assert_eq!(results[0].title, "Los 10 mejores hoteles de Tenerife");
    assert_eq!(
        results[0].link,
        "https://www.booking.com/region/es/tenerife.es.html"
    );
}

#[tokio::test]
async fn test_missing_proxy_key_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = scraper_config(&server.uri(), FetchMode::Proxy, None);
    let err = Harvester::new(&config)
        .unwrap()
        .search("hoteles")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingConfig(_)));
}

#[tokio::test]
async fn test_direct_mode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "apartamentos lanzarote"))
        .and(query_param("num", "3"))
        .and(query_param("hl", "es"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .respond_with(ResponseTemplate::new(200).set_body_string(serp_fixture("redirect")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = scraper_config(&server.uri(), FetchMode::Direct, None);
    config.top_n = 3;
    let results = Harvester::new(&config)
        .unwrap()
        .search("apartamentos lanzarote")
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[2].link, "https://www.turismolanzarote.com/alojamiento/");
}

#[tokio::test]
async fn test_blocked_page_is_empty_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(serp_fixture("blocked")))
        .mount(&server)
        .await;

    let config = scraper_config(&server.uri(), FetchMode::Direct, None);
    let results = Harvester::new(&config).unwrap().search("hoteles").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_proxy_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/general"))
        .respond_with(ResponseTemplate::new(423))
        .mount(&server)
        .await;

    let config = scraper_config(&server.uri(), FetchMode::Proxy, Some("k"));
    let err = Harvester::new(&config)
        .unwrap()
        .search("hoteles")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(423));
}

#[tokio::test]
async fn test_harvest_into_csv_twice() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(serp_fixture("container")))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));
    let config = scraper_config(&server.uri(), FetchMode::Direct, None);
    let harvester = Harvester::new(&config).unwrap();

    let mut buffer: DedupBuffer<SearchResult> = DedupBuffer::new(sink.clone(), 10);
    let first = harvester.harvest("casas rurales", &mut buffer).await.unwrap();
    let second = harvester.harvest("casas rurales", &mut buffer).await.unwrap();
    buffer.close().unwrap();

    assert_eq!((first.added, first.duplicates), (3, 0));
    assert_eq!((second.added, second.duplicates), (0, 3));
    assert_eq!(second.results.len(), 3);

    let content = fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "keyword,title,link,result_number,scraped_at");
    assert!(lines[1].starts_with(
        "casas rurales,Casas rurales en La Palma - Escapada Rural,https://www.escapadarural.com/casas-rurales/la-palma,1,"
    ));
}

#[tokio::test]
async fn test_harvest_minimal_layout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(serp_fixture("redirect")))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sink = CsvSink::new(dir.path().join("urls.csv"));
    let config = scraper_config(&server.uri(), FetchMode::Direct, None);

    let mut buffer: DedupBuffer<UrlRow> = DedupBuffer::new(sink.clone(), 10);
    Harvester::new(&config)
        .unwrap()
        .harvest("apartamentos", &mut buffer)
        .await
        .unwrap();
    buffer.close().unwrap();

    let keys = sink.read_keys("url").unwrap();
    assert_eq!(keys.len(), 3);
    assert!(keys.contains("https://www.airbnb.es/lanzarote-spain/stays"));
}

#[tokio::test]
async fn test_publish_sources_creates_and_links() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/fuentes"))
        .and(body_json(json!({
            "title": "Alojamiento - Turismo Lanzarote",
            "status": "draft",
            "meta": {"source_url": "https://www.turismolanzarote.com/alojamiento/"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 900})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/fuentes"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/wp-json/jet-rel/12"))
        .and(body_json(json!({
            "parent_id": 671,
            "child_id": 900,
            "context": "child",
            "store_items_type": "update"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let wp = wp_config(&server.uri());
    let content = ContentClient::new(&wp).unwrap();
    let relations = RelationClient::new(&wp).unwrap();

    let results = vec![
        SearchResult::new(
            "lanzarote",
            "Alojamiento - Turismo Lanzarote",
            "https://www.turismolanzarote.com/alojamiento/",
            1,
        ),
        SearchResult::new("lanzarote", "Otro", "https://www.otro.es/", 2),
    ];

    let report =
        Harvester::publish_sources(&results, ContentId(671), "fuentes", &content, &relations)
            .await;

    assert!(!report.all_succeeded());
    assert_eq!(report.linked(), vec![ContentId(900)]);
    assert_eq!(report.outcomes[1].item, None);
    assert!(report.outcomes[1].result.as_ref().unwrap_err().contains("HTTP 500"));
}

//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against an on-disk database.

use site_scrape::config::Config;
use site_scrape::crawler::{run_crawl, CrawlOutcome};
use site_scrape::storage::{PageRecord, RecordStore, SqliteStorage};
use site_scrape::ExpansionState;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing to `db_path`
fn create_test_config(db_path: &Path, max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.max_threads = 4;
    config.output.database_path = db_path.to_string_lossy().into_owned();
    config.fetcher.timeout_secs = 5;
    config
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("scraper.db")
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&format!("{}/", server.uri())).expect("Failed to parse mock server URL")
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Home links to /page1, /page2 and an off-site page; both pages link home
async fn mount_small_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/page1">Page 1</a>
            <a href="page2">Page 2</a>
            <a href="https://other.example/x">Elsewhere</a>
            </body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body><a href="/">Home</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_page(
        server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><a href="/">Home</a></body></html>"#
            .to_string(),
    )
    .await;
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

fn stored_pages(db: &Path) -> Vec<PageRecord> {
    SqliteStorage::new(db)
        .expect("Failed to open database")
        .all_pages()
        .expect("Failed to read pages")
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;
    let dir = TempDir::new().unwrap();
    let seed = seed(&server);

    let report = run_crawl(&create_test_config(&db_path(&dir), 1), &seed)
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Fresh);
    assert_eq!(report.root, Some(ExpansionState::Completed));
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.pages_written, 3);
    assert_eq!(report.write_failures, 0);

    let pages = stored_pages(&db_path(&dir));
    assert_eq!(pages.len(), 3, "unexpected rows: {:?}", pages);
    assert!(pages.iter().all(|p| !p.url.contains("other.example")));

    let home = pages.iter().find(|p| p.url == seed.as_str()).unwrap();
    assert_eq!(home.title, "Home");
    assert_eq!(
        home.links,
        vec![
            seed.join("page1").unwrap().to_string(),
            seed.join("page2").unwrap().to_string()
        ]
    );

    let page1_url = seed.join("page1").unwrap().to_string();
    let page1 = pages.iter().find(|p| p.url == page1_url).unwrap();
    assert_eq!(page1.title, "Page 1");
    assert_eq!(page1.depth, 1);
    assert_eq!(page1.source_url, page1_url);
}

#[tokio::test]
async fn test_rerun_fetches_nothing() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&db_path(&dir), 2);
    let seed = seed(&server);

    run_crawl(&config, &seed).await.expect("First crawl failed");
    let requests_after_first = request_count(&server).await;
    assert_eq!(requests_after_first, 3);

    let report = run_crawl(&config, &seed).await.expect("Second crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::AlreadyComplete);
    assert_eq!(report.pages_fetched, 0);
    assert_eq!(request_count(&server).await, requests_after_first);
}

#[tokio::test]
async fn test_resume_interrupted_crawl() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;
    let dir = TempDir::new().unwrap();
    let seed = seed(&server);

    // A previous run got as far as expanding the seed at depth 1
    {
        let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
        let mut record = PageRecord::placeholder(seed.as_str(), seed.as_str());
        record.depth = 1;
        record.title = "Home".to_string();
        storage.upsert(&record).unwrap();
    }

    let report = run_crawl(&create_test_config(&db_path(&dir), 2), &seed)
        .await
        .expect("Crawl failed");

    assert_eq!(report.outcome, CrawlOutcome::Resumed { from_depth: 1 });
    assert_eq!(report.pages_fetched, 3);

    let storage = SqliteStorage::new(&db_path(&dir)).unwrap();
    assert_eq!(storage.max_depth_for(seed.as_str()).unwrap(), Some(2));
    assert_eq!(storage.count_pages().unwrap(), 3);
}

#[tokio::test]
async fn test_failed_child_does_not_stop_siblings() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <a href="/broken">Broken</a>
            <a href="/fine">Fine</a>
            </body></html>"#
            .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/fine",
        "<html><head><title>Fine</title></head></html>".to_string(),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let seed = seed(&server);

    let report = run_crawl(&create_test_config(&db_path(&dir), 1), &seed)
        .await
        .expect("Crawl failed");

    assert_eq!(report.root, Some(ExpansionState::Completed));
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages_failed, 1);

    let pages = stored_pages(&db_path(&dir));
    let home = pages.iter().find(|p| p.url == seed.as_str()).unwrap();
    assert_eq!(home.title, "Home");
    let fine = pages.iter().find(|p| p.url.ends_with("/fine")).unwrap();
    assert_eq!(fine.title, "Fine");
    // Only the discovery placeholder exists for the failed page
    let broken = pages.iter().find(|p| p.url.ends_with("/broken")).unwrap();
    assert!(broken.title.is_empty());
    assert_eq!(broken.depth, 0);
}

#[tokio::test]
async fn test_redirect_records_final_url() {
    let server = MockServer::start().await;
    let target = format!("{}/landing", server.uri());
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", target.as_str()))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/landing",
        "<html><head><title>Landing</title></head></html>".to_string(),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let seed = seed(&server);

    run_crawl(&create_test_config(&db_path(&dir), 0), &seed)
        .await
        .expect("Crawl failed");

    let pages = stored_pages(&db_path(&dir));
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].url, seed.as_str());
    assert_eq!(pages[0].source_url, target);
    assert_eq!(pages[0].title, "Landing");
}

#[tokio::test]
async fn test_unreachable_seed_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let seed = Url::parse("http://127.0.0.1:9/").unwrap();

    let report = run_crawl(&create_test_config(&db_path(&dir), 2), &seed)
        .await
        .expect("Crawl should finish even if the seed is unreachable");

    assert_eq!(report.root, Some(ExpansionState::Failed));
    assert!(stored_pages(&db_path(&dir)).is_empty());
}

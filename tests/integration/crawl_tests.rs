//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive full
//! scrape cycles through the coordinator end-to-end.

use seedwatch::config::{parse_config, ScraperConfig};
use seedwatch::crawler::{Coordinator, ScrapeLoop};
use seedwatch::extract::DiscardPages;
use seedwatch::index::MemoryIndex;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the given seeds
fn create_test_config(seeds: Vec<String>, save_file: &str) -> ScraperConfig {
    ScraperConfig {
        save_file: save_file.to_string(),
        maxage: 3600,
        user_agent: "TestBot/1.0".to_string(),
        max_depth: 2,
        max_concurrent_visits: 4,
        seeds,
        ..Default::default()
    }
}

fn html(body: String) -> ResponseTemplate {
    // set_body_string would force text/plain
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

/// Mounts a seed page with a heading, a paragraph, a followable link and a
/// link whose text is too short to follow
async fn mount_home(server: &MockServer) {
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><head><title>Home</title></head><body>
            <h1>Intro</h1>
            <p>Body text</p>
            <a href="{0}/page?x=1">Docs</a>
            <a href="{0}/go">Go</a>
            </body></html>"#,
            base
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html(
            "<html><head><title>Docs page</title></head><body><p>Reference</p></body></html>"
                .to_string(),
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(html("<html><body>never</body></html>".to_string()))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scrape_records_pages() {
    let server = MockServer::start().await;
    mount_home(&server).await;
    let seed = format!("{}/", server.uri());

    let coordinator = Coordinator::new(
        create_test_config(vec![seed.clone()], ""),
        Arc::new(DiscardPages),
    );
    let report = coordinator.scrape().await.unwrap();

    assert_eq!(report.seeds_dispatched, 1);
    assert_eq!(report.session.visits, 2);
    assert_eq!(report.session.completed, 2);

    let store = coordinator.store();
    let home = store.page(&seed).unwrap();
    assert_eq!(home.url, seed);
    assert_eq!(home.title, "Home");
    assert!(home.time > 0);
    assert!(home.summary.starts_with("Intro Body text "));
    assert_eq!(
        home.links.get("Docs").map(String::as_str),
        Some(format!("{}/page?x=1", server.uri()).as_str())
    );
    assert!(!home.links.contains_key("Go"));

    let docs = store.page(&format!("{}/page", server.uri())).unwrap();
    assert_eq!(docs.title, "Docs page");
    assert!(store.page(&format!("{}/page?x=1", server.uri())).is_none());
    assert!(store.seed(&seed).unwrap().last_check > 0);
}

#[tokio::test]
async fn test_followed_link_drops_query() {
    let server = MockServer::start().await;
    mount_home(&server).await;

    let coordinator = Coordinator::new(
        create_test_config(vec![format!("{}/", server.uri())], ""),
        Arc::new(DiscardPages),
    );
    coordinator.scrape().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let page_requests: Vec<_> = requests
        .iter()
        .filter(|request| request.url.path() == "/page")
        .collect();
    assert_eq!(page_requests.len(), 1);
    assert_eq!(page_requests[0].url.query(), None);
}

#[tokio::test]
async fn test_fresh_seed_is_not_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><head><title>Once</title></head></html>".to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let coordinator = Coordinator::new(
        create_test_config(vec![seed.clone()], ""),
        Arc::new(DiscardPages),
    );

    let first = coordinator.scrape().await.unwrap();
    let checked = coordinator.store().seed(&seed).unwrap();
    let page = coordinator.store().page(&seed).unwrap();

    let second = coordinator.scrape().await.unwrap();

    assert_eq!(first.seeds_dispatched, 1);
    assert_eq!(second.seeds_dispatched, 0);
    assert_eq!(second.seeds_fresh, 1);
    assert_eq!(coordinator.store().seed(&seed).unwrap(), checked);
    assert_eq!(coordinator.store().page(&seed).unwrap(), page);
}

#[tokio::test]
async fn test_stale_seed_recrawl_overwrites_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html><head><title>Old</title></head><body><p>Obsolete words</p></body></html>"
                .to_string(),
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            "<html><head><title>New</title></head><body><p>Fresh words</p></body></html>"
                .to_string(),
        ))
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let coordinator = Coordinator::new(
        create_test_config(vec![seed.clone()], ""),
        Arc::new(DiscardPages),
    );
    coordinator.scrape().await.unwrap();
    assert_eq!(coordinator.store().page(&seed).unwrap().title, "Old");

    // make the seed stale again
    coordinator.store().mark_checked(&seed, 0);
    coordinator.scrape().await.unwrap();

    let page = coordinator.store().page(&seed).unwrap();
    assert_eq!(page.title, "New");
    assert_eq!(page.summary, "Fresh words ");
}

#[tokio::test]
async fn test_config_reload_adds_seeds() {
    let server = MockServer::start().await;
    mount_home(&server).await;
    Mock::given(method("GET"))
        .and(path("/extra"))
        .respond_with(html(
            "<html><head><title>Extra</title></head></html>".to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let seed = format!("{}/", server.uri());
    let extra = format!("{}/extra", server.uri());
    let coordinator = Coordinator::new(
        create_test_config(vec![seed.clone()], ""),
        Arc::new(DiscardPages),
    );
    coordinator.scrape().await.unwrap();
    let first_check = coordinator.store().seed(&seed).unwrap().last_check;

    let reloaded = parse_config(&format!(
        r#"
        [scraper]
        user-agent = "TestBot/1.0"
        max-depth = 2
        seeds = ["{}", "{}"]
        "#,
        seed, extra
    ))
    .unwrap();
    coordinator.update_config(reloaded.scraper);
    let added = coordinator.reconcile_seeds(&coordinator.config());

    assert_eq!(added, vec![extra.clone()]);
    assert_eq!(coordinator.store().seed(&extra).unwrap().last_check, 0);
    assert_eq!(
        coordinator.store().seed(&seed).unwrap().last_check,
        first_check
    );

    let report = coordinator.scrape().await.unwrap();
    assert_eq!(report.seeds_dispatched, 1);
    assert_eq!(report.seeds_fresh, 1);
    assert_eq!(coordinator.store().page(&extra).unwrap().title, "Extra");
}

#[tokio::test]
async fn test_scraped_pages_are_searchable() {
    let server = MockServer::start().await;
    mount_home(&server).await;
    let seed = format!("{}/", server.uri());

    let index = Arc::new(MemoryIndex::new());
    let coordinator = Coordinator::new(create_test_config(vec![seed.clone()], ""), index.clone());
    coordinator.scrape().await.unwrap();

    let hits = index.search("intro body", 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].url, seed);
    assert_eq!(hits[0].title, "Home");
    assert_eq!(index.stats().documents, 2);
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let server = MockServer::start().await;
    mount_home(&server).await;
    let seed = format!("{}/", server.uri());

    let dir = TempDir::new().unwrap();
    let save_file = dir.path().join("seedwatch.json");
    let config = create_test_config(vec![seed.clone()], save_file.to_str().unwrap());

    let first = Arc::new(Coordinator::new(config.clone(), Arc::new(DiscardPages)));
    ScrapeLoop::with_interval(Arc::clone(&first), Duration::from_secs(3600))
        .bootstrap()
        .await
        .unwrap();
    assert!(save_file.exists());

    let index = Arc::new(MemoryIndex::new());
    let second = Coordinator::new(config, index.clone());
    assert!(second.load().await.unwrap());

    assert_eq!(second.store().snapshot(), first.store().snapshot());
    assert_eq!(index.search("reference", 10).len(), 1);

    // restored seeds are fresh, so nothing is refetched
    let report = second.scrape().await.unwrap();
    assert_eq!(report.seeds_dispatched, 0);
}

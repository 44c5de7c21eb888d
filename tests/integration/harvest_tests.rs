//! Integration tests for the harvester
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full harvest cycle end-to-end: seed import, pagination, status
//! tracking and export.

use quote_harvest::config::{Config, HarvestConfig, OutputConfig, SeedEntry, UserAgentConfig};
use quote_harvest::crawler::run_harvest;
use quote_harvest::output::export_records;
use quote_harvest::state::SeedStatus;
use quote_harvest::storage::{RecordStore, SeedStore, SqliteStorage};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `dir`
fn create_test_config(dir: &TempDir, request_limit: u64, pool_size: usize) -> Config {
    let file = |name: &str| dir.path().join(name).to_string_lossy().into_owned();

    Config {
        harvest: HarvestConfig {
            request_limit,
            pool_size,
            pending_seed_cap: 900,
            request_timeout_secs: 5,
            page_url_template: None,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: file("quotes.db"),
            csv_path: file("quotes.csv"),
            json_path: file("quotes.json"),
        },
        seeds: vec![],
    }
}

fn listing(quotes: &[(&str, &str)], next: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    for (text, author) in quotes {
        html.push_str(&format!(
            r#"<div class="quote"><span class="text">{}</span>
            <span>by <small class="author">{}</small></span>
            <div class="tags">Tags: <a class="tag" href="/tag/x/">x</a><a class="tag" href="/tag/y/">y</a></div></div>"#,
            text, author
        ));
    }
    if let Some(href) = next {
        html.push_str(&format!(
            r#"<ul class="pager"><li class="next"><a href="{}">Next →</a></li></ul>"#,
            href
        ));
    }
    html.push_str("</body></html>");
    html
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Mounts a three-page listing under /tag/{tag}: 2 + 1 + 2 quotes
async fn mount_three_page_seed(server: &MockServer, tag: &str) {
    let base = format!("/tag/{}", tag);
    mount_page(
        server,
        &base,
        listing(
            &[("first", "Ada"), ("second", "Grace")],
            Some(&format!("{}/page/2/", base)),
        ),
    )
    .await;
    mount_page(
        server,
        &format!("{}/page/2/", base),
        listing(&[("third", "Alan")], Some(&format!("{}/page/3/", base))),
    )
    .await;
    mount_page(
        server,
        &format!("{}/page/3/", base),
        listing(&[("fourth", "Edsger"), ("fifth", "Barbara")], None),
    )
    .await;
}

fn open(config: &Config) -> SqliteStorage {
    SqliteStorage::new(Path::new(&config.output.database_path)).expect("Failed to open database")
}

fn seed_status(storage: &SqliteStorage, id: &str) -> SeedStatus {
    storage
        .get_seed(id)
        .expect("Failed to read seed")
        .expect("Seed missing")
        .status
}

#[tokio::test]
async fn test_full_harvest_single_seed() {
    let mock_server = MockServer::start().await;
    mount_three_page_seed(&mock_server, "love").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 100, 2);
    let storage = open(&config);
    storage
        .upsert_seed("love", &format!("{}/tag/love", mock_server.uri()))
        .unwrap();

    let run = run_harvest(&config).await.expect("Harvest failed");

    assert_eq!(run.seeds_submitted, 1);
    assert_eq!(run.seeds_completed, 1);
    assert_eq!(run.requests_consumed, 3);
    assert_eq!(run.records_persisted, 5);
    assert_eq!(seed_status(&storage, "love"), SeedStatus::Done);

    let records = storage.all_records().unwrap();
    let texts: Vec<&str> = records.iter().map(|r| r.quote_text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third", "fourth", "fifth"]);
    assert_eq!(records[0].tags, vec!["x", "y"]);
    assert!(records[2].source_url.ends_with("/tag/love/page/2/"));
}

#[tokio::test]
async fn test_budget_exhaustion_resumes_next_run() {
    let mock_server = MockServer::start().await;
    mount_three_page_seed(&mock_server, "life").await;

    let dir = TempDir::new().unwrap();
    let storage = {
        let config = create_test_config(&dir, 2, 1);
        let storage = open(&config);
        storage
            .upsert_seed("life", &format!("{}/tag/life", mock_server.uri()))
            .unwrap();

        let run = run_harvest(&config).await.expect("Harvest failed");

        assert_eq!(run.requests_consumed, 2);
        assert_eq!(run.seeds_budget_exhausted, 1);
        assert_eq!(run.summary().total_seeds_budget_exhausted, 1);
        storage
    };

    assert_eq!(seed_status(&storage, "life"), SeedStatus::Pending);
    assert_eq!(storage.count_records().unwrap(), 3);

    // A later run picks the seed up again from its first page
    let config = create_test_config(&dir, 100, 1);
    let run = run_harvest(&config).await.expect("Harvest failed");

    assert_eq!(run.seeds_completed, 1);
    assert_eq!(run.requests_consumed, 3);
    assert_eq!(seed_status(&storage, "life"), SeedStatus::Done);
    assert_eq!(storage.count_records().unwrap(), 8);
}

#[tokio::test]
async fn test_unreachable_first_page_marks_seed_failed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tag/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tag/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 100, 2);
    let storage = open(&config);
    storage
        .upsert_seed("gone", &format!("{}/tag/gone", mock_server.uri()))
        .unwrap();
    storage
        .upsert_seed("broken", &format!("{}/tag/broken", mock_server.uri()))
        .unwrap();

    let run = run_harvest(&config).await.expect("Harvest failed");

    assert_eq!(run.seeds_failed, 2);
    assert_eq!(run.requests_consumed, 2);
    assert_eq!(seed_status(&storage, "gone"), SeedStatus::Failed);
    assert_eq!(seed_status(&storage, "broken"), SeedStatus::Failed);
    assert_eq!(storage.count_records().unwrap(), 0);
}

#[tokio::test]
async fn test_terminal_seeds_are_not_revisited() {
    let mock_server = MockServer::start().await;
    mount_three_page_seed(&mock_server, "love").await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 100, 2);
    let storage = open(&config);
    let seed_url = format!("{}/tag/love", mock_server.uri());
    storage.upsert_seed("love", &seed_url).unwrap();

    run_harvest(&config).await.expect("Harvest failed");

    // Re-importing a finished seed must not make it pending again
    assert!(!storage.upsert_seed("love", &seed_url).unwrap());
    assert_eq!(seed_status(&storage, "love"), SeedStatus::Done);

    let second = run_harvest(&config).await.expect("Harvest failed");
    assert_eq!(second.seeds_submitted, 0);
    assert_eq!(second.requests_consumed, 0);
    assert_eq!(storage.count_records().unwrap(), 5);
}

#[tokio::test]
async fn test_harvest_many_seeds_then_export() {
    let mock_server = MockServer::start().await;
    let tags = ["a", "b", "c", "d", "e"];
    for tag in tags {
        mount_three_page_seed(&mock_server, tag).await;
    }

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&dir, 1000, 2);
    config.seeds = tags
        .iter()
        .map(|tag| SeedEntry {
            id: format!("seed-{}", tag),
            page_url: format!("{}/tag/{}", mock_server.uri(), tag),
        })
        .collect();

    let storage = open(&config);
    for seed in &config.seeds {
        assert!(storage.upsert_seed(&seed.id, &seed.page_url).unwrap());
    }

    let run = run_harvest(&config).await.expect("Harvest failed");

    assert_eq!(run.seeds_completed, 5);
    assert_eq!(run.requests_consumed, 15);
    assert_eq!(storage.count_by_status(SeedStatus::Done).unwrap(), 5);

    let csv_path = Path::new(&config.output.csv_path);
    let json_path = Path::new(&config.output.json_path);
    let written = export_records(&storage, csv_path, json_path).expect("Export failed");
    assert_eq!(written, 25);

    let mut reader = csv::Reader::from_path(csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["quote", "author", "tags", "source_url"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 25);
    assert_eq!(&rows[0][2], "x | y");

    let json: Vec<serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
    assert_eq!(json.len(), 25);
    assert_eq!(json[0]["tags"], serde_json::json!(["x", "y"]));
}

#[tokio::test]
async fn test_no_pending_seeds_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 10, 2);

    let run = run_harvest(&config).await.expect("Harvest failed");

    assert_eq!(run.seeds_submitted, 0);
    assert_eq!(run.requests_consumed, 0);
}

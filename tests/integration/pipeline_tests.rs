//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve GBK-encoded listing and detail pages
//! and run the listing and detail phases end-to-end against a temp store.

use recruit_scout::config::Config;
use recruit_scout::crawler::Coordinator;
use recruit_scout::item::now_millis;
use recruit_scout::{item_id, Detail, JsonStore, RecruitmentItem};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server and a temp store
fn create_test_config(base_url: &str, store_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.source.index_url = format!("{}/f-430-1", base_url);
    config.source.base_url = base_url.to_string();
    config.fetch.user_agent_pool_size = 3;
    config.fetch.request_timeout_secs = 5;
    config.store.path = store_dir
        .path()
        .join("assets/source.json")
        .display()
        .to_string();
    config.crawler.concurrency = 5;
    config
}

fn gbk(text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding_rs::GBK.encode(text);
    bytes.into_owned()
}

fn gbk_page(html: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_bytes(gbk(html))
        .insert_header("content-type", "text/html; charset=gbk")
}

fn listing_row(tag: &str, href: &str, title: &str, date: &str) -> String {
    format!(
        r#"<tr class="forum_list">
            <th class="thread-name">
                <span>[<a class="xmc_blue">{tag}</a>]</span>
                <a class="a_subject" href="{href}">{title}</a>
            </th>
            <td class="by"><cite>author</cite><em>{date}</em></td>
        </tr>"#
    )
}

fn listing_page(rows: &[String]) -> String {
    format!(
        "<html><body><table class=\"forum\">{}</table></body></html>",
        rows.concat()
    )
}

fn detail_page(school: &str) -> String {
    format!(
        r#"<html><body>
        <div class="forum_Mix"><table class="adjust_table">
            <tr><td>学校：</td><td>{school}</td></tr>
            <tr><td>招生状态：</td><td>招生中</td></tr>
        </table></div>
        <div class="t_fsz"><p>课题组介绍</p><img src="/logo.png"></div>
        </body></html>"#
    )
}

fn enriched_item(id: &str, url: &str, timestamp: i64) -> RecruitmentItem {
    let mut item = RecruitmentItem::new(id, "博士招生", "stored title", url, timestamp);
    item.mark_enriched(Detail {
        forum_mix: [("school".to_string(), "原始学校".to_string())].into(),
        content: "<p>stored</p>".to_string(),
    });
    item
}

#[tokio::test]
async fn test_listing_keeps_only_recruitment_rows() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(gbk_page(&listing_page(&[
            listing_row("博士招生", "/t-1-1", "课题组招收博士", "2024-03-15"),
            listing_row("学术交流", "/t-2-1", "学术报告", "2024-03-15"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run_listing().await.expect("Listing failed");

    assert_eq!(report.scraped, 1);
    assert_eq!(report.stored, 1);

    let stored = coordinator.store().load();
    assert_eq!(stored.len(), 1);
    let expected_url = format!("{}/t-1-1", server.uri());
    assert_eq!(stored[0].url, expected_url);
    assert_eq!(stored[0].id, item_id(&expected_url));
    assert_eq!(stored[0].title, "课题组招收博士");
    assert_eq!(stored[0].tag, "博士招生");
    assert!(stored[0].ok.is_none());
}

#[tokio::test]
async fn test_listing_twice_is_idempotent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(gbk_page(&listing_page(&[
            listing_row("博士招生", "/t-1-1", "A", "2024-03-15"),
            listing_row("硕士招生", "/t-2-1", "B", "2024-03-14"),
        ])))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();

    coordinator.run_listing().await.unwrap();
    let first = std::fs::read_to_string(coordinator.store().path()).unwrap();
    coordinator.run_listing().await.unwrap();
    let second = std::fs::read_to_string(coordinator.store().path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(coordinator.store().load().len(), 2);
}

#[tokio::test]
async fn test_existing_enriched_record_survives_rescrape() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let url = format!("{}/t-1-1", server.uri());

    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(gbk_page(&listing_page(&[listing_row(
            "博士招生",
            "/t-1-1",
            "edited title",
            "2025-01-01",
        )])))
        .mount(&server)
        .await;

    // The detail page must never be fetched for an item that is already ok
    Mock::given(method("GET"))
        .and(path("/t-1-1"))
        .respond_with(gbk_page(&detail_page("新学校")))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir);
    let original = enriched_item(&item_id(&url), &url, 1_000);
    JsonStore::new(&config.store.path)
        .save(std::slice::from_ref(&original))
        .unwrap();

    let coordinator = Coordinator::new(config).unwrap();
    let summary = coordinator.run().await.expect("Pipeline failed");

    assert_eq!(summary.listing.scraped, 1);
    assert_eq!(summary.detail.skipped, 1);
    assert_eq!(summary.detail.enriched, 0);
    assert_eq!(coordinator.store().load(), vec![original]);
}

#[tokio::test]
async fn test_detail_crawl_with_one_failure() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir);

    // Seven items stored out of timestamp order; item 3 fails
    let timestamps = [500, 700, 100, 300, 600, 200, 400];
    let items: Vec<RecruitmentItem> = timestamps
        .iter()
        .enumerate()
        .map(|(i, ts)| {
            let url = format!("{}/t-{}", server.uri(), i);
            RecruitmentItem::new(item_id(&url), "博士招生", format!("item {}", i), url, *ts)
        })
        .collect();
    JsonStore::new(&config.store.path).save(&items).unwrap();

    for i in 0..7 {
        let response = if i == 3 {
            ResponseTemplate::new(500)
        } else {
            gbk_page(&detail_page(&format!("学校{}", i)))
        };
        Mock::given(method("GET"))
            .and(path(format!("/t-{}", i)))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
    }

    let coordinator = Coordinator::new(config).unwrap();
    let outcome = coordinator.run_details().await.expect("Detail phase failed");

    assert_eq!(outcome.enriched, 6);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.successful().len(), 6);

    let stored = coordinator.store().load();
    assert_eq!(stored.len(), 7);
    assert!(stored.windows(2).all(|w| w[0].timestamp > w[1].timestamp));

    for item in &stored {
        if item.title == "item 3" {
            assert_eq!(item.ok, Some(false));
            let detail = item.detail.as_ref().unwrap();
            assert!(detail.forum_mix.is_empty());
            assert!(detail.content.is_empty());
        } else {
            assert_eq!(item.ok, Some(true));
            let detail = item.detail.as_ref().unwrap();
            assert_eq!(detail.forum_mix.get("status").map(String::as_str), Some("招生中"));
            assert_eq!(detail.content, "<p>课题组介绍</p>");
        }
    }
}

#[tokio::test]
async fn test_unparseable_date_uses_scrape_time() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(gbk_page(&listing_page(&[listing_row(
            "博士招生",
            "/t-1-1",
            "T",
            "刚刚",
        )])))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();

    let before = now_millis();
    let report = coordinator.run_listing().await.unwrap();
    let after = now_millis();

    assert_eq!(report.fallback_timestamps, 1);
    let stored = coordinator.store().load();
    assert!(stored[0].timestamp >= before && stored[0].timestamp <= after);
}

#[tokio::test]
async fn test_listing_failure_is_an_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();

    assert!(coordinator.run_listing().await.is_err());
    assert!(!coordinator.store().exists());
}

#[tokio::test]
async fn test_full_pipeline_enriches_new_items() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(gbk_page(&listing_page(&[
            listing_row("博士招生", "/t-1-1", "A", "2024-03-15"),
            listing_row("硕士招生", "/t-2-1", "B", "2024-03-16"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/t-1-1"))
        .respond_with(gbk_page(&detail_page("北京大学")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/t-2-1"))
        .respond_with(gbk_page(&detail_page("复旦大学")))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), &dir);
    let coordinator = Coordinator::new(config).unwrap();
    let summary = coordinator.run().await.expect("Pipeline failed");

    assert_eq!(summary.listing.scraped, 2);
    assert_eq!(summary.detail.enriched, 2);

    let stored = coordinator.store().load();
    assert_eq!(stored[0].title, "B");
    assert_eq!(
        stored[0]
            .detail
            .as_ref()
            .and_then(|d| d.forum_mix.get("school"))
            .map(String::as_str),
        Some("复旦大学")
    );
    assert_eq!(stored[1].title, "A");
}

#[tokio::test]
async fn test_store_bounded_by_max_items() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let rows: Vec<String> = (1..=9)
        .map(|day| {
            listing_row(
                "博士招生",
                &format!("/t-{}-1", day),
                &format!("day {}", day),
                &format!("2024-03-0{}", day),
            )
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/f-430-1"))
        .respond_with(gbk_page(&listing_page(&rows)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server.uri(), &dir);
    config.store.max_items = 4;
    let coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run_listing().await.unwrap();

    assert_eq!(report.scraped, 9);
    assert_eq!(report.stored, 4);

    let titles: Vec<String> = coordinator
        .store()
        .load()
        .into_iter()
        .map(|item| item.title)
        .collect();
    assert_eq!(titles, vec!["day 9", "day 8", "day 7", "day 6"]);
}

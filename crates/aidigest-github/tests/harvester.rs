//! End-to-end harvest tests against mocked GitHub and completion endpoints.

use std::sync::Arc;
use std::time::Duration;

use aidigest_analysis::{AnalysisClient, ModelAttempts};
use aidigest_core::{KeywordSet, RepoSource};
use aidigest_github::{GithubClient, GithubHarvester};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn keywords() -> KeywordSet {
    KeywordSet {
        repo: vec!["llm".to_owned()],
        video: Vec::new(),
    }
}

fn search_body(repos: &[(&str, i64)]) -> serde_json::Value {
    json!({
        "total_count": repos.len(),
        "items": repos
            .iter()
            .map(|(full_name, stars)| {
                json!({
                    "full_name": full_name,
                    "html_url": format!("https://github.com/{full_name}"),
                    "stargazers_count": stars,
                    "forks_count": 3,
                    "description": "An llm toolkit",
                    "language": "Rust",
                    "topics": ["llm"],
                })
            })
            .collect::<Vec<_>>(),
    })
}

fn disabled_analysis(base_url: &str) -> Arc<AnalysisClient> {
    Arc::new(
        AnalysisClient::new(None, base_url, ModelAttempts::plan("gpt-test", 1, &[]), 1, 5)
            .unwrap(),
    )
}

fn harvester(server: &MockServer, analysis: Arc<AnalysisClient>) -> GithubHarvester {
    let client = GithubClient::with_base_url(None, 5, &server.uri()).unwrap();
    GithubHarvester::new(client, analysis, 2, Duration::from_secs(30), 1)
        .with_trending_url(&format!("{}/trending", server.uri()))
}

#[tokio::test]
async fn harvest_ranks_dedupes_and_merges_star_deltas() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(&[
            ("a/low", 50),
            ("b/high", 900),
            ("c/mid", 200),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<article><h2><a href="/c/mid">c / mid</a></h2>
               <span>42 stars today</span></article>"#,
        ))
        .mount(&server)
        .await;

    let harvester = harvester(&server, disabled_analysis(&server.uri()));
    let items = harvester.harvest(2, &keywords()).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].full_name, "b/high");
    assert_eq!(items[1].full_name, "c/mid");
    assert_eq!(items[1].stars_today, 42);
    assert!(items.iter().all(|i| !i.analysis.is_enriched()));
}

#[tokio::test]
async fn ai_related_trending_entry_is_hydrated_into_a_candidate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_body(&[("a/searched", 100)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<article><h2><a href="/acme/surprise">acme / surprise</a></h2>
               <p>A fast llm server</p>
               <span>311 stars today</span></article>
               <article><h2><a href="/beta/agents">beta / agents</a></h2>
               <p>An llm agent framework</p>
               <span>95 stars today</span></article>
               <article><h2><a href="/other/unrelated">other / unrelated</a></h2>
               <p>A terminal file manager</p>
               <span>120 stars today</span></article>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/surprise"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "acme/surprise",
            "html_url": "https://github.com/acme/surprise",
            "stargazers_count": 700,
            "forks_count": 12,
            "description": "A fast llm server",
            "language": "Rust",
            "topics": [],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/beta/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "beta/agents",
            "html_url": "https://github.com/beta/agents",
            "stargazers_count": 300,
            "forks_count": 5,
            "description": "An llm agent framework",
            "language": "Python",
            "topics": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let harvester = harvester(&server, disabled_analysis(&server.uri()));
    let items = harvester.harvest(10, &keywords()).await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].full_name, "acme/surprise");
    assert_eq!(items[0].stars_today, 311);
    assert_eq!(items[1].full_name, "beta/agents");
    assert_eq!(items[1].stars_today, 95);
    assert_eq!(items[2].full_name, "a/searched");
    // The non-AI trending entry was never hydrated.
    assert!(items.iter().all(|i| i.full_name != "other/unrelated"));
}

#[tokio::test]
async fn harvest_survives_search_failure_with_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harvester = harvester(&server, disabled_analysis(&server.uri()));
    let items = harvester.harvest(10, &keywords()).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn enrichment_attaches_analysis_and_tolerates_detail_404s() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_body(&[("a/enriched", 400)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    // Readme and contents listing both missing: analysis degrades to
    // metadata-only input but still runs.
    Mock::given(method("GET"))
        .and(path("/repos/a/enriched/readme"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/a/enriched/contents/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let analysis_body = json!({
        "summary": "A toolkit",
        "why_trending": "Fresh release",
        "key_innovations": ["streaming"],
        "practical_value": "High",
        "learning_points": ["architecture"],
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": analysis_body.to_string()}}],
            "usage": {"total_tokens": 90},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let analysis = Arc::new(
        AnalysisClient::new(
            Some("test-key"),
            &server.uri(),
            ModelAttempts::plan("gpt-test", 1, &[]),
            1,
            5,
        )
        .unwrap(),
    );
    let harvester = harvester(&server, analysis);
    let items = harvester.harvest(5, &keywords()).await;

    assert_eq!(items.len(), 1);
    let enriched = items[0].analysis.as_enriched().unwrap();
    assert_eq!(enriched.summary, "A toolkit");
    assert_eq!(enriched.key_innovations, vec!["streaming"]);
}

#[tokio::test]
async fn analysis_exhaustion_keeps_the_item_unenriched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_body(&[("a/stubborn", 400)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/a/stubborn/readme"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/a/stubborn/contents/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    // Every completion attempt fails: two on the primary model, one on the
    // fallback. The item must still come back, just unenriched.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let analysis = Arc::new(
        AnalysisClient::new(
            Some("test-key"),
            &server.uri(),
            ModelAttempts::plan("gpt-test", 2, &["gpt-backup".to_owned()]),
            1,
            5,
        )
        .unwrap(),
    );
    let harvester = harvester(&server, analysis);
    let items = harvester.harvest(5, &keywords()).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].full_name, "a/stubborn");
    assert!(!items[0].analysis.is_enriched());
}

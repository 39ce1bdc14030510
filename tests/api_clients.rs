//! Integration tests for the HTTP API clients against a mock server

use seoscope::deploy::{DeployClient, DeployConfig, DeployState, EnvVar, Framework, ProjectArchive};
use seoscope::{AiClient, KeywordClient, PageContent, SeoscopeError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_page() -> PageContent {
    PageContent {
        url: "https://acme.example/".into(),
        domain: "acme.example".into(),
        title: "Acme Widgets".into(),
        word_count: 300,
        is_https: true,
        ..Default::default()
    }
}

#[tokio::test]
async fn ai_analyze_parses_fenced_json_reply() {
    let server = MockServer::start().await;

    let analysis = json!({
        "overallScore": 81,
        "confidence": 92,
        "summary": "Well optimized page.",
        "recommendations": [{
            "priority": "warning",
            "title": "Lengthen meta description"
        }]
    });
    let content = format!("```json\n{analysis}\n```");

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AiClient::new("sk-or-test", "")
        .unwrap()
        .with_base_url(&server.uri());
    let result = client.analyze(&sample_page()).await.unwrap();

    assert_eq!(result.overall_score, 81.0);
    assert_eq!(result.confidence, 92.0);
    assert_eq!(result.summary, "Well optimized page.");
    assert_eq!(result.recommendations.len(), 1);
    // Fields the model omitted fall back to defaults
    assert!(result.optimized_title.is_empty());
    assert_eq!(result.scores.technical.score, 0.0);
}

#[tokio::test]
async fn ai_error_reply_surfaces_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API key"}
        })))
        .mount(&server)
        .await;

    let client = AiClient::new("bad-key", "")
        .unwrap()
        .with_base_url(&server.uri());
    let err = client.analyze(&sample_page()).await.unwrap_err();

    match err {
        SeoscopeError::AiError(message) => assert_eq!(message, "Invalid API key"),
        other => panic!("expected AiError, got {other:?}"),
    }
}

#[tokio::test]
async fn ai_non_json_reply_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "I cannot help with that."}}]
        })))
        .mount(&server)
        .await;

    let client = AiClient::new("sk-or-test", "")
        .unwrap()
        .with_base_url(&server.uri());
    assert!(matches!(
        client.analyze(&sample_page()).await,
        Err(SeoscopeError::ParseError(_))
    ));
}

#[tokio::test]
async fn keyword_suggestions_are_capped_at_twenty() {
    let server = MockServer::start().await;

    let keyword_data: Vec<_> = (0..25)
        .map(|i| json!({"keyword": format!("widget keyword {i}")}))
        .collect();

    Mock::given(method("POST"))
        .and(path(
            "/v3/keywords_data/google_ads/keywords_for_keywords/live",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [{"result": [{"keyword_data": keyword_data}]}]
        })))
        .mount(&server)
        .await;

    let client = KeywordClient::new("login", "pass")
        .unwrap()
        .with_base_url(&server.uri());
    let suggestions = client.suggestions("widgets").await.unwrap();

    assert_eq!(suggestions.len(), 20);
    assert_eq!(suggestions[0], "widget keyword 0");
}

#[tokio::test]
async fn keyword_search_volume_defaults_missing_competition() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/keywords_data/google_ads/search_volume/live"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": [{"result": [
                {"keyword": "widgets", "search_volume": 5400, "competition": "HIGH"},
                {"keyword": "blue widgets"}
            ]}]
        })))
        .mount(&server)
        .await;

    let client = KeywordClient::new("login", "pass")
        .unwrap()
        .with_base_url(&server.uri());
    let volumes = client.search_volume("widgets").await.unwrap();

    assert_eq!(volumes.len(), 2);
    assert_eq!(volumes[0].search_volume, 5400);
    assert_eq!(volumes[1].search_volume, 0);
    assert_eq!(volumes[1].competition, "unknown");
}

#[tokio::test]
async fn keyword_auth_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = KeywordClient::new("login", "wrong")
        .unwrap()
        .with_base_url(&server.uri());
    assert!(matches!(
        client.suggestions("widgets").await,
        Err(SeoscopeError::KeywordError(_))
    ));
}

fn fast_deploy_config() -> DeployConfig {
    DeployConfig {
        poll_interval: Duration::from_millis(10),
        max_poll_attempts: 5,
    }
}

fn static_site_archive() -> ProjectArchive {
    use seoscope::deploy::ArchiveFile;
    ProjectArchive {
        files: vec![ArchiveFile {
            path: "index.html".into(),
            data: b"<html><body>hi</body></html>".to_vec(),
            is_text: true,
        }],
    }
}

#[tokio::test]
async fn deploy_uploads_sets_env_and_waits_for_ready() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v13/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "dpl_1",
            "projectId": "prj_1",
            "url": "my-site.vercel.app"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v10/projects/prj_1/env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v13/deployments/dpl_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "readyState": "READY",
            "url": "my-site.vercel.app"
        })))
        .mount(&server)
        .await;

    let client = DeployClient::with_config("tok_test", fast_deploy_config())
        .unwrap()
        .with_base_url(&server.uri());
    let deployment = client
        .deploy(
            &static_site_archive(),
            "My Site",
            Framework::Static,
            &[EnvVar::secret("OPENROUTER_API_KEY", "sk-or-1")],
        )
        .await
        .unwrap();

    assert_eq!(deployment.id, "dpl_1");
    assert_eq!(deployment.url, "https://my-site.vercel.app");
    assert_eq!(deployment.state, DeployState::Ready);
}

#[tokio::test]
async fn deploy_build_error_fails_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v13/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "dpl_2",
            "projectId": "prj_2",
            "url": "broken.vercel.app"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v13/deployments/dpl_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "readyState": "ERROR"
        })))
        .mount(&server)
        .await;

    let client = DeployClient::with_config("tok_test", fast_deploy_config())
        .unwrap()
        .with_base_url(&server.uri());
    let err = client
        .deploy(&static_site_archive(), "broken", Framework::Static, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, SeoscopeError::DeploymentFailed(_)));
}

#[tokio::test]
async fn deploy_poll_ceiling_reports_still_building() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v13/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "dpl_3",
            "projectId": "prj_3",
            "url": "slow.vercel.app"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v13/deployments/dpl_3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "readyState": "BUILDING"
        })))
        .mount(&server)
        .await;

    let client = DeployClient::with_config("tok_test", fast_deploy_config())
        .unwrap()
        .with_base_url(&server.uri());
    let deployment = client
        .deploy(&static_site_archive(), "slow", Framework::Static, &[])
        .await
        .unwrap();

    assert_eq!(deployment.state, DeployState::StillBuilding);
    assert_eq!(deployment.url, "https://slow.vercel.app");
}

#[tokio::test]
async fn deploy_api_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v13/deployments"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"message": "Token scope insufficient"}
        })))
        .mount(&server)
        .await;

    let client = DeployClient::with_config("tok_test", fast_deploy_config())
        .unwrap()
        .with_base_url(&server.uri());
    let err = client
        .deploy(&static_site_archive(), "site", Framework::Static, &[])
        .await
        .unwrap_err();

    match err {
        SeoscopeError::DeployError(message) => {
            assert_eq!(message, "Token scope insufficient")
        }
        other => panic!("expected DeployError, got {other:?}"),
    }
}

#[tokio::test]
async fn deploy_env_var_failure_does_not_abort() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v13/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "dpl_4",
            "projectId": "prj_4",
            "url": "tolerant.vercel.app"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v10/projects/prj_4/env"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v13/deployments/dpl_4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "readyState": "READY",
            "url": "tolerant.vercel.app"
        })))
        .mount(&server)
        .await;

    let client = DeployClient::with_config("tok_test", fast_deploy_config())
        .unwrap()
        .with_base_url(&server.uri());
    let deployment = client
        .deploy(
            &static_site_archive(),
            "tolerant",
            Framework::Static,
            &[EnvVar::plain("NODE_ENV", "production")],
        )
        .await
        .unwrap();

    assert_eq!(deployment.state, DeployState::Ready);
}

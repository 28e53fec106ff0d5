//! Budget, circuit-breaker, and disabled-router governance over real HTTP

mod harness;

use harness::config::ConfigBuilder;
use harness::mock_llm::MockLlm;
use palisade_llm::{CircuitState, GenerationRequest, Router, RouterError};

#[tokio::test]
async fn disabled_router_contacts_no_provider() {
    let provider = MockLlm::start().await.unwrap();

    let config = ConfigBuilder::new()
        .with_openai_provider("primary", &provider.base_url())
        .disabled()
        .build();
    let router = Router::from_config(&config).unwrap();

    let err = router
        .generate(&GenerationRequest::from_prompt("Hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, RouterError::Disabled));
    assert_eq!(provider.completion_count(), 0);
}

#[tokio::test]
async fn circuit_opens_after_threshold_and_skips_provider() {
    let primary = MockLlm::start_always_failing().await.unwrap();
    let backup = MockLlm::start().await.unwrap();

    let config = ConfigBuilder::new()
        .with_openai_provider("primary", &primary.base_url())
        .with_openai_provider("backup", &backup.base_url())
        .with_failure_threshold(2)
        .build();
    let router = Router::from_config(&config).unwrap();

    // Two failing calls trip the primary's breaker; both fall back
    for _ in 0..2 {
        router
            .generate(&GenerationRequest::from_prompt("Hello"))
            .await
            .unwrap();
    }
    assert_eq!(primary.completion_count(), 2);
    assert_eq!(
        router.provider_stats()["primary"].circuit_breaker.status,
        CircuitState::Open
    );

    // With the circuit open the primary is not contacted at all
    let response = router
        .generate(&GenerationRequest::from_prompt("Hello"))
        .await
        .unwrap();
    assert_eq!(response.provider, "backup");
    assert_eq!(primary.completion_count(), 2);

    // Skipping never touches the skipped provider's budget
    assert_eq!(router.provider_stats()["primary"].budget.spent_cents, 0);
}

#[tokio::test]
async fn exhausted_budget_skips_provider() {
    let primary = MockLlm::start().await.unwrap();
    let backup = MockLlm::start_with_response("backup response").await.unwrap();

    // Each mock call reports 15 tokens, costing 1 cent at 3 cents/1k
    let config = ConfigBuilder::new()
        .with_openai_provider("primary", &primary.base_url())
        .with_openai_provider("backup", &backup.base_url())
        .with_budget("primary", 2)
        .build();
    let router = Router::from_config(&config).unwrap();

    let request = GenerationRequest::from_prompt("Hello").with_max_tokens(100);

    // Two calls drain the primary's 2-cent budget
    for _ in 0..2 {
        let response = router.generate(&request).await.unwrap();
        assert_eq!(response.provider, "primary");
    }
    assert_eq!(router.provider_stats()["primary"].budget.remaining_cents, 0);

    // Third call skips the exhausted primary without contacting it
    let response = router.generate(&request).await.unwrap();
    assert_eq!(response.provider, "backup");
    assert_eq!(primary.completion_count(), 2);
}

#[tokio::test]
async fn reset_restores_governance_state() {
    let primary = MockLlm::start().await.unwrap();

    let config = ConfigBuilder::new()
        .with_openai_provider("primary", &primary.base_url())
        .with_budget("primary", 2)
        .build();
    let router = Router::from_config(&config).unwrap();

    let request = GenerationRequest::from_prompt("Hello").with_max_tokens(100);
    for _ in 0..2 {
        router.generate(&request).await.unwrap();
    }
    assert_eq!(router.provider_stats()["primary"].budget.remaining_cents, 0);

    router.reset();

    assert_eq!(router.provider_stats()["primary"].budget.remaining_cents, 2);
    router.generate(&request).await.unwrap();
}

#[tokio::test]
async fn stats_snapshot_is_json_serializable() {
    let primary = MockLlm::start().await.unwrap();

    let config = ConfigBuilder::new()
        .with_openai_provider("primary", &primary.base_url())
        .build();
    let router = Router::from_config(&config).unwrap();

    router
        .generate(&GenerationRequest::from_prompt("Hello"))
        .await
        .unwrap();

    let stats = router.provider_stats();
    let json = serde_json::to_value(&stats).unwrap();

    assert_eq!(json["primary"]["enabled"], true);
    assert_eq!(json["primary"]["healthy"], true);
    assert_eq!(json["primary"]["circuit_breaker"]["status"], "closed");
    assert_eq!(json["primary"]["circuit_breaker"]["failure_count"], 0);
    assert_eq!(json["primary"]["budget"]["spent_cents"], 1);
    assert_eq!(json["primary"]["supported_models"][0], "mock-model-1");
}

#[tokio::test]
async fn concurrent_callers_share_one_budget() {
    let primary = MockLlm::start().await.unwrap();

    // 1 cent per call; enough budget for at most 3 of the 8 callers
    let config = ConfigBuilder::new()
        .with_openai_provider("primary", &primary.base_url())
        .with_budget("primary", 3)
        .build();
    let router = std::sync::Arc::new(Router::from_config(&config).unwrap());

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let router = std::sync::Arc::clone(&router);
        tasks.push(tokio::spawn(async move {
            let request = GenerationRequest::from_prompt("Hello").with_max_tokens(100);
            router.generate(&request).await.is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    // The accepted debits can never exceed the 3-cent ceiling
    assert!(successes <= 3);
    assert!(router.provider_stats()["primary"].budget.spent_cents <= 3);
}

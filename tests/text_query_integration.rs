//! End-to-end Text Query flow over in-memory services

mod common;

use std::sync::Arc;

use common::{passage, ready_context, web, CannedSearch, FixedStore, RecordingModel};
use medquery::config::{Config, Credentials};
use medquery::pages::{
    run_image_analysis, run_text_query, AppContext, PipelineState, Severity, TextQueryOutcome,
};
use medquery::search::format_web_sources;

#[tokio::test]
async fn test_empty_query_makes_no_calls() {
    let store = Arc::new(FixedStore::new(vec![passage(0, "unused")]));
    let model = Arc::new(RecordingModel::new("unused"));
    let search = Arc::new(CannedSearch::new(vec![]));
    let ctx = ready_context(store.clone(), model.clone(), search.clone());

    for query in ["", "   ", "\t\n"] {
        let outcome = run_text_query(&ctx, query).await;
        assert!(matches!(outcome, TextQueryOutcome::EmptyQuery));
        assert_eq!(outcome.severity(), Severity::Warning);
    }

    assert_eq!(search.query_count(), 0);
    assert_eq!(store.query_count(), 0);
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_no_web_results_uses_sentinel() {
    let store = Arc::new(FixedStore::new(vec![passage(0, "Influenza is a viral infection.")]));
    let model = Arc::new(RecordingModel::new("Rest and fluids."));
    let search = Arc::new(CannedSearch::new(vec![]));
    let ctx = ready_context(store, model.clone(), search);

    let outcome = run_text_query(&ctx, "How is the flu treated?").await;
    assert!(matches!(outcome, TextQueryOutcome::Answered(_)));

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(
        "Question: How is the flu treated?\n\nAdditional Context: No external sources found."
    ));
    assert!(prompts[0].contains("Context: Influenza is a viral infection."));
}

#[tokio::test]
async fn test_migraine_scenario() {
    let results: Vec<_> = (1..=7)
        .map(|i| {
            web(
                &format!("Migraine source {}", i),
                &format!("https://www.mayoclinic.org/migraine/{}", i),
                "Migraine is a headache that can cause severe throbbing pain.",
            )
        })
        .collect();
    let passages = vec![
        passage(0, "Migraine is a primary headache disorder."),
        passage(1, "Triggers include stress, hormonal changes and certain foods."),
        passage(2, "Aura may precede the headache phase."),
        passage(3, "This fourth passage is beyond the retrieval limit."),
    ];
    let store = Arc::new(FixedStore::new(passages));
    let model = Arc::new(RecordingModel::new("Migraines have genetic and environmental causes."));
    let search = Arc::new(CannedSearch::new(results.clone()));
    let ctx = ready_context(store.clone(), model.clone(), search.clone());

    let outcome = run_text_query(&ctx, "What causes a migraine?").await;
    let TextQueryOutcome::Answered(answer) = &outcome else {
        panic!("expected an answer, got {:?}", outcome);
    };

    // Search sees the raw question, retrieval is capped at three passages.
    assert_eq!(*search.queries.lock().unwrap(), vec!["What causes a migraine?".to_string()]);
    assert_eq!(answer.web_sources.len(), 5);
    assert_eq!(answer.passages.len(), 3);
    assert_eq!(*store.queries.lock().unwrap(), vec![(384, 3)]);

    let block = format_web_sources(&results[..5]);
    let prompt = &model.prompts()[0];
    assert!(prompt.contains("Question: What causes a migraine?"));
    assert!(prompt.contains(&block));
    assert!(prompt.contains(
        "Context: Migraine is a primary headache disorder.\n\nTriggers include stress, hormonal changes and certain foods.\n\nAura may precede the headache phase."
    ));
    assert!(!prompt.contains("fourth passage"));
    assert_eq!(&answer.prompt, prompt);

    let collapsed = outcome.render(200, false);
    assert_eq!(
        collapsed,
        "### Medical Insights\nMigraines have genetic and environmental causes.\n\n▸ Supporting Sources (collapsed)\n"
    );

    let mut expected = String::from(
        "### Medical Insights\nMigraines have genetic and environmental causes.\n\n▾ Supporting Sources\n#### Web Sources\n",
    );
    for i in 1..=5 {
        expected.push_str(&format!(
            "- **Migraine source {}**\n  https://www.mayoclinic.org/migraine/{}\n",
            i, i
        ));
    }
    expected.push_str("#### Knowledge Base Sources\n");
    expected.push_str("- Migraine is a primary headache disorder....\n");
    expected.push_str("- Triggers include stress, hormonal changes and certain foods....\n");
    expected.push_str("- Aura may precede the headache phase....\n");
    assert_eq!(outcome.render(200, true), expected);
}

#[tokio::test]
async fn test_search_failure_stops_before_generation() {
    let store = Arc::new(FixedStore::new(vec![passage(0, "unused")]));
    let model = Arc::new(RecordingModel::new("unused"));
    let mut search = CannedSearch::new(vec![]);
    search.fail_with = Some("connection reset".to_string());
    let ctx = ready_context(store.clone(), model.clone(), Arc::new(search));

    let outcome = run_text_query(&ctx, "Is aspirin safe?").await;
    assert_eq!(
        outcome.render(200, false),
        "An error occurred: Web search error: connection reset"
    );
    assert_eq!(store.query_count(), 0);
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_initialization_failure_is_graceful_on_both_pages() {
    // No credentials: initialization fails but the context is still usable.
    let config = Config::default();
    let state = PipelineState::initialize(&config, &Credentials::default()).await;
    assert!(state
        .error_banner()
        .unwrap()
        .starts_with("RAG Pipeline Initialization Error: "));

    let search = Arc::new(CannedSearch::new(vec![web("t", "https://www.nih.gov/x", "s")]));
    let ctx = AppContext::new(config, state, search.clone());

    let text = run_text_query(&ctx, "What is hypertension?").await;
    assert!(matches!(text, TextQueryOutcome::PipelineUnavailable));
    assert_eq!(text.render(200, false), "Could not initialize medical knowledge pipeline");
    assert_eq!(search.query_count(), 1);

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scan.png");
    image::DynamicImage::new_rgb8(8, 8).save(&path).unwrap();
    let image = run_image_analysis(&ctx, Some(&path), None).await;
    assert_eq!(
        image.render(),
        "Image analysis error: Could not initialize medical knowledge pipeline"
    );
    assert_eq!(image.severity(), Severity::Error);
}

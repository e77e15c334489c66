//! Sessions driven against the in-memory backend.

use paramlab_application::{
    BehaviorConfig, ExperimentSession, ExperimentsApi, NotificationStore, ParameterWorkbench,
};
use paramlab_domain::{
    Experiment, ExperimentPatch, GenerationConfig, NewExperiment, NotificationKind,
};
use paramlab_infrastructure::InMemoryResourceClient;
use std::sync::Arc;
use std::time::Duration;

fn sorted(mut experiments: Vec<Experiment>) -> Vec<Experiment> {
    experiments.sort_by(|a, b| a.id.cmp(&b.id));
    experiments
}

#[tokio::test(start_paused = true)]
async fn test_load_after_mutations_matches_backing_store() {
    let backend = Arc::new(InMemoryResourceClient::new());
    let session = ExperimentSession::new(backend.clone(), &BehaviorConfig::default());

    let mut created = Vec::new();
    for name in ["A", "B", "C", "D"] {
        let exp = session
            .create_experiment(&NewExperiment::new(name, format!("Prompt for {}", name)))
            .await
            .unwrap();
        created.push(exp.id);
    }
    session
        .update_experiment(&created[1], &ExperimentPatch::name("B2").with_prompt("Rewritten"))
        .await
        .unwrap();
    session.delete_experiment(&created[0]).await.unwrap();
    session.delete_experiment(&created[3]).await.unwrap();

    // local view already agrees by id set and content
    let store = backend.get_all().await.unwrap().experiments;
    assert_eq!(sorted(session.experiments()), sorted(store.clone()));

    let loaded = session.load_experiments().await.unwrap();
    assert_eq!(loaded, store);
    assert_eq!(session.experiments(), store);
    assert!(!session.loading());
    assert!(session.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_create_leaves_collection_and_clears_error_later() {
    let backend = Arc::new(InMemoryResourceClient::new());
    let session = ExperimentSession::new(backend.clone(), &BehaviorConfig::default());

    session
        .create_experiment(&NewExperiment::new("A", "first prompt"))
        .await
        .unwrap();

    backend.fail_next("quota exceeded");
    let err = session
        .create_experiment(&NewExperiment::new("B", "second prompt"))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "quota exceeded");
    assert_eq!(session.experiments().len(), 1);
    assert_eq!(session.error().as_deref(), Some("quota exceeded"));

    tokio::time::sleep(Duration::from_millis(5001)).await;
    assert!(session.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_loading_spans_backend_latency() {
    let backend = Arc::new(InMemoryResourceClient::new().with_latency(Duration::from_millis(200)));
    let session = ExperimentSession::new(backend, &BehaviorConfig::default());

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.load_experiments().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(session.loading());

    let loaded = pending.await.unwrap();
    assert_eq!(loaded, Some(Vec::new()));
    assert!(!session.loading());
}

#[tokio::test(start_paused = true)]
async fn test_workbench_runs_offline() {
    let backend = Arc::new(InMemoryResourceClient::new());
    let workbench = ParameterWorkbench::new(
        backend,
        NotificationStore::default(),
        &BehaviorConfig::default(),
    );
    workbench.apply_preset("precise").unwrap();

    let run = workbench
        .run("Tides", "Explain ocean tides to a child", &GenerationConfig::new(3))
        .await
        .unwrap();
    assert_eq!(run.experiment.responses.len(), 3);
    assert_eq!(run.metrics.len(), 3);

    let ids = run.experiment.response_ids();
    let comparison = workbench.compare(&ids).await.unwrap();
    assert!(ids.contains(comparison.best_response_id.as_ref().unwrap()));

    let kinds: Vec<_> = workbench
        .notifications()
        .notifications()
        .iter()
        .map(|n| n.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Success,
            NotificationKind::Success,
            NotificationKind::Info
        ]
    );
}

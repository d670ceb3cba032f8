//! Verifies the timing histograms the engine emits through the `metrics`
//! facade, using a thread-local capturing recorder.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use rulegate_engine::{DefaultResultsRepository, Policy, PolicyManager, Rule};
use rulegate_types::ids::{METRIC_POLICY_DURATION_MS, METRIC_RULE_DURATION_MS};

#[derive(Clone, Default)]
struct CapturingRecorder {
    histograms: Arc<Mutex<Vec<Key>>>,
}

impl Recorder for CapturingRecorder {
    fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
    fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

    fn register_counter(&self, _: &Key, _: &Metadata<'_>) -> Counter {
        Counter::noop()
    }

    fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _: &Metadata<'_>) -> Histogram {
        self.histograms.lock().unwrap().push(key.clone());
        Histogram::noop()
    }
}

impl CapturingRecorder {
    fn keys(&self) -> Vec<Key> {
        self.histograms.lock().unwrap().clone()
    }
}

fn test_policy() -> Policy<String> {
    Policy::builder("P001", "test policy")
        .rule(Rule::new("R001", "rule1", |_: &String, _| {
            async { Ok(true) }.boxed()
        }))
        .rule(Rule::new("R002", "rule2", |_: &String, _| {
            async { Ok(false) }.boxed()
        }))
        .build()
}

fn label_value<'a>(key: &'a Key, label: &str) -> Option<&'a str> {
    key.labels()
        .find(|l| l.key() == label)
        .map(|l| l.value())
}

fn run_with_recorder<F: FnOnce()>(recorder: &CapturingRecorder, f: F) {
    metrics::with_local_recorder(recorder, f);
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
        .block_on(future)
}

#[test]
fn policy_execution_records_policy_and_rule_histograms() {
    let recorder = CapturingRecorder::default();

    run_with_recorder(&recorder, || {
        block_on(async {
            let manager = PolicyManager::new(test_policy(), Arc::new(DefaultResultsRepository));
            manager
                .execute_policy(
                    "corr-1",
                    Uuid::new_v4(),
                    &"input".to_string(),
                    CancellationToken::new(),
                )
                .await;
        });
    });

    let keys = recorder.keys();

    let policy_keys: Vec<_> = keys
        .iter()
        .filter(|k| k.name() == METRIC_POLICY_DURATION_MS)
        .collect();
    assert_eq!(policy_keys.len(), 1);
    assert_eq!(label_value(policy_keys[0], "policy_id"), Some("P001"));

    let rule_ids: Vec<_> = keys
        .iter()
        .filter(|k| k.name() == METRIC_RULE_DURATION_MS)
        .map(|k| label_value(k, "rule_id").unwrap().to_string())
        .collect();
    assert_eq!(rule_ids, ["R001", "R002"]);
}

#[test]
fn single_rule_execution_records_no_policy_histogram() {
    let recorder = CapturingRecorder::default();

    run_with_recorder(&recorder, || {
        block_on(async {
            let manager = PolicyManager::new(test_policy(), Arc::new(DefaultResultsRepository));
            manager
                .execute_rule(
                    "R001",
                    "corr-1",
                    Uuid::new_v4(),
                    &"input".to_string(),
                    CancellationToken::new(),
                )
                .await
                .unwrap();
        });
    });

    let keys = recorder.keys();
    assert!(keys.iter().all(|k| k.name() != METRIC_POLICY_DURATION_MS));

    let rule_keys: Vec<_> = keys
        .iter()
        .filter(|k| k.name() == METRIC_RULE_DURATION_MS)
        .collect();
    assert_eq!(rule_keys.len(), 1);
    assert_eq!(label_value(rule_keys[0], "policy_id"), Some("P001"));
    assert_eq!(label_value(rule_keys[0], "rule_id"), Some("R001"));
}

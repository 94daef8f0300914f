//! Integration tests for uado.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::too_many_lines,
    clippy::uninlined_format_args
)]

use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use uado::Error;
use uado::config::{PromptMode, UadoConfig};
use uado::cooldown::{CooldownConfig, CooldownEngine};
use uado::models::{ChurnKind, CooldownEvent, PatternEntry, Signal};
use uado::orchestrator::PromptOrchestrator;
use uado::services::{ContentHasher, explain_pattern, find_best_matches, inject_examples};
use uado::signals::lsp::scan_tsserver_output;
use uado::signals::{RecordingSink, forward_signals};
use uado::storage::{PatternStore, SnapshotStore};

const TSSERVER_BUSY: &str = "\
Info 1    [10:00:00.000] request: open
Info 2    [10:00:00.010] Starting updateGraphWorker: Project: /app/tsconfig.json
";

const TSSERVER_READY: &str = "\
Perf 3    [10:00:01.500] Finishing updateGraphWorker: Project: /app/tsconfig.json Version: 2
Info 4    [10:00:01.600] response: ok
";

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::OperationFailed {
        operation: "read".to_string(),
        cause: "file not found".to_string(),
    };
    let display = format!("{err}");
    assert!(display.contains("read"));
    assert!(display.contains("file not found"));
}

#[test]
fn test_logged_patterns_rank_and_inject() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(dir.path());

    for (prompt, file, tag) in [
        ("Create a React button", "src/Button.tsx", "react-component"),
        ("Create React header", "src/Header.tsx", "react-component"),
        ("Utility fn", "src/util.ts", "utility"),
    ] {
        let entry = PatternEntry::new(prompt, file, "export default ...").with_tag(tag);
        assert!(store.log_pattern(entry).unwrap());
    }

    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), 3);

    let query = "Build a react button component";
    let best = find_best_matches(query, &entries, 3);
    assert_eq!(best[0].prompt, "Create a React button");
    assert_eq!(best.len(), 2, "the utility entry shares no tokens");

    let prompt = inject_examples(query, &best[..1]);
    assert!(prompt.contains("Prompt: Create a React button"));
    assert!(prompt.ends_with(query));
    assert!(explain_pattern(best[0]).contains("React component"));
}

#[test]
fn test_pattern_hash_is_raw_prompt_digest() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(dir.path());
    store
        .log_pattern(PatternEntry::new("Create a React button", "src/Button.tsx", "export"))
        .unwrap();

    let stored = store.entries().unwrap().remove(0);
    assert_eq!(
        stored.hash.as_deref(),
        Some("23640b4666f8a64c417a25ea7e9c93e308e258b0988db23daf5fbf1c4dd30593")
    );
    assert_eq!(stored.content_hash(), ContentHasher::hash_raw("Create a React button"));
}

#[test]
fn test_equal_scores_keep_file_order() {
    let dir = TempDir::new().unwrap();
    let store = PatternStore::new(dir.path());
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(
        store.path(),
        r#"{"zeta":[{"prompt":"react button","file":"z.ts","outputSnippet":"z"}],
            "alpha":[{"prompt":"react button","file":"a.ts","outputSnippet":"a"}]}"#,
    )
    .unwrap();

    let entries = store.entries().unwrap();
    let best = find_best_matches("react button", &entries, 1);
    assert_eq!(best[0].file, "z.ts");
}

#[test]
fn test_snapshot_is_found_by_content_hash() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());
    let content = "export const answer = 42;\n";

    let path = store.save(content).unwrap();
    let hash = ContentHasher::hash_text(content);

    assert!(path.starts_with(dir.path().join(".uado").join("snapshots")));
    assert_eq!(store.find(&hash).unwrap(), Some(path));
}

#[test]
fn test_config_file_drives_cooldown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".uadorc.json");
    std::fs::write(
        &path,
        r#"{
            "cooldownDurationMs": 2000,
            "stabilityWindowMs": 250,
            "mode": "manual",
            "enablePatternInjection": true,
            "patternTopN": 5
        }"#,
    )
    .unwrap();

    let config = UadoConfig::load_from_file(&path).unwrap();
    assert_eq!(config.mode, PromptMode::Manual);
    assert_eq!(config.pattern_top_n, 5);
    assert_eq!(
        config.cooldown,
        CooldownConfig::default()
            .with_timeout(Duration::from_millis(2000))
            .with_stable_window(Duration::from_millis(250))
    );
}

#[tokio::test(start_paused = true)]
async fn test_busy_language_server_defers_prompt() {
    let engine = CooldownEngine::new(CooldownConfig::from_millis(Some(1_000), Some(50)));
    let orchestrator = PromptOrchestrator::new(engine.clone());
    let mut events = engine.subscribe();

    let dispatched = scan_tsserver_output(TSSERVER_BUSY.as_bytes(), &engine)
        .await
        .unwrap();
    assert_eq!(dispatched, 1);
    assert!(engine.is_active());

    let reply = tokio::spawn(orchestrator.wrap_prompt(|| async { "submitted" }));
    assert_eq!(orchestrator.queue_len(), 1);

    scan_tsserver_output(TSSERVER_READY.as_bytes(), &engine)
        .await
        .unwrap();
    assert_eq!(reply.await.unwrap(), "submitted");

    assert_eq!(events.recv().await.unwrap(), CooldownEvent::Active);
    assert!(events.recv().await.unwrap().is_ended());
}

#[tokio::test(start_paused = true)]
async fn test_channel_source_feeds_engine() {
    let engine = CooldownEngine::new(CooldownConfig::from_millis(Some(1_000), Some(20)));
    let (tx, rx) = mpsc::channel(8);

    tx.send(Signal::Churn(ChurnKind::FileChanged)).await.unwrap();
    tx.send(Signal::StabilityHint).await.unwrap();
    drop(tx);

    assert_eq!(forward_signals(rx, &engine).await, 2);
    assert!(engine.is_active());

    tokio::time::sleep(Duration::from_millis(21)).await;
    assert!(!engine.is_active());
}

#[tokio::test]
async fn test_recording_sink_sees_tsserver_signals() {
    let sink = RecordingSink::new();
    let log = format!("{TSSERVER_BUSY}{TSSERVER_READY}");

    scan_tsserver_output(log.as_bytes(), &sink).await.unwrap();

    assert_eq!(
        sink.signals(),
        vec![Signal::Churn(ChurnKind::LspBusy), Signal::StabilityHint]
    );
}

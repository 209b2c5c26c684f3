use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::tempdir;

#[test]
fn help_lists_every_command() {
    let mut cmd = Command::cargo_bin("contentful-audit").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert().success().stdout(
        predicate::str::contains("duplicate-titles")
            .and(predicate::str::contains("published-status"))
            .and(predicate::str::contains("compare-models"))
            .and(predicate::str::contains("remove-first-line"))
            .and(predicate::str::contains("compare-lists")),
    );
}

#[test]
fn compare_lists_prints_missing_ids() {
    let dir = tempdir().expect("temp dir");
    let first = dir.path().join("all.txt");
    let second = dir.path().join("published.txt");
    write(&first, "page-a\npage-b\npage-c\n").expect("write first list");
    write(&second, "page-b\n").expect("write second list");

    let mut cmd = Command::cargo_bin("contentful-audit").expect("Binary exists");
    cmd.current_dir(dir.path())
        .arg("compare-lists")
        .arg("--first")
        .arg(&first)
        .arg("--second")
        .arg(&second);

    cmd.assert().success().stdout(
        predicate::str::contains("Ids missing from")
            .and(predicate::str::contains("page-a"))
            .and(predicate::str::contains("page-c"))
            .and(predicate::str::contains(": 2")),
    );
}

#[test]
fn duplicate_titles_without_credentials_fails_with_variable_name() {
    let dir = tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("contentful-audit").expect("Binary exists");
    cmd.current_dir(dir.path())
        .arg("duplicate-titles")
        .env_remove("CONTENTFUL_SPACE_ID")
        .env_remove("CONTENTFUL_ENVIRONMENT_ID")
        .env_remove("CONTENTFUL_DELIVERY_TOKEN");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CONTENTFUL_SPACE_ID"));
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("audit.yaml");
    write(&config, "page_size: [not, a, number]\n").expect("write config");

    let mut cmd = Command::cargo_bin("contentful-audit").expect("Binary exists");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("compare-lists")
        .arg("--first")
        .arg("a.txt")
        .arg("--second")
        .arg("b.txt");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config YAML"));
}

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

/// Keeps the `message` of every event, in emission order.
#[derive(Clone, Default)]
struct MessageLog(Arc<Mutex<Vec<String>>>);

struct MessageField<'a>(&'a mut String);

impl Visit for MessageField<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.0, "{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for MessageLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageField(&mut message));
        self.0.lock().unwrap().push(message);
    }
}

#[tokio::test]
async fn run_starts_with_trace_initialised_even_when_the_command_fails() {
    use contentful_audit::cli::{run, Cli, Commands};

    let log = MessageLog::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(log.clone()));

    let cli = Cli {
        config: None,
        command: Commands::CompareLists {
            first: std::path::PathBuf::from("missing-first.txt"),
            second: std::path::PathBuf::from("missing-second.txt"),
        },
    };
    assert!(run(cli).await.is_err());

    let messages = log.0.lock().unwrap();
    assert_eq!(messages.first().map(String::as_str), Some("trace_initialised"));
    assert!(
        messages.iter().any(|m| m == "Comparing id lists"),
        "got: {messages:?}"
    );
}

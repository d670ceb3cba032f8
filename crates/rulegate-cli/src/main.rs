//! CLI entry point for rulegate.
//!
//! This binary is intentionally thin: it handles argument parsing, I/O, and
//! exit codes. Evaluation lives in `rulegate-engine`; the policy it runs is
//! the sample mortgage policy from `rulegate-samples`.

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use time::OffsetDateTime;
use uuid::Uuid;

use rulegate_engine::{
    CancellationToken, DefaultResultsRepository, NestedLookup, PolicyManager,
};
use rulegate_samples::{mortgage_lookups, mortgage_policy, MortgageApplication};
use rulegate_types::ids::{SCHEMA_REPORT_V1, TOOL_NAME};
use rulegate_types::{ReportEnvelope, ToolMeta};

#[derive(Parser, Debug)]
#[command(
    name = "rulegate",
    version,
    about = "Evaluate the sample mortgage policy and emit an execution report"
)]
struct Cli {
    /// Path to the mortgage application JSON file.
    #[arg(long)]
    input: Utf8PathBuf,

    /// TOML file overriding threshold lookups, e.g. `[Default.FTB]` with
    /// `MinLoan = 150000`.
    #[arg(long)]
    lookups: Option<Utf8PathBuf>,

    /// Correlation id attached to the execution; generated when omitted.
    #[arg(long)]
    correlation_id: Option<String>,

    /// Cancel in-flight rule checks after this many milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the whole policy and write a JSON report artifact.
    Evaluate {
        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/rulegate/report.json")]
        report_out: Utf8PathBuf,
    },

    /// Evaluate a single rule by id and print its result to stdout.
    Rule { rule_id: String },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("rulegate: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let input = fs::read_to_string(&cli.input)
        .with_context(|| format!("read application file {}", cli.input))?;
    let application: MortgageApplication =
        serde_json::from_str(&input).context("parse application JSON")?;

    let lookups = mortgage_lookups();
    if let Some(path) = &cli.lookups {
        let text =
            fs::read_to_string(path).with_context(|| format!("read lookups file {path}"))?;
        apply_lookup_overrides(&lookups, &text).context("apply lookup overrides")?;
    }

    let policy = mortgage_policy(Arc::new(lookups));
    let manager = PolicyManager::new(policy, Arc::new(DefaultResultsRepository));

    let correlation_id = cli
        .correlation_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let execution_context_id = Uuid::new_v4();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("build tokio runtime")?;

    runtime.block_on(async {
        let token = CancellationToken::new();
        if let Some(timeout_ms) = cli.timeout_ms {
            let deadline = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
                deadline.cancel();
            });
        }

        match &cli.cmd {
            Commands::Evaluate { report_out } => {
                let started_at = OffsetDateTime::now_utc();
                let result = manager
                    .execute_policy(&correlation_id, execution_context_id, &application, token)
                    .await;
                let finished_at = OffsetDateTime::now_utc();

                for rule in &result.rule_execution_results {
                    let verdict = if rule.passed { "pass" } else { "fail" };
                    match &rule.message {
                        Some(message) => {
                            println!("[{}] {}: {verdict} ({message})", rule.id, rule.name)
                        }
                        None => println!("[{}] {}: {verdict}", rule.id, rule.name),
                    }
                }

                let envelope = ReportEnvelope {
                    schema: SCHEMA_REPORT_V1.to_string(),
                    tool: ToolMeta {
                        name: TOOL_NAME.to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                    started_at,
                    finished_at,
                    result,
                };

                if let Some(parent) = report_out.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("create report directory {parent}"))?;
                }
                let mut json =
                    serde_json::to_string_pretty(&envelope).context("serialize report")?;
                json.push('\n');
                fs::write(report_out, json)
                    .with_context(|| format!("write report to {report_out}"))?;

                let verdict = if envelope.result.passed {
                    "passed"
                } else {
                    "failed"
                };
                println!("{}: {verdict}", envelope.result.policy_name);

                Ok(exit_code(envelope.result.passed))
            }
            Commands::Rule { rule_id } => {
                let result = manager
                    .execute_rule(
                        rule_id,
                        &correlation_id,
                        execution_context_id,
                        &application,
                        token,
                    )
                    .await?;

                println!("{}", serde_json::to_string_pretty(&result)?);

                Ok(exit_code(result.passed))
            }
        }
    })
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Applies nested TOML tables onto the threshold lookup: every scalar leaf
/// overwrites the value at its table path.
fn apply_lookup_overrides(lookups: &NestedLookup<String>, text: &str) -> anyhow::Result<()> {
    let value: toml::Value = toml::from_str(text).context("parse TOML")?;
    let toml::Value::Table(table) = value else {
        anyhow::bail!("overrides must be a TOML table");
    };

    let mut path = Vec::new();
    apply_table(lookups, &mut path, &table)
}

fn apply_table(
    lookups: &NestedLookup<String>,
    path: &mut Vec<String>,
    table: &toml::Table,
) -> anyhow::Result<()> {
    for (key, value) in table {
        path.push(key.clone());
        match value {
            toml::Value::Table(nested) => apply_table(lookups, path, nested)?,
            toml::Value::Integer(v) => lookups.insert(path.iter().cloned(), *v)?,
            toml::Value::Float(v) => lookups.insert(path.iter().cloned(), *v)?,
            toml::Value::Boolean(v) => lookups.insert(path.iter().cloned(), *v)?,
            toml::Value::String(v) => lookups.insert(path.iter().cloned(), v.clone())?,
            _ => anyhow::bail!("unsupported override value at [{}]", path.join(".")),
        }
        path.pop();
    }
    Ok(())
}

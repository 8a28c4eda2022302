//! Command handlers for the CLI.

use chrono::Utc;
use pulsecheck_core::Cadence;
use pulsecheck_monitor::{
    analyze_subject, get_trend, is_due, run_monitoring_sweep, AnalyzeOutcome, MonitorDeps,
};
use uuid::Uuid;

/// Run an interactive analysis and print the result.
///
/// # Errors
///
/// Returns an error for an invalid subject; retrieval and classification
/// problems degrade to "no data" instead of failing the command.
pub(crate) async fn run_analyze(
    deps: &MonitorDeps,
    subject: &str,
    owner: Option<Uuid>,
    json: bool,
) -> anyhow::Result<()> {
    match analyze_subject(deps, subject, owner, Utc::now()).await? {
        AnalyzeOutcome::NoData => {
            println!("no recent mentions found for '{subject}'");
        }
        AnalyzeOutcome::Completed {
            summary,
            save_error,
        } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{}: {} ({}% positive / {}% negative / {}% neutral, {} analyzed)",
                    summary.subject,
                    summary.overall,
                    summary.positive_ratio,
                    summary.negative_ratio,
                    summary.neutral_ratio,
                    summary.total_analyzed,
                );
                if !summary.key_themes.is_empty() {
                    println!("themes: {}", summary.key_themes.join(", "));
                }
                println!("{}", summary.narrative);
            }
            if let Some(e) = save_error {
                eprintln!("warning: summary computed but not fully saved: {e}");
            }
        }
    }
    Ok(())
}

/// Print a subject's recent trend points, most recent first.
///
/// # Errors
///
/// Returns an error for an invalid subject or a failed store read.
pub(crate) async fn run_trend(
    deps: &MonitorDeps,
    subject: &str,
    limit: i64,
) -> anyhow::Result<()> {
    let points = get_trend(deps, subject, Some(limit)).await?;
    if points.is_empty() {
        println!("no trend history for '{subject}'");
        return Ok(());
    }
    for point in &points {
        println!(
            "{}  score={:<3}  +{}% / -{}% / ={}%  ({} mentions)",
            point.recorded_at.format("%Y-%m-%d %H:%M"),
            point.overall_score,
            point.positive_ratio,
            point.negative_ratio,
            point.neutral_ratio,
            point.total_count,
        );
    }
    Ok(())
}

/// Run (or preview) the monitoring sweep.
///
/// # Errors
///
/// Returns an error if the active-subscription list cannot be loaded.
/// Per-subscription failures stay inside the printed report.
pub(crate) async fn run_sweep(deps: &MonitorDeps, dry_run: bool) -> anyhow::Result<()> {
    if dry_run {
        let subscriptions = deps.subscriptions.list_active().await?;
        let now = Utc::now();
        let due: Vec<&str> = subscriptions
            .iter()
            .filter(|s| {
                s.cadence
                    .parse::<Cadence>()
                    .map(|c| is_due(c, s.last_run_at, now))
                    .unwrap_or(false)
            })
            .map(|s| s.subject.as_str())
            .collect();
        println!(
            "dry-run: {} active subscriptions, {} due: [{}]",
            subscriptions.len(),
            due.len(),
            due.join(", ")
        );
        return Ok(());
    }

    let report = run_monitoring_sweep(deps).await?;
    if report.failed() > 0 {
        tracing::warn!(
            failed = report.failed(),
            total = report.outcomes.len(),
            "some subscriptions failed during the sweep"
        );
    }
    println!(
        "sweep complete: {} subscriptions, {} completed, {} no-data, {} not due, {} failed",
        report.outcomes.len(),
        report.completed(),
        report.no_data(),
        report.not_due(),
        report.failed(),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Cli, Commands};

    #[test]
    fn parses_analyze_with_subject() {
        let cli = Cli::try_parse_from(["pulsecheck-cli", "analyze", "Fizzy Cola"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Analyze {
                ref subject,
                owner: None,
                json: false,
            } if subject == "Fizzy Cola"
        ));
    }

    #[test]
    fn parses_analyze_with_owner_and_json() {
        let owner = "2d4f0f0a-8a7b-4f6e-9b1a-111111111111";
        let cli = Cli::try_parse_from([
            "pulsecheck-cli",
            "analyze",
            "Fizzy Cola",
            "--owner",
            owner,
            "--json",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Analyze {
                owner: Some(_),
                json: true,
                ..
            }
        ));
    }

    #[test]
    fn parses_trend_with_default_limit() {
        let cli = Cli::try_parse_from(["pulsecheck-cli", "trend", "Fizzy Cola"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Trend { limit: 30, .. }
        ));
    }

    #[test]
    fn parses_trend_with_limit_override() {
        let cli =
            Cli::try_parse_from(["pulsecheck-cli", "trend", "Fizzy Cola", "--limit", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Trend { limit: 7, .. }));
    }

    #[test]
    fn parses_sweep_defaults() {
        let cli = Cli::try_parse_from(["pulsecheck-cli", "sweep"]).unwrap();
        assert!(matches!(cli.command, Commands::Sweep { dry_run: false }));
    }

    #[test]
    fn parses_sweep_dry_run() {
        let cli = Cli::try_parse_from(["pulsecheck-cli", "sweep", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Sweep { dry_run: true }));
    }

    #[test]
    fn rejects_missing_subject() {
        assert!(Cli::try_parse_from(["pulsecheck-cli", "analyze"]).is_err());
    }
}

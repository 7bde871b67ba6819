use std::fmt::Write;

use colored::*;

use crate::models::metrics::RunSummary;
use crate::models::outcome::RequestOutcome;

/// One console line per finished request.
pub fn status_line(outcome: &RequestOutcome) -> String {
    let id = format!("request #{}", outcome.request_id());
    match (outcome.item_count(), outcome.error()) {
        (Some(items), _) => format!(
            "{} {} {} {} {}",
            id.bold(),
            "OK".green().bold(),
            format!("| items : {}", items).bold(),
            "| duration :".blue().bold(),
            format!("{:.4}s", outcome.duration().unwrap_or(0.0)).bold()
        ),
        (None, Some(err)) => format!(
            "{} {} {}",
            id.bold(),
            "FAILED".red().bold(),
            format!("- {}", err).red()
        ),
        (None, None) => format!("{} {}", id.bold(), "FAILED".red().bold()),
    }
}

pub fn render(summary: &RunSummary) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "======== SUMMARY ========".bold().white().on_blue());
    let _ = writeln!(
        out,
        "{} {:.4} seconds",
        format!("Total time for {} requests :", summary.total_requests).bold(),
        summary.total_wall_time
    );
    let _ = writeln!(out, "{} {}", "Succeeded                 :".green().bold(), summary.succeeded);
    let _ = writeln!(out, "{} {}", "Failed                    :".red().bold(), summary.failed);

    if summary.total_requests == 0 {
        let _ = writeln!(out, "{}", "No requests were issued.".yellow().bold());
        return out;
    }

    match summary.average_success_latency {
        Some(avg) => {
            let _ = writeln!(out, "{} {:.4} seconds", "Average time per request  :".bold(), avg);
            if let (Some(fastest), Some(slowest), Some(median)) = (
                summary.fastest_response,
                summary.slowest_response,
                summary.median_response_time,
            ) {
                let _ = writeln!(
                    out,
                    "{} {:.4} seconds",
                    "Fastest response          :".cyan().bold(),
                    fastest
                );
                let _ = writeln!(
                    out,
                    "{} {:.4} seconds",
                    "Slowest response          :".yellow().bold(),
                    slowest
                );
                let _ = writeln!(
                    out,
                    "{} {:.4} seconds",
                    "Median response           :".magenta().bold(),
                    median
                );
            }
        }
        None => {
            let _ = writeln!(out, "{}", "All requests failed.".red().bold());
        }
    }
    let _ = writeln!(
        out,
        "{} {:.2}",
        "Requests per second (RPS) :".blue().bold(),
        summary.throughput
    );

    if !summary.failure_counts.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "======== FAILURES BY CAUSE ========".bold().white().on_red());
        for (cause, count) in &summary.failure_counts {
            let _ = writeln!(out, "• {}: {}", cause, count);
        }
    }

    out
}

pub fn render_json(summary: &RunSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}

//! Outcome, code panel and menu rendering.

use crate::models::{ReviewCategory, ReviewOutcome, ReviewResult};
use console::{measure_text_width, style};
use serde_json::Value;

/// Welcome banner shown once per session.
pub fn welcome_banner() -> String {
    let lines = [
        style("Code Review Assistant").bold().blue().to_string(),
        "An AI-powered tool for code review and analysis".to_string(),
        String::new(),
        style("Note: This tool uses rate-limited APIs. Please be patient between requests.")
            .yellow()
            .to_string(),
    ];
    boxed("Welcome", &lines)
}

/// The review type menu, one entry per line.
pub fn menu() -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", style("Available Review Types:").bold()));
    for (index, category) in ReviewCategory::ALL.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", index + 1, menu_label(*category)));
    }
    output.push_str(&format!("{}. Exit\n", ReviewCategory::ALL.len() + 1));
    output
}

fn menu_label(category: ReviewCategory) -> &'static str {
    match category {
        ReviewCategory::General => "General Review (code quality, bugs, best practices)",
        ReviewCategory::Security => "Security Review (vulnerabilities, input validation)",
        ReviewCategory::Performance => "Performance Review (complexity, optimization)",
    }
}

/// The snippet inside a bordered "Code to Review" panel.
pub fn code_panel(code: &str, language: &str) -> String {
    let lines: Vec<String> = code.lines().map(String::from).collect();
    boxed(&format!("Code to Review ({})", language), &lines)
}

/// Render a terminal outcome.
pub fn outcome(outcome: &ReviewOutcome) -> String {
    match outcome {
        ReviewOutcome::Success { payload } => review_result(payload),
        ReviewOutcome::Failed { message } => {
            format!("\n{} {}\n", style("Error:").red(), message)
        }
        ReviewOutcome::RateLimited { attempts_used } => format!(
            "\n{}\n{}\n",
            style(format!(
                "Maximum retries reached ({} retries). Please try again later.",
                attempts_used
            ))
            .red(),
            style("Tip: Wait at least 5 minutes before trying again to avoid rate limits.")
                .yellow()
        ),
    }
}

/// Render a successful review: state, then each output.
///
/// Outputs holding a JSON object are expanded key by key; anything else is
/// printed as a bullet.
pub fn review_result(result: &ReviewResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} {}\n", style("Review State:").bold(), result.state));
    output.push_str(&format!("\n{}\n", style("Review Results:").bold()));

    for item in &result.outputs {
        match serde_json::from_str::<Value>(&item.value) {
            Ok(Value::Object(map)) => {
                for (key, value) in map {
                    output.push_str(&format!("\n{}\n", style(format!("{}:", key)).bold()));
                    output.push_str(&json_text(&value));
                    output.push('\n');
                }
            }
            _ => output.push_str(&format!("- {}\n", item.value)),
        }
    }

    output.push_str(&format!(
        "\n{}\n",
        style(format!(
            "Reviewed by {} at {}",
            result.model_used,
            result.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ))
        .dim()
    ));

    output
}

/// Strings print bare, everything else as compact JSON.
fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Draw `lines` inside a rounded box with `title` in the top border.
fn boxed(title: &str, lines: &[String]) -> String {
    let content_width = lines
        .iter()
        .map(|line| measure_text_width(line))
        .max()
        .unwrap_or(0)
        .max(measure_text_width(title) + 2);

    let mut output = String::new();
    let title_fill = content_width + 2 - measure_text_width(title) - 2;
    output.push_str(&format!("╭─ {} {}╮\n", title, "─".repeat(title_fill.saturating_sub(1))));
    for line in lines {
        let pad = content_width - measure_text_width(line);
        output.push_str(&format!("│ {}{} │\n", line, " ".repeat(pad)));
    }
    output.push_str(&format!("╰{}╯\n", "─".repeat(content_width + 2)));
    output
}

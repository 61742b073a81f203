use chrono::{Datelike, Local};
use roomrate_core::{AppConfig, TriggerPolicy};
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: &'static str,
    trigger_keyword: String,
    booking_keyword: String,
    trigger_policy: &'static str,
    bracket_rules: usize,
    holiday_dates: usize,
    holiday_gap_for_current_year: bool,
}

/// Readiness report for an already-validated configuration. The holiday gap
/// check mirrors the load-time warning, surfaced here for operators.
pub fn run(config: &AppConfig, json: bool) -> CommandResult {
    let current_year = Local::now().year();
    let report = DoctorReport {
        status: "ok",
        trigger_keyword: config.conversation.trigger_keyword.clone(),
        booking_keyword: config.conversation.booking_keyword.clone(),
        trigger_policy: match config.conversation.trigger_policy {
            TriggerPolicy::Restart => "restart",
            TriggerPolicy::Ignore => "ignore",
        },
        bracket_rules: config.pricing.brackets.len(),
        holiday_dates: config.pricing.holidays.len(),
        holiday_gap_for_current_year: config.pricing.holiday_gap(current_year),
    };

    if json {
        return match serde_json::to_string_pretty(&report) {
            Ok(payload) => CommandResult::success(payload),
            Err(error) => CommandResult::failure(format!("could not render report: {error}"), 1),
        };
    }

    let mut lines = vec![
        format!("status: {}", report.status),
        format!("trigger keyword: {}", report.trigger_keyword),
        format!("booking keyword: {}", report.booking_keyword),
        format!("trigger policy: {}", report.trigger_policy),
        format!("bracket rules: {}", report.bracket_rules),
        format!("holiday dates: {}", report.holiday_dates),
    ];
    if report.holiday_gap_for_current_year {
        lines.push(format!("warning: no holiday dates configured for {current_year}"));
    }

    CommandResult::success(lines.join("\n"))
}

//! Cron expression handling.
//!
//! The coordinator speaks Quartz-style expressions with a leading seconds
//! field. Callers commonly hand in classic five-field Unix expressions, so
//! those are widened with a `0` seconds field before parsing, and their
//! numeric day-of-week field (0-7, Sunday = 0 or 7) is renumbered to the
//! `cron` crate's 1-7 with Sunday = 1.

use std::collections::BTreeSet;
use std::str::FromStr;

use cron::Schedule;

use crate::error::{CoreError, CoreResult};

/// Widen a five-field expression to six fields; pass others through trimmed.
pub fn normalize_cron(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.as_slice() {
        [minute, hour, day_of_month, month, day_of_week] => format!(
            "0 {minute} {hour} {day_of_month} {month} {}",
            unix_day_of_week(day_of_week)
        ),
        _ => fields.join(" "),
    }
}

/// Renumber a Unix day-of-week field. Numeric items (single days, ranges,
/// steps) are expanded and emitted as a sorted list; `*`, names and anything
/// unparseable are left for the `cron` parser to accept or reject.
fn unix_day_of_week(field: &str) -> String {
    if field == "*" || field == "?" {
        return field.to_string();
    }
    let mut days = BTreeSet::new();
    let mut verbatim = Vec::new();
    for item in field.split(',') {
        match expand_unix_days(item) {
            Some(expanded) => days.extend(expanded),
            None => verbatim.push(item),
        }
    }
    let mut items: Vec<String> = days.into_iter().map(|day| (day + 1).to_string()).collect();
    items.extend(verbatim.into_iter().map(str::to_string));
    items.join(",")
}

/// Unix days (0 = Sunday) covered by one list item, or `None` if not numeric.
fn expand_unix_days(item: &str) -> Option<Vec<u32>> {
    let (range, step) = match item.split_once('/') {
        Some((range, step)) => (range, step.parse::<usize>().ok().filter(|&s| s > 0)?),
        None => (item, 1),
    };
    let (start, end): (u32, u32) = if range == "*" {
        (0, 6)
    } else if let Some((start, end)) = range.split_once('-') {
        (start.parse().ok()?, end.parse().ok()?)
    } else {
        let day = range.parse().ok()?;
        // `5/2` runs from day 5 to the end of the week.
        (day, if item.contains('/') { 6 } else { day })
    };
    if start > end || end > 7 {
        return None;
    }
    Some((start..=end).step_by(step).map(|day| day % 7).collect())
}

/// Parse an expression (after normalization) into a `cron::Schedule`.
pub fn parse_cron(expr: &str) -> CoreResult<Schedule> {
    if expr.trim().is_empty() {
        return Err(CoreError::MissingField("cron"));
    }
    Schedule::from_str(&normalize_cron(expr)).map_err(|e| CoreError::InvalidCron {
        expr: expr.to_string(),
        reason: e.to_string(),
    })
}

/// Check that an expression parses.
pub fn validate_cron(expr: &str) -> CoreResult<()> {
    parse_cron(expr).map(|_| ())
}

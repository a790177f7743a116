//! Date resolution and bar placement.
//!
//! Everything here is pure: records go in, a [`GanttLayout`] comes out, and
//! the renderer only translates it into pixels.

use crate::chart::types::{AxisRange, BarRow, ChartError, ChartTask, StatusColor};
use crate::clickup::TaskRecord;
use chrono::{Datelike, Duration, Local, NaiveDateTime, TimeZone};
use tracing::debug;

/// Days of padding on each side of the task range.
pub const AXIS_MARGIN_DAYS: i64 = 7;

/// Calendar years a task date may fall in; anything else counts as undated.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Status substrings tested in order against the upper-cased label; first
/// match wins.
pub const STATUS_COLORS: &[(&str, StatusColor)] = &[
    ("ACHIEVED", StatusColor::Done),
    ("COMPLETE", StatusColor::Done),
    ("COMPLETED", StatusColor::Done),
    ("APPROVED", StatusColor::Done),
    ("FINALIZED", StatusColor::Done),
    ("DONE", StatusColor::Done),
    ("CLOSED", StatusColor::Done),
    ("MONITORING", StatusColor::InProgress),
    ("IMPLEMENTING", StatusColor::InProgress),
    ("PROGRESS", StatusColor::InProgress),
    ("REVIEWING", StatusColor::InProgress),
    ("IN PROGRESS", StatusColor::InProgress),
    ("TODO", StatusColor::NotStarted),
    ("TO DO", StatusColor::NotStarted),
    ("OPEN", StatusColor::NotStarted),
    ("DRAFTING", StatusColor::NotStarted),
    ("NOT STARTED", StatusColor::NotStarted),
];

pub fn classify_status(label: &str) -> StatusColor {
    let upper = label.to_uppercase();
    STATUS_COLORS
        .iter()
        .find(|(pattern, _)| upper.contains(pattern))
        .map(|(_, color)| *color)
        .unwrap_or(StatusColor::NotStarted)
}

/// Decode a millisecond epoch into local wall-clock time.
///
/// Returns `None` outside [`SUPPORTED_YEARS`].
pub fn timestamp_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    Local
        .timestamp_millis_opt(millis)
        .earliest()
        .map(|dt| dt.naive_local())
        .filter(|dt| SUPPORTED_YEARS.contains(&dt.year()))
}

/// Resolve both ends of a task's bar, inferring a one-day span when only one
/// date is known. Tasks without any date yield `None`.
pub fn resolve_task(record: &TaskRecord) -> Option<ChartTask> {
    let start = record.start_date.and_then(timestamp_to_datetime);
    let due = record.due_date.and_then(timestamp_to_datetime);

    let (start, end) = match (start, due) {
        (Some(start), Some(due)) => (start, due),
        (None, Some(due)) => (due.checked_sub_signed(Duration::days(1))?, due),
        (Some(start), None) => (start, start.checked_add_signed(Duration::days(1))?),
        (None, None) => return None,
    };

    Some(ChartTask {
        name: record.name().to_string(),
        start,
        end,
        status: record.status_label().to_string(),
    })
}

/// Resolve every record, drop the undated ones and sort by start (stable).
pub fn resolve_tasks(records: &[TaskRecord]) -> Vec<ChartTask> {
    let mut tasks: Vec<ChartTask> = records
        .iter()
        .filter_map(|record| {
            let resolved = resolve_task(record);
            if resolved.is_none() {
                debug!("Dropping '{}': no start or due date", record.name());
            }
            resolved
        })
        .collect();

    tasks.sort_by_key(|task| task.start);
    tasks
}

pub fn axis_range(tasks: &[ChartTask]) -> Option<AxisRange> {
    let min_start = tasks.iter().map(|t| t.start).min()?;
    let max_end = tasks.iter().map(|t| t.end).max()?;
    let margin = Duration::days(AXIS_MARGIN_DAYS);

    Some(AxisRange {
        start: min_start.checked_sub_signed(margin)?,
        end: max_end.checked_add_signed(margin)?,
    })
}

/// Inclusive day count of a bar: whole days between the ends, plus one.
pub fn bar_length_days(task: &ChartTask) -> i64 {
    (task.end - task.start).num_seconds().div_euclid(86_400) + 1
}

/// Resolved tasks, axis and bars for one chart.
#[derive(Debug, Clone)]
pub struct GanttLayout {
    pub tasks: Vec<ChartTask>,
    pub axis: AxisRange,
    pub rows: Vec<BarRow>,
}

impl GanttLayout {
    pub fn build(records: &[TaskRecord]) -> Result<Self, ChartError> {
        let tasks = resolve_tasks(records);
        let axis = axis_range(&tasks).ok_or(ChartError::NoDatedTasks)?;

        let rows = tasks
            .iter()
            .rev()
            .enumerate()
            .map(|(slot, task)| BarRow {
                slot,
                name: task.name.clone(),
                left: task.start,
                length_days: bar_length_days(task),
                color: classify_status(&task.status),
            })
            .collect();

        debug!(
            "Layout: {} of {} tasks, axis {} to {}",
            tasks.len(),
            records.len(),
            axis.start.format("%Y-%m-%d"),
            axis.end.format("%Y-%m-%d")
        );

        Ok(Self { tasks, axis, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

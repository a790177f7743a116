use chrono::{NaiveDate, NaiveDateTime};
use image::Rgb;

/// A task with both ends of its bar resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartTask {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: String,
}

/// Horizontal extent of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl AxisRange {
    pub fn span_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds().max(1)
    }
}

/// Semantic bar colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusColor {
    Done,
    InProgress,
    NotStarted,
}

impl StatusColor {
    pub fn hex(&self) -> &'static str {
        match self {
            StatusColor::Done => "#8dd879",
            StatusColor::InProgress => "#a8c5f0",
            StatusColor::NotStarted => "#e0e0e0",
        }
    }

    pub fn rgb(&self) -> Rgb<u8> {
        match self {
            StatusColor::Done => Rgb([0x8d, 0xd8, 0x79]),
            StatusColor::InProgress => Rgb([0xa8, 0xc5, 0xf0]),
            StatusColor::NotStarted => Rgb([0xe0, 0xe0, 0xe0]),
        }
    }
}

/// One bar as it will be drawn.
///
/// `slot` counts from the bottom of the plot, so the last task in start order
/// sits in slot 0 and the earliest one ends up at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub slot: usize,
    pub name: String,
    pub left: NaiveDateTime,
    pub length_days: i64,
    pub color: StatusColor,
}

/// PNG bytes plus the attachment filename they are published under.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RenderedArtifact {
    /// `gantt-{project-name}-{YYYYMMDD}.png`; same-day reruns reuse the name.
    pub fn filename_for(project_name: &str, date: NaiveDate) -> String {
        format!(
            "gantt-{}-{}.png",
            project_name.to_lowercase().replace(' ', "-"),
            date.format("%Y%m%d")
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("No tasks with start or due dates to chart")]
    NoDatedTasks,
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::fs::table::CellValue;

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Local `YYYY-MM-DD HH:MM`, or `-` when unknown.
pub fn format_time(time: Option<SystemTime>) -> String {
    time.map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_flag(flag: bool) -> &'static str {
    if flag {
        "x"
    } else {
        "-"
    }
}

/// Text for one table cell.
pub fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Icon(icon) => icon.glyph().to_string(),
        CellValue::Text(text) => text.clone(),
        CellValue::Size(bytes) => format_size(*bytes),
        CellValue::Time(time) => format_time(*time),
        CellValue::Flag(flag) => format_flag(*flag).to_string(),
    }
}

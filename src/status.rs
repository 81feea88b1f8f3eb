use std::time::Duration;

use crate::humanize::{elapsed_phrase, summary};
use crate::paint::Paint;
use crate::work_log::LogRow;

pub(crate) fn status_line(name: &str, elapsed: Duration, paint: Paint) -> String {
    format!(
        "You have been working on {} for {}.",
        paint.green(name),
        elapsed_phrase(elapsed)
    )
}

pub(crate) fn log_lines(rows: &[LogRow]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            let marker = if row.working { " ← working" } else { "" };
            format!("{:<width$}  ∙∙  {}{marker}", row.name, summary(row.total))
        })
        .collect()
}

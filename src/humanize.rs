//! Human readable durations for `status` and `log`.

use std::time::Duration;

/// Rough phrase for how long something has been going on.
///
/// Buckets are in whole minutes and deliberately approximate, e.g. 44
/// minutes is already "about an hour" and a month is 30 days.
pub fn elapsed_phrase(elapsed: Duration) -> String {
    let minutes = elapsed.as_secs() / 60;

    match minutes {
        0 => "less than a minute".to_owned(),
        1 => "a minute".to_owned(),
        2..=43 => format!("{minutes} minutes"),
        44..=88 => "about an hour".to_owned(),
        89..=1438 => format!("about {} hours", minutes / 60),
        1439..=2518 => "about a day".to_owned(),
        2519..=43198 => format!("about {} days", minutes / 1440),
        43199..=86398 => "about a month".to_owned(),
        86399..=525_598 => format!("about {} months", minutes / 43200),
        _ => "more than a year".to_owned(),
    }
}

/// Exact breakdown, e.g. "2 hours, 5 minutes & 10 seconds".
pub fn summary(total: Duration) -> String {
    let seconds = total.as_secs();
    let parts: Vec<String> = [
        (seconds / 3600, "hour"),
        (seconds % 3600 / 60, "minute"),
        (seconds % 60, "second"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, unit)| plural(count, unit))
    .collect();

    match parts.split_last() {
        None => plural(0, "second"),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} & {last}", rest.join(", ")),
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

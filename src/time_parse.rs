use std::sync::LazyLock;

use regex::Regex;
use strum::EnumString;

use crate::entry::Stamp;

static RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+|an?)\s*([a-z]+)\s+ago$").expect("pattern is valid")
});

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Don't understand the time '{0}'")]
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
enum Unit {
    #[strum(
        serialize = "s",
        serialize = "sec",
        serialize = "secs",
        serialize = "second",
        serialize = "seconds"
    )]
    Second,
    #[strum(
        serialize = "min",
        serialize = "mins",
        serialize = "minute",
        serialize = "minutes"
    )]
    Minute,
    #[strum(
        serialize = "hr",
        serialize = "hrs",
        serialize = "hour",
        serialize = "hours"
    )]
    Hour,
}

impl Unit {
    fn millis(self) -> i64 {
        match self {
            Unit::Second => 1_000,
            Unit::Minute => 60_000,
            Unit::Hour => 3_600_000,
        }
    }
}

/// Resolves `now`, an empty string, or `<n> <unit> ago` against `now`.
///
/// `n` is a positive integer or `a`/`an`; units are seconds, minutes and
/// hours in their usual short and plural spellings.
pub fn parse(input: &str, now: Stamp) -> Result<Stamp, Error> {
    let input = input.trim();
    if input.is_empty() || input == "now" {
        return Ok(now);
    }

    let unrecognized = || Error::Unrecognized(input.to_owned());
    let captures = RELATIVE.captures(input).ok_or_else(unrecognized)?;

    let quantity: i64 = match &captures[1] {
        "a" | "an" => 1,
        digits => digits.parse().map_err(|_| unrecognized())?,
    };
    if quantity == 0 {
        return Err(unrecognized());
    }
    let unit: Unit = captures[2].parse().map_err(|_| unrecognized())?;

    let offset = quantity.checked_mul(unit.millis()).ok_or_else(unrecognized)?;
    let millis = now
        .as_millisecond()
        .checked_sub(offset)
        .ok_or_else(unrecognized)?;
    Stamp::from_millisecond(millis).map_err(|_| unrecognized())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW_MS: i64 = 1_700_000_000_000;

    fn now() -> Stamp {
        Stamp::from_millisecond(NOW_MS).unwrap()
    }

    fn ago(input: &str) -> i64 {
        NOW_MS - parse(input, now()).unwrap().as_millisecond()
    }

    #[test]
    fn now_and_empty_are_now() {
        assert_eq!(parse("now", now()), Ok(now()));
        assert_eq!(parse("", now()), Ok(now()));
        assert_eq!(parse("  now ", now()), Ok(now()));
    }

    #[test]
    fn relative_offsets() {
        assert_eq!(ago("5 minutes ago"), 5 * 60_000);
        assert_eq!(ago("5min ago"), 5 * 60_000);
        assert_eq!(ago("a minute ago"), 60_000);
        assert_eq!(ago("an hour ago"), 3_600_000);
        assert_eq!(ago("2 hrs ago"), 7_200_000);
        assert_eq!(ago("30 secs ago"), 30_000);
        assert_eq!(ago("1 s ago"), 1_000);
    }

    #[test]
    fn earliest_writable_year_is_zero() {
        // NOW_MS is 17_740_894.2 hours after 0000-01-01T00:00:00Z.
        let earliest = parse("17740894 hours ago", now()).unwrap();
        assert_eq!(earliest.to_string(), "0000-01-01T00:13:20.000Z");
        assert!(parse("17740895 hours ago", now()).is_err());
    }

    #[test]
    fn anything_else_is_refused() {
        for input in [
            "yesterday",
            "5 minutes",
            "in 5 minutes",
            "5 days ago",
            "0 minutes ago",
            "-5 minutes ago",
            "five minutes ago",
            "5 minutes ago please",
            "99999999999999999999 hours ago",
            "20000000 hours ago",
        ] {
            assert_eq!(
                parse(input, now()),
                Err(Error::Unrecognized(input.to_owned())),
                "{input}"
            );
        }
    }
}

//! Splitting raw rsyncd log lines into their fixed four-field shape.
//!
//! A daemon log line looks like:
//!
//! ```text
//! 2024/01/01 10:00:05 [111] sent 42 bytes  total size 4096
//! ```
//!
//! date, time, bracketed pid, then free text. Everything downstream works
//! on the [`ParsedLine`] produced here; a line that does not match the
//! shape is rejected whole, never partially.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{EventError, Result};
use crate::types::ProcessId;

/// Timestamp layout used by rsyncd logs: no timezone, second resolution.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

static LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}/\d{2}/\d{2}) (\d{2}:\d{2}:\d{2}) \[(\d+)\] (.*)$")
        .unwrap_or_else(|_| unreachable!())
});

/// One well-formed log line. Ephemeral: produced per input line and
/// dropped once the correlator has applied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Combined date and time of the line.
    pub timestamp: NaiveDateTime,
    /// The bracket-stripped pid token.
    pub pid: ProcessId,
    /// The free-text remainder of the line.
    pub message: String,
}

/// Parses a raw log line, trailing newline already stripped.
///
/// The fixed-width pattern is the only validation applied to the date
/// fields beyond what timestamp combination itself rejects; a line with
/// an impossible month is a [`EventError::ParseFailure`] like any other
/// malformed line, never a correlator concern.
///
/// # Errors
///
/// Returns [`EventError::ParseFailure`] carrying the offending line when
/// it does not match the expected shape.
pub fn parse(line: &str) -> Result<ParsedLine> {
    let caps = LINE_REGEX
        .captures(line)
        .ok_or_else(|| EventError::ParseFailure {
            line: line.to_string(),
        })?;

    let stamp = format!("{} {}", &caps[1], &caps[2]);
    let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).map_err(|_| {
        EventError::ParseFailure {
            line: line.to_string(),
        }
    })?;

    Ok(ParsedLine {
        timestamp,
        pid: ProcessId::new(&caps[3]),
        message: caps[4].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn parses_a_typical_line() {
        let line = parse("2024/01/01 10:00:05 [111] sent 42 bytes  total size 4096")
            .unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(
            line.timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 5)
                .unwrap()
        );
        assert_eq!(line.pid, ProcessId::new("111"));
        assert_eq!(line.message, "sent 42 bytes  total size 4096");
    }

    #[test]
    fn message_is_preserved_exactly() {
        let line = parse("2024/01/01 10:00:00 [7] connect from  spaced.host  ").unwrap();
        assert_eq!(line.message, "connect from  spaced.host  ");
    }

    #[test]
    fn empty_message_is_valid() {
        let line = parse("2024/01/01 10:00:00 [7] ").unwrap();
        assert_eq!(line.message, "");
    }

    #[test_case("" ; "empty line")]
    #[test_case("not a log line" ; "free text")]
    #[test_case("2024/1/01 10:00:00 [7] msg" ; "short month field")]
    #[test_case("2024/01/01 10:00 [7] msg" ; "missing seconds")]
    #[test_case("2024/01/01 10:00:00 [abc] msg" ; "non numeric pid")]
    #[test_case("2024/01/01 10:00:00 [] msg" ; "empty pid")]
    #[test_case("2024/01/01 10:00:00 7 msg" ; "unbracketed pid")]
    #[test_case("2024/13/01 10:00:00 [7] msg" ; "impossible month")]
    #[test_case("2024/01/01 25:00:00 [7] msg" ; "impossible hour")]
    fn rejects_malformed_lines(line: &str) {
        assert_eq!(
            parse(line),
            Err(EventError::ParseFailure {
                line: line.to_string()
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn prop_round_trips_any_well_formed_line(
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..=23,
            minute in 0u32..=59,
            second in 0u32..=59,
            pid in "[0-9]{1,8}",
            message in "[^\r\n]{0,80}",
        ) {
            let raw = format!(
                "2024/{month:02}/{day:02} {hour:02}:{minute:02}:{second:02} [{pid}] {message}"
            );
            let line = parse(&raw).unwrap();

            let expected = NaiveDate::from_ymd_opt(2024, month, day)
                .unwrap()
                .and_hms_opt(hour, minute, second)
                .unwrap();
            prop_assert_eq!(line.timestamp, expected);
            prop_assert_eq!(line.pid, ProcessId::new(pid));
            prop_assert_eq!(line.message, message);
        }

        #[test]
        fn prop_non_matching_lines_always_fail_whole(line in "[^\r\n]{0,80}") {
            // Either the shape matches and parsing succeeds, or we get a
            // ParseFailure carrying the input; never a partial result.
            match parse(&line) {
                Ok(parsed) => prop_assert!(line.ends_with(&parsed.message)),
                Err(EventError::ParseFailure { line: reported }) => {
                    prop_assert_eq!(reported, line);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }
}

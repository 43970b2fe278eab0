//! Line-oriented input reader and field extractor.
//!
//! This is the spec's out-of-scope "external collaborator #1". Its
//! concrete grammar is recovered from `original_source/src/main.c`, whose
//! `sscanf` format string is a rigid, ordered, partial match:
//!
//! ```text
//! {"created_time": "%d-%d-%dT%d:%d:%dZ", "target": "%[^"]", "actor": "%[^"]
//! ```
//!
//! This is not a JSON parser: it is a positional scan that requires the
//! literal framing around each field to line up exactly, in this exact
//! order, and bails at the first mismatch. `%[^"]` does not require a
//! closing quote, so an `actor` value is accepted even if the line ends
//! without one. A missing/unparsable date component, empty actor, or empty
//! target is a skip, matching `main.c`'s
//! `if (actor[0]=='\0' || target[0]=='\0' || *time==0) continue;`.

use chrono::NaiveDate;

/// `MAX_STR_LEN` in `venmoGraphParams.h`: the longest a captured name may
/// be (199 usable bytes, mirroring the original's 200-byte buffer with a
/// terminating nul).
pub const MAX_NAME_LEN: usize = 199;

/// The original reads each line into a fixed `char line[500]` with
/// `fgets(line, 500, fp_in)`, which truncates (but does not reject) an
/// overlong line at 499 bytes plus a nul.
pub const MAX_LINE_LEN: usize = 499;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub timestamp: i64,
    pub actor: String,
    pub target: String,
}

/// Parses one input line into an `Event`, or `None` if the line is
/// malformed in any of the ways the original parser silently skips.
pub fn parse_line(line: &str) -> Option<Event> {
    let line = truncate(line);

    let rest = strip_literal(line, "{\"created_time\": \"")?;
    let (year, rest) = take_int(rest)?;
    let rest = strip_literal(rest, "-")?;
    let (month, rest) = take_int(rest)?;
    let rest = strip_literal(rest, "-")?;
    let (day, rest) = take_int(rest)?;
    let rest = strip_literal(rest, "T")?;
    let (hour, rest) = take_int(rest)?;
    let rest = strip_literal(rest, ":")?;
    let (minute, rest) = take_int(rest)?;
    let rest = strip_literal(rest, ":")?;
    let (second, rest) = take_int(rest)?;
    let rest = strip_literal(rest, "Z\", \"target\": \"")?;
    let (target, rest) = take_until_quote(rest);
    let rest = strip_literal(rest, "\", \"actor\": \"")?;
    let (actor, _rest) = take_until_quote(rest);

    if actor.is_empty() || target.is_empty() {
        return None;
    }

    let timestamp = epoch_seconds(year, month, day, hour, minute, second)?;
    if timestamp == 0 {
        return None;
    }

    Some(Event {
        timestamp,
        actor: truncate_name(actor),
        target: truncate_name(target),
    })
}

fn truncate(line: &str) -> &str {
    if line.len() <= MAX_LINE_LEN {
        line
    } else {
        let mut end = MAX_LINE_LEN;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        &line[..end]
    }
}

fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LEN {
        name.to_owned()
    } else {
        let mut end = MAX_NAME_LEN;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name[..end].to_owned()
    }
}

fn strip_literal<'a>(s: &'a str, literal: &str) -> Option<&'a str> {
    s.strip_prefix(literal)
}

/// `%d`-equivalent: an optional sign followed by one or more digits,
/// stopping at the first non-digit.
fn take_int(s: &str) -> Option<(i32, &str)> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    s[..i].parse().ok().map(|n| (n, &s[i..]))
}

/// `%[^"]`-equivalent: everything up to (but not including) the next `"`,
/// or the whole remainder if no `"` appears.
fn take_until_quote(s: &str) -> (&str, &str) {
    match s.find('"') {
        Some(idx) => (&s[..idx], &s[idx..]),
        None => (s, ""),
    }
}

fn epoch_seconds(
    year: i32,
    month: i32,
    day: i32,
    hour: i32,
    minute: i32,
    second: i32,
) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)?;
    let time = date.and_hms_opt(
        u32::try_from(hour).ok()?,
        u32::try_from(minute).ok()?,
        u32::try_from(second).ok()?,
    )?;
    Some(time.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_line() {
        let line = r#"{"created_time": "2016-03-28T23:23:12Z", "target": "Jane", "actor": "John"}"#;
        let event = parse_line(line).unwrap();
        assert_eq!(event.actor, "John");
        assert_eq!(event.target, "Jane");
        assert!(event.timestamp > 0);
    }

    #[test]
    fn monotonic_in_time() {
        let a = parse_line(
            r#"{"created_time": "2016-03-28T23:23:12Z", "target": "Jane", "actor": "John"}"#,
        )
        .unwrap();
        let b = parse_line(
            r#"{"created_time": "2016-03-28T23:23:13Z", "target": "Jane", "actor": "John"}"#,
        )
        .unwrap();
        assert!(b.timestamp > a.timestamp);
    }

    #[test]
    fn missing_actor_is_skipped() {
        let line = r#"{"created_time": "2016-03-28T23:23:12Z", "target": "Jane", "actor": ""}"#;
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn missing_target_is_skipped() {
        let line = r#"{"created_time": "2016-03-28T23:23:12Z", "target": "", "actor": "John"}"#;
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn malformed_date_is_skipped() {
        let line = r#"{"created_time": "not-a-date", "target": "Jane", "actor": "John"}"#;
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn truncated_trailing_actor_without_closing_quote_still_parses() {
        let line = r#"{"created_time": "2016-03-28T23:23:12Z", "target": "Jane", "actor": "John"#;
        let event = parse_line(line).unwrap();
        assert_eq!(event.actor, "John");
    }

    #[test]
    fn invalid_calendar_field_is_skipped() {
        let line = r#"{"created_time": "2016-13-99T23:23:12Z", "target": "Jane", "actor": "John"}"#;
        assert!(parse_line(line).is_none());
    }

    #[test]
    fn overlong_name_is_truncated() {
        let long_name = "x".repeat(300);
        let line = format!(
            r#"{{"created_time": "2016-03-28T23:23:12Z", "target": "{long_name}", "actor": "John"}}"#
        );
        let event = parse_line(&line).unwrap();
        assert_eq!(event.target.len(), MAX_NAME_LEN);
    }
}

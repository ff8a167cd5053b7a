// File: src/model/parser.rs
// Line-oriented VEVENT scanner for calendar exports
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;

/// A property value as found on a content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField {
    Bare(String),
    WithParams {
        value: String,
        params: HashMap<String, String>,
    },
}

impl RawField {
    pub fn value(&self) -> &str {
        match self {
            RawField::Bare(v) => v,
            RawField::WithParams { value, .. } => value,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        match self {
            RawField::Bare(_) => None,
            RawField::WithParams { params, .. } => params.get(name).map(String::as_str),
        }
    }
}

/// Fields of one VEVENT block, keyed by property name. Later lines win.
pub type RawEvent = HashMap<String, RawField>;

/// Joins folded lines: a physical line starting with a space continues the
/// previous one. Trailing CRs are dropped so CRLF and LF input behave alike.
/// Only the single leading space of a continuation is removed; whitespace at
/// the end of the line being continued is kept, so `the \r\n Federales`
/// joins as `the Federales`.
pub fn unfold_lines(input: &str) -> Vec<String> {
    let mut logical: Vec<String> = Vec::new();

    for raw_line in input.split('\n') {
        let raw_line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if let Some(rest) = raw_line.strip_prefix(' ')
            && let Some(last) = logical.last_mut()
        {
            last.push_str(rest);
        } else {
            logical.push(raw_line.to_string());
        }
    }

    logical.into_iter().map(|l| l.trim().to_string()).collect()
}

/// Splits `KEY;P1=V1;P2=V2:VALUE` into its key and field.
/// Returns `None` for lines without a colon.
pub fn parse_content_line(line: &str) -> Option<(String, RawField)> {
    let (key_part, value) = line.split_once(':')?;
    let mut parts = key_part.split(';');
    let key = parts.next().unwrap_or_default().trim().to_string();

    let mut params = HashMap::new();
    for part in parts {
        let (name, val) = part.split_once('=').unwrap_or((part, ""));
        let name = name.trim();
        if !name.is_empty() {
            params.insert(name.to_string(), val.trim().to_string());
        }
    }

    let value = value.trim().to_string();
    let field = if params.is_empty() {
        RawField::Bare(value)
    } else {
        RawField::WithParams { value, params }
    };
    Some((key, field))
}

/// Scans the export and returns one field map per VEVENT block, in file order.
pub fn parse_events(input: &str) -> Vec<RawEvent> {
    let mut events = Vec::new();
    let mut current = RawEvent::new();
    let mut in_event = false;

    for line in unfold_lines(input) {
        if line == "BEGIN:VEVENT" {
            in_event = true;
            current = RawEvent::new();
        } else if line == "END:VEVENT" {
            in_event = false;
            if !current.is_empty() {
                events.push(std::mem::take(&mut current));
            }
        } else if in_event && let Some((key, field)) = parse_content_line(&line) {
            current.insert(key, field);
        }
    }

    events
}

/// Converts `YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]` into a UTC instant.
/// Zone markers are ignored: every value is read as UTC.
pub fn parse_ics_date(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    let val = value.replacen('Z', "", 1);

    if val.len() == 8 {
        return NaiveDate::parse_from_str(&val, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc());
    }

    if val.contains('T') {
        let date = NaiveDate::parse_from_str(val.get(..8)?, "%Y%m%d").ok()?;
        let time = NaiveTime::parse_from_str(val.get(9..15)?, "%H%M%S").ok()?;
        return Some(date.and_time(time).and_utc());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_vevent_blocks_in_order() {
        let ics = "BEGIN:VCALENDAR\r
VERSION:2.0\r
BEGIN:VEVENT\r
UID:one\r
SUMMARY:First\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:two\r
SUMMARY:Second\r
END:VEVENT\r
END:VCALENDAR\r
";
        let events = parse_events(ics);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["SUMMARY"].value(), "First");
        assert_eq!(events[1]["UID"].value(), "two");
        assert!(!events[0].contains_key("VERSION"), "calendar-level keys stay out");
    }

    #[test]
    fn test_line_folding_joins_continuations() {
        let ics = "BEGIN:VEVENT
UID:folded
DESCRIPTION:Doors at eight
 , show at nine
END:VEVENT";
        let events = parse_events(ics);
        assert_eq!(events[0]["DESCRIPTION"].value(), "Doors at eight, show at nine");
    }

    #[test]
    fn test_folding_keeps_space_before_the_break() {
        let lines = unfold_lines("SUMMARY:with the \r\n Federales\r\nUID:x\r\n");
        assert_eq!(lines[0], "SUMMARY:with the Federales");
        assert_eq!(lines[1], "UID:x");

        let tight = unfold_lines("SUMMARY:with the\r\n Federales");
        assert_eq!(tight[0], "SUMMARY:with theFederales");
    }

    #[test]
    fn test_parameters_are_captured() {
        let ics = "BEGIN:VEVENT
DTSTART;TZID=America/Chicago;VALUE=DATE-TIME:20240601T200000
SUMMARY:Show
END:VEVENT";
        let events = parse_events(ics);
        let start = &events[0]["DTSTART"];
        assert_eq!(start.value(), "20240601T200000");
        assert_eq!(start.param("TZID"), Some("America/Chicago"));
        assert_eq!(start.param("VALUE"), Some("DATE-TIME"));
        assert_eq!(events[0]["SUMMARY"], RawField::Bare("Show".to_string()));
    }

    #[test]
    fn test_malformed_and_empty_blocks_are_skipped() {
        let ics = "garbage without colon
BEGIN:VEVENT
this line has no separator
END:VEVENT
BEGIN:VEVENT
UID:kept
END:VEVENT";
        let events = parse_events(ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["UID"].value(), "kept");
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let (key, field) = parse_content_line("DESCRIPTION:Tickets: $10").unwrap();
        assert_eq!(key, "DESCRIPTION");
        assert_eq!(field.value(), "Tickets: $10");
    }

    #[test]
    fn test_unknown_keys_are_retained() {
        let ics = "BEGIN:VEVENT
UID:x
X-CUSTOM:kept around
END:VEVENT";
        let events = parse_events(ics);
        assert_eq!(events[0]["X-CUSTOM"].value(), "kept around");
    }

    #[test]
    fn test_parse_ics_date_shapes() {
        assert_eq!(
            parse_ics_date("20240601"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_ics_date("20240601T203015Z"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 20, 30, 15).unwrap())
        );
        assert_eq!(
            parse_ics_date("20240601T203015"),
            parse_ics_date("20240601T203015Z"),
            "zone marker does not shift the instant"
        );
        assert_eq!(parse_ics_date(""), None);
        assert_eq!(parse_ics_date("2024-06-01"), None);
        assert_eq!(parse_ics_date("20241301"), None);
        assert_eq!(parse_ics_date("20240601T2030"), None);
    }
}

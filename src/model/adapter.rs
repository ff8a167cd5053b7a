// File: src/model/adapter.rs
use crate::model::item::CalendarEvent;
use crate::model::parser::{RawEvent, parse_ics_date};
use crate::model::sanitize::field_text;

pub const UNTITLED_EVENT: &str = "Untitled Event";
pub const CONFIRMED_STATUS: &str = "CONFIRMED";

/// Keys the adapter reads; anything else stays on the raw record only.
pub const HANDLED_KEYS: &[&str] = &[
    "UID",
    "DTSTART",
    "DTEND",
    "SUMMARY",
    "DESCRIPTION",
    "STATUS",
    "LOCATION",
];

/// Short stable id: first 12 hex chars of the MD5 of the source UID.
pub fn event_id(uid: &str) -> String {
    let digest = format!("{:x}", md5::compute(uid.as_bytes()));
    digest[..12].to_string()
}

impl CalendarEvent {
    /// Builds an event from a raw VEVENT record.
    ///
    /// `index` is the block's position in the export and seeds a synthetic UID
    /// when the record has none. Returns `None` when either the start or the
    /// end instant cannot be resolved.
    pub fn from_raw(
        raw: &RawEvent,
        index: usize,
        calendar_id: &str,
        calendar_name: &str,
    ) -> Option<Self> {
        let mut uid = field_text(raw.get("UID"));
        if uid.is_empty() {
            uid = format!("event-{}", index);
        }

        let start_time = parse_ics_date(&field_text(raw.get("DTSTART")))?;
        let end_time = parse_ics_date(&field_text(raw.get("DTEND")))?;

        let mut title = field_text(raw.get("SUMMARY"));
        if title.is_empty() {
            title = UNTITLED_EVENT.to_string();
        }

        let venue = Some(field_text(raw.get("LOCATION"))).filter(|v| !v.is_empty());

        Some(CalendarEvent {
            id: event_id(&uid),
            calendar_id: calendar_id.to_string(),
            calendar_name: calendar_name.to_string(),
            title,
            description: field_text(raw.get("DESCRIPTION")),
            start_time,
            end_time,
            confirmed: field_text(raw.get("STATUS")) == CONFIRMED_STATUS,
            venue,
        })
    }
}

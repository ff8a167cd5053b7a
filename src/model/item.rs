// File: src/model/item.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub calendar_id: String,
    pub calendar_name: String,
    pub title: String,
    pub description: String,
    #[serde(with = "utc_seconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "utc_seconds")]
    pub end_time: DateTime<Utc>,
    pub confirmed: bool,
    pub venue: Option<String>,
}

/// Loose shape of a normalized record as found on disk.
///
/// Unknown fields are ignored and both instants are optional, so that a record
/// missing its dates can be skipped instead of failing the whole file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    pub id: String,
    pub calendar_id: String,
    #[serde(default)]
    pub calendar_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "utc_seconds::option")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, with = "utc_seconds::option")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confirmed: bool,
    #[serde(default)]
    pub venue: Option<String>,
}

impl StoredEvent {
    pub fn into_event(self) -> Option<CalendarEvent> {
        Some(CalendarEvent {
            id: self.id,
            calendar_id: self.calendar_id,
            calendar_name: self.calendar_name,
            title: self.title,
            description: self.description.unwrap_or_default(),
            start_time: self.start_time?,
            end_time: self.end_time?,
            confirmed: self.confirmed,
            venue: self.venue,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub event_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternBadge {
    pub patterns: Vec<String>,
    pub text: String,
    pub color: String,
}

impl PatternBadge {
    pub fn new(patterns: Vec<String>, text: &str, color: &str) -> Self {
        Self {
            patterns,
            text: text.to_string(),
            color: color.to_string(),
        }
    }

    /// Case-insensitive comparison of the pattern lists, ignoring order.
    pub fn same_patterns(&self, other: &PatternBadge) -> bool {
        if self.patterns.len() != other.patterns.len() {
            return false;
        }
        let mut a: Vec<String> = self.patterns.iter().map(|p| p.to_lowercase()).collect();
        let mut b: Vec<String> = other.patterns.iter().map(|p| p.to_lowercase()).collect();
        a.sort();
        b.sort();
        a == b
    }

    pub fn matches(&self, title_lower: &str) -> bool {
        contains_any(title_lower, &self.patterns)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    #[serde(alias = "search_texts")]
    pub search_texts: Vec<String>,
    pub color: String,
}

impl Band {
    pub fn new(search_texts: Vec<String>, color: &str) -> Self {
        Self {
            search_texts,
            color: color.to_string(),
        }
    }

    pub fn matches(&self, title_lower: &str) -> bool {
        contains_any(title_lower, &self.search_texts)
    }
}

// `haystack` must already be lowercased.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| haystack.contains(n.to_lowercase().as_str()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub matched_patterns: Vec<PatternBadge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_band: Option<Band>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Upcoming,
    Past,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Upcoming => ViewMode::Past,
            ViewMode::Past => ViewMode::Upcoming,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Upcoming => write!(f, "upcoming"),
            ViewMode::Past => write!(f, "past"),
        }
    }
}

/// Splits comma separated user input ("(c), [c], Confirmed") into patterns.
pub fn parse_pattern_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Serde helpers writing instants as `YYYY-MM-DDTHH:MM:SSZ`.
pub mod utc_seconds {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            dt: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => super::serialize(dt, s),
                None => s.serialize_none(),
            }
        }

        // Unparseable strings count as absent, same as a missing field.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(d)?;
            Ok(raw
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc)))
        }
    }
}

use crate::model::{Band, Calendar, CalendarEvent, ParsedEvent, PatternBadge, ViewMode};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

/// Immutable base events plus the calendar list derived from them.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<CalendarEvent>,
    pub calendars: Vec<Calendar>,
}

/// Everything the recomputation reads besides the base events.
pub struct FilterOptions<'a> {
    pub calendars: &'a [Calendar],
    pub pattern_badges: &'a [PatternBadge],
    pub visible_patterns: &'a BTreeSet<usize>,
    pub bands: &'a [Band],
    pub visible_bands: &'a BTreeSet<usize>,
    pub view_mode: ViewMode,
    pub now: DateTime<Utc>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the base list and rebuilds the calendars in first-seen order.
    pub fn load(&mut self, events: Vec<CalendarEvent>) {
        let mut calendars: Vec<Calendar> = Vec::new();
        for event in &events {
            match calendars.iter_mut().find(|c| c.id == event.calendar_id) {
                Some(cal) => cal.event_count += 1,
                None => calendars.push(Calendar {
                    id: event.calendar_id.clone(),
                    name: event.calendar_name.clone(),
                    visible: true,
                    event_count: 1,
                }),
            }
        }
        self.events = events;
        self.calendars = calendars;
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn toggle_calendar_visibility(&mut self, id: &str) -> bool {
        match self.calendars.iter_mut().find(|c| c.id == id) {
            Some(cal) => {
                cal.visible = !cal.visible;
                true
            }
            None => false,
        }
    }

    pub fn add_calendar(&mut self, id: &str, name: &str) -> bool {
        if self.calendars.iter().any(|c| c.id == id) {
            return false;
        }
        self.calendars.push(Calendar {
            id: id.to_string(),
            name: name.to_string(),
            visible: true,
            event_count: 0,
        });
        true
    }

    pub fn remove_calendar(&mut self, id: &str) -> bool {
        let before = self.calendars.len();
        self.calendars.retain(|c| c.id != id);
        self.calendars.len() != before
    }

    pub fn filter(&self, options: FilterOptions) -> Vec<ParsedEvent> {
        filter_events(&self.events, options)
    }
}

/// Derives the ordered, annotated view. Pure: same inputs, same output.
pub fn filter_events(events: &[CalendarEvent], options: FilterOptions) -> Vec<ParsedEvent> {
    let visible_calendars: HashSet<&str> = options
        .calendars
        .iter()
        .filter(|c| c.visible)
        .map(|c| c.id.as_str())
        .collect();

    let active_badges: Vec<&PatternBadge> = options
        .pattern_badges
        .iter()
        .enumerate()
        .filter(|(i, _)| options.visible_patterns.contains(i))
        .map(|(_, b)| b)
        .collect();

    // An empty band selection means "no restriction", unlike badges.
    let active_bands: Vec<&Band> = if options.visible_bands.is_empty() {
        options.bands.iter().collect()
    } else {
        options
            .bands
            .iter()
            .enumerate()
            .filter(|(i, _)| options.visible_bands.contains(i))
            .map(|(_, b)| b)
            .collect()
    };

    let today = options.now.date_naive();

    let mut filtered: Vec<ParsedEvent> = events
        .iter()
        .filter(|e| visible_calendars.contains(e.calendar_id.as_str()))
        .filter(|e| {
            let day = e.start_time.date_naive();
            match options.view_mode {
                ViewMode::Upcoming => day >= today,
                ViewMode::Past => day < today,
            }
        })
        .filter_map(|e| {
            let title = e.title.to_lowercase();
            let matched_patterns: Vec<PatternBadge> = active_badges
                .iter()
                .filter(|b| b.matches(&title))
                .map(|b| (*b).clone())
                .collect();
            if matched_patterns.is_empty() {
                return None;
            }
            let matched_band = active_bands
                .iter()
                .find(|b| b.matches(&title))
                .map(|b| (*b).clone());
            Some(ParsedEvent {
                event: e.clone(),
                matched_patterns,
                matched_band,
            })
        })
        .collect();

    // sort_by is stable, equal starts keep base order.
    match options.view_mode {
        ViewMode::Upcoming => filtered.sort_by(|a, b| a.event.start_time.cmp(&b.event.start_time)),
        ViewMode::Past => filtered.sort_by(|a, b| b.event.start_time.cmp(&a.event.start_time)),
    }

    filtered
}

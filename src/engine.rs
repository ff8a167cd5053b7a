// File: src/engine.rs
use crate::config::Config;
use crate::filters::{Bands, PatternBadges};
use crate::model::{Band, Calendar, CalendarEvent, ParsedEvent, PatternBadge, ViewMode};
use crate::observable::{Observable, SubscriptionId};
use crate::store::{EventStore, FilterOptions};
use chrono::{DateTime, Utc};
use tracing::debug;

pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Which piece of engine state a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Calendars,
    FilteredEvents,
    PatternBadges,
    VisiblePatterns,
    Bands,
    VisibleBands,
    ViewMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub topic: Topic,
    pub id: SubscriptionId,
}

/// Default badges shown before the user configures anything.
pub fn default_pattern_badges() -> Vec<PatternBadge> {
    vec![
        PatternBadge::new(vec!["(c)".to_string()], "Confirmed", "#27ae60"),
        PatternBadge::new(vec!["(h)".to_string()], "Hold", "#e67e22"),
    ]
}

/// Live filtering state.
///
/// Each mutating call changes one dimension, republishes it, recomputes the
/// filtered view once and publishes that. Calls that change nothing return
/// `false` and publish nothing.
pub struct EventEngine {
    store: EventStore,
    patterns: PatternBadges,
    bands: Bands,
    view_mode: ViewMode,
    clock: Clock,
    recomputations: usize,

    calendars_out: Observable<Vec<Calendar>>,
    filtered_out: Observable<Vec<ParsedEvent>>,
    patterns_out: Observable<Vec<PatternBadge>>,
    visible_patterns_out: Observable<Vec<usize>>,
    bands_out: Observable<Vec<Band>>,
    visible_bands_out: Observable<Vec<usize>>,
    view_mode_out: Observable<ViewMode>,
}

impl EventEngine {
    /// Engine over `events` with the default badges (all visible), no bands
    /// and the upcoming view.
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        let badges = default_pattern_badges();
        let visible = 0..badges.len();
        Self::with_state(
            events,
            PatternBadges::new(badges, visible),
            Bands::default(),
            ViewMode::Upcoming,
            Box::new(Utc::now),
        )
    }

    pub fn from_config(events: Vec<CalendarEvent>, config: &Config) -> Self {
        let badges = config.pattern_badges.clone();
        let patterns = match &config.visible_patterns {
            Some(indices) => PatternBadges::new(badges, indices.iter().copied()),
            None => {
                let all = 0..badges.len();
                PatternBadges::new(badges, all)
            }
        };
        let bands = Bands::new(config.bands.clone(), config.visible_bands.iter().copied());

        let mut engine = Self::with_state(
            events,
            patterns,
            bands,
            config.view_mode,
            Box::new(Utc::now),
        );
        let mut hidden_any = false;
        for cal in engine.store.calendars.iter_mut() {
            if config.hidden_calendars.contains(&cal.id) {
                cal.visible = false;
                hidden_any = true;
            }
        }
        if hidden_any {
            engine.publish_calendars();
            engine.recompute();
        }
        engine
    }

    fn with_state(
        events: Vec<CalendarEvent>,
        patterns: PatternBadges,
        bands: Bands,
        view_mode: ViewMode,
        clock: Clock,
    ) -> Self {
        let mut store = EventStore::new();
        store.load(events);

        let mut engine = Self {
            calendars_out: Observable::new(store.calendars.clone()),
            filtered_out: Observable::new(Vec::new()),
            patterns_out: Observable::new(patterns.items().to_vec()),
            visible_patterns_out: Observable::new(patterns.visible_indices()),
            bands_out: Observable::new(bands.items().to_vec()),
            visible_bands_out: Observable::new(bands.visible_indices()),
            view_mode_out: Observable::new(view_mode),
            store,
            patterns,
            bands,
            view_mode,
            clock,
            recomputations: 0,
        };
        engine.recompute();
        engine
    }

    /// Replaces the time source; the view is recomputed against it.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.clock = Box::new(clock);
        self.recompute();
        self
    }

    // --- Reads ---

    pub fn calendars(&self) -> &[Calendar] {
        self.calendars_out.get()
    }

    pub fn filtered_events(&self) -> &[ParsedEvent] {
        self.filtered_out.get()
    }

    pub fn pattern_badges(&self) -> &[PatternBadge] {
        self.patterns_out.get()
    }

    pub fn visible_patterns(&self) -> &[usize] {
        self.visible_patterns_out.get()
    }

    pub fn bands(&self) -> &[Band] {
        self.bands_out.get()
    }

    pub fn visible_bands(&self) -> &[usize] {
        self.visible_bands_out.get()
    }

    pub fn view_mode(&self) -> ViewMode {
        *self.view_mode_out.get()
    }

    pub fn base_events(&self) -> &[CalendarEvent] {
        self.store.events()
    }

    /// How many times the filtered view has been derived so far.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    // --- Subscriptions ---

    pub fn subscribe_calendars(&mut self, f: impl FnMut(&Vec<Calendar>) + 'static) -> Subscription {
        let id = self.calendars_out.subscribe(f);
        Subscription { topic: Topic::Calendars, id }
    }

    pub fn subscribe_filtered_events(
        &mut self,
        f: impl FnMut(&Vec<ParsedEvent>) + 'static,
    ) -> Subscription {
        let id = self.filtered_out.subscribe(f);
        Subscription { topic: Topic::FilteredEvents, id }
    }

    pub fn subscribe_pattern_badges(
        &mut self,
        f: impl FnMut(&Vec<PatternBadge>) + 'static,
    ) -> Subscription {
        let id = self.patterns_out.subscribe(f);
        Subscription { topic: Topic::PatternBadges, id }
    }

    pub fn subscribe_visible_patterns(
        &mut self,
        f: impl FnMut(&Vec<usize>) + 'static,
    ) -> Subscription {
        let id = self.visible_patterns_out.subscribe(f);
        Subscription { topic: Topic::VisiblePatterns, id }
    }

    pub fn subscribe_bands(&mut self, f: impl FnMut(&Vec<Band>) + 'static) -> Subscription {
        let id = self.bands_out.subscribe(f);
        Subscription { topic: Topic::Bands, id }
    }

    pub fn subscribe_visible_bands(&mut self, f: impl FnMut(&Vec<usize>) + 'static) -> Subscription {
        let id = self.visible_bands_out.subscribe(f);
        Subscription { topic: Topic::VisibleBands, id }
    }

    pub fn subscribe_view_mode(&mut self, f: impl FnMut(&ViewMode) + 'static) -> Subscription {
        let id = self.view_mode_out.subscribe(f);
        Subscription { topic: Topic::ViewMode, id }
    }

    pub fn unsubscribe(&mut self, sub: Subscription) -> bool {
        match sub.topic {
            Topic::Calendars => self.calendars_out.unsubscribe(sub.id),
            Topic::FilteredEvents => self.filtered_out.unsubscribe(sub.id),
            Topic::PatternBadges => self.patterns_out.unsubscribe(sub.id),
            Topic::VisiblePatterns => self.visible_patterns_out.unsubscribe(sub.id),
            Topic::Bands => self.bands_out.unsubscribe(sub.id),
            Topic::VisibleBands => self.visible_bands_out.unsubscribe(sub.id),
            Topic::ViewMode => self.view_mode_out.unsubscribe(sub.id),
        }
    }

    // --- Calendars ---

    pub fn toggle_calendar_visibility(&mut self, id: &str) -> bool {
        if !self.store.toggle_calendar_visibility(id) {
            debug!("toggle ignored, unknown calendar {}", id);
            return false;
        }
        self.publish_calendars();
        self.recompute();
        true
    }

    pub fn add_calendar(&mut self, id: &str, name: &str) -> bool {
        if !self.store.add_calendar(id, name) {
            debug!("calendar {} already present", id);
            return false;
        }
        self.publish_calendars();
        self.recompute();
        true
    }

    pub fn remove_calendar(&mut self, id: &str) -> bool {
        if !self.store.remove_calendar(id) {
            debug!("remove ignored, unknown calendar {}", id);
            return false;
        }
        self.publish_calendars();
        self.recompute();
        true
    }

    // --- Pattern badges ---

    pub fn add_pattern_badge(&mut self, badge: PatternBadge) -> bool {
        match self.patterns.add_badge(badge) {
            Some(index) => {
                debug!("pattern badge added at {}", index);
                self.publish_patterns();
                self.recompute();
                true
            }
            None => {
                debug!("pattern badge rejected (empty or duplicate patterns)");
                false
            }
        }
    }

    pub fn update_pattern_badge(&mut self, index: usize, badge: PatternBadge) -> bool {
        if !self.patterns.update_badge(index, badge) {
            debug!("pattern badge update at {} rejected", index);
            return false;
        }
        self.publish_patterns();
        self.recompute();
        true
    }

    pub fn remove_pattern_badge(&mut self, index: usize) -> bool {
        if !self.patterns.remove(index) {
            debug!("remove ignored, no pattern badge at {}", index);
            return false;
        }
        self.publish_patterns();
        self.recompute();
        true
    }

    pub fn toggle_pattern_visibility(&mut self, index: usize) -> bool {
        if !self.patterns.toggle(index) {
            debug!("toggle ignored, no pattern badge at {}", index);
            return false;
        }
        self.visible_patterns_out
            .publish(self.patterns.visible_indices());
        self.recompute();
        true
    }

    pub fn set_pattern_badges(&mut self, badges: Vec<PatternBadge>) {
        self.patterns.set_items(badges);
        self.publish_patterns();
        self.recompute();
    }

    // --- Bands ---

    pub fn add_band(&mut self, band: Band) -> bool {
        match self.bands.add_band(band) {
            Some(index) => {
                debug!("band added at {}", index);
                self.publish_bands();
                self.recompute();
                true
            }
            None => {
                debug!("band rejected (no search texts)");
                false
            }
        }
    }

    pub fn update_band(&mut self, index: usize, band: Band) -> bool {
        if !self.bands.update_band(index, band) {
            debug!("band update at {} rejected", index);
            return false;
        }
        self.publish_bands();
        self.recompute();
        true
    }

    pub fn remove_band(&mut self, index: usize) -> bool {
        if !self.bands.remove(index) {
            debug!("remove ignored, no band at {}", index);
            return false;
        }
        self.publish_bands();
        self.recompute();
        true
    }

    pub fn toggle_band_visibility(&mut self, index: usize) -> bool {
        if !self.bands.toggle(index) {
            debug!("toggle ignored, no band at {}", index);
            return false;
        }
        self.visible_bands_out.publish(self.bands.visible_indices());
        self.recompute();
        true
    }

    pub fn set_bands(&mut self, bands: Vec<Band>) {
        self.bands.set_items(bands);
        self.publish_bands();
        self.recompute();
    }

    // --- View mode ---

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.view_mode_out.publish(mode);
        self.recompute();
    }

    pub fn toggle_view_mode(&mut self) {
        self.set_view_mode(self.view_mode.toggled());
    }

    /// Re-derives the view without changing any dimension, e.g. after
    /// midnight has moved the upcoming/past boundary.
    pub fn refresh(&mut self) {
        self.recompute();
    }

    // --- Internals ---

    fn publish_calendars(&mut self) {
        self.calendars_out.publish(self.store.calendars.clone());
    }

    fn publish_patterns(&mut self) {
        self.patterns_out.publish(self.patterns.items().to_vec());
        self.visible_patterns_out
            .publish(self.patterns.visible_indices());
    }

    fn publish_bands(&mut self) {
        self.bands_out.publish(self.bands.items().to_vec());
        self.visible_bands_out.publish(self.bands.visible_indices());
    }

    fn recompute(&mut self) {
        let filtered = self.store.filter(FilterOptions {
            calendars: &self.store.calendars,
            pattern_badges: self.patterns.items(),
            visible_patterns: self.patterns.visible(),
            bands: self.bands.items(),
            visible_bands: self.bands.visible(),
            view_mode: self.view_mode,
            now: (self.clock)(),
        });
        self.recomputations += 1;
        debug!(
            "recomputed {} view: {} of {} events",
            self.view_mode,
            filtered.len(),
            self.store.events().len()
        );
        self.filtered_out.publish(filtered);
    }
}

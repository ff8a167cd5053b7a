// File: src/filters.rs
// Ordered filter sequences addressed by position, each with a visible subset
use crate::model::{Band, PatternBadge};
use std::collections::BTreeSet;

/// A sequence plus the set of positions currently switched on.
///
/// Every method keeps `visible` inside `0..items.len()`; out-of-range
/// positions are ignored and reported as `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleList<T> {
    items: Vec<T>,
    visible: BTreeSet<usize>,
}

impl<T> Default for VisibleList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            visible: BTreeSet::new(),
        }
    }
}

impl<T> VisibleList<T> {
    /// Builds a list, dropping visibility entries that point past the end.
    pub fn new(items: Vec<T>, visible: impl IntoIterator<Item = usize>) -> Self {
        let len = items.len();
        Self {
            items,
            visible: visible.into_iter().filter(|i| *i < len).collect(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn visible(&self) -> &BTreeSet<usize> {
        &self.visible
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        self.visible.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends and returns the new position.
    pub fn push(&mut self, item: T, visible: bool) -> usize {
        self.items.push(item);
        let index = self.items.len() - 1;
        if visible {
            self.visible.insert(index);
        }
        index
    }

    /// In-place replacement; the position keeps its visibility.
    pub fn replace(&mut self, index: usize, item: T) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Removes the entry and shifts every later visible position down by one.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        self.visible = self
            .visible
            .iter()
            .filter(|i| **i != index)
            .map(|i| if *i > index { i - 1 } else { *i })
            .collect();
        true
    }

    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if !self.visible.remove(&index) {
            self.visible.insert(index);
        }
        true
    }

    /// Swaps in a whole new sequence and prunes stale positions.
    pub fn set_items(&mut self, items: Vec<T>) {
        let len = items.len();
        self.items = items;
        self.visible.retain(|i| *i < len);
    }
}

pub type PatternBadges = VisibleList<PatternBadge>;
pub type Bands = VisibleList<Band>;

impl VisibleList<PatternBadge> {
    /// Appends a badge and switches it on. Empty pattern lists and pattern
    /// sets already present (case-insensitive) are rejected.
    pub fn add_badge(&mut self, badge: PatternBadge) -> Option<usize> {
        if badge.patterns.is_empty() || self.items.iter().any(|b| b.same_patterns(&badge)) {
            return None;
        }
        Some(self.push(badge, true))
    }

    /// In-place edit under the same rules as `add_badge`; the badge being
    /// replaced does not count as a duplicate of its successor.
    pub fn update_badge(&mut self, index: usize, badge: PatternBadge) -> bool {
        if badge.patterns.is_empty() {
            return false;
        }
        let clash = self
            .items
            .iter()
            .enumerate()
            .any(|(i, b)| i != index && b.same_patterns(&badge));
        !clash && self.replace(index, badge)
    }
}

impl VisibleList<Band> {
    /// Appends a band without touching the selection: with nothing selected
    /// every band already applies.
    pub fn add_band(&mut self, band: Band) -> Option<usize> {
        if band.search_texts.is_empty() {
            return None;
        }
        Some(self.push(band, false))
    }

    pub fn update_band(&mut self, index: usize, band: Band) -> bool {
        !band.search_texts.is_empty() && self.replace(index, band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(patterns: &[&str]) -> PatternBadge {
        PatternBadge::new(
            patterns.iter().map(|p| p.to_string()).collect(),
            patterns.join("+").as_str(),
            "#2c3e50",
        )
    }

    fn band(text: &str) -> Band {
        Band::new(vec![text.to_string()], "#2c3e50")
    }

    fn assert_valid<T>(list: &VisibleList<T>) {
        assert!(
            list.visible().iter().all(|i| *i < list.len()),
            "visible {:?} out of range for len {}",
            list.visible(),
            list.len()
        );
    }

    #[test]
    fn test_remove_rebases_visible_indices() {
        let mut list = PatternBadges::new(vec![badge(&["a"]), badge(&["b"]), badge(&["c"])], [0, 1, 2]);
        assert!(list.remove(0));
        assert_eq!(list.visible_indices(), vec![0, 1]);
        assert_eq!(list.items()[0], badge(&["b"]));
    }

    #[test]
    fn test_remove_middle_keeps_logical_entries() {
        let mut list = PatternBadges::new(
            vec![badge(&["a"]), badge(&["b"]), badge(&["c"]), badge(&["d"])],
            [0, 2, 3],
        );
        list.remove(1);
        let on: Vec<&str> = list
            .visible()
            .iter()
            .map(|i| list.items()[*i].text.as_str())
            .collect();
        assert_eq!(on, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_out_of_range_operations_are_noops() {
        let mut list = PatternBadges::new(vec![badge(&["a"])], [0, 5]);
        assert_eq!(list.visible_indices(), vec![0], "constructor prunes stale indices");
        assert!(!list.remove(3));
        assert!(!list.toggle(1));
        assert!(!list.replace(9, badge(&["z"])));
        assert_eq!(list.len(), 1);
        assert_valid(&list);
    }

    #[test]
    fn test_add_badge_rejects_empty_and_duplicates() {
        let mut list = PatternBadges::default();
        assert_eq!(list.add_badge(badge(&["(c)", "[c]"])), Some(0));
        assert_eq!(list.add_badge(badge(&["[C]", "(C)"])), None);
        assert_eq!(list.add_badge(badge(&[])), None);
        assert_eq!(list.add_badge(badge(&["(c)"])), Some(1), "subset is a different set");
        assert_eq!(list.visible_indices(), vec![0, 1]);
    }

    #[test]
    fn test_replace_preserves_visibility() {
        let mut list = PatternBadges::new(vec![badge(&["a"]), badge(&["b"])], [1]);
        assert!(list.replace(1, badge(&["z"])));
        assert!(list.replace(0, badge(&["y"])));
        assert_eq!(list.visible_indices(), vec![1]);
        assert_eq!(list.items()[1], badge(&["z"]));
    }

    #[test]
    fn test_toggle_flips_membership() {
        let mut list = Bands::new(vec![band("a"), band("b")], std::iter::empty());
        assert!(list.toggle(1));
        assert_eq!(list.visible_indices(), vec![1]);
        assert!(list.toggle(1));
        assert!(list.visible_indices().is_empty());
    }

    #[test]
    fn test_add_band_allows_duplicates_and_leaves_selection() {
        let mut list = Bands::default();
        assert_eq!(list.add_band(band("x")), Some(0));
        assert_eq!(list.add_band(band("x")), Some(1));
        assert_eq!(list.add_band(Band::new(vec![], "#000000")), None);
        assert!(list.visible_indices().is_empty());
    }

    #[test]
    fn test_updates_reject_empty_lists() {
        let mut badges = PatternBadges::new(vec![badge(&["a"]), badge(&["b"])], [0, 1]);
        assert!(!badges.update_badge(0, badge(&[])));
        assert!(!badges.update_badge(0, badge(&["B"])), "clashes with index 1");
        assert!(badges.update_badge(1, badge(&["b"])), "same slot is not a clash");
        assert!(badges.update_badge(0, badge(&["z"])));
        assert!(!badges.update_badge(5, badge(&["y"])));

        let mut bands = Bands::new(vec![band("a")], [0]);
        assert!(!bands.update_band(0, Band::new(vec![], "#000000")));
        assert!(bands.update_band(0, band("b")));
        assert_eq!(bands.items()[0], band("b"));
    }

    #[test]
    fn test_set_items_prunes_selection() {
        let mut list = Bands::new(vec![band("a"), band("b"), band("c")], [0, 2]);
        list.set_items(vec![band("only")]);
        assert_eq!(list.visible_indices(), vec![0]);
    }

    #[test]
    fn test_visibility_stays_valid_under_mixed_operations() {
        let mut list = PatternBadges::default();
        for (step, name) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            list.add_badge(badge(&[*name]));
            if step % 2 == 0 {
                list.toggle(step);
            }
        }
        for index in [4, 0, 7, 1, 0, 0, 0] {
            list.remove(index);
            assert_valid(&list);
            list.add_badge(badge(&[format!("n{}", index).as_str()]));
            assert_valid(&list);
            list.toggle(list.len().saturating_sub(2));
            assert_valid(&list);
        }
    }
}

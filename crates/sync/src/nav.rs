//! Expansion and active-node state for the course navigation tree.

use std::collections::HashSet;

use course_core::model::ChapterId;
use course_core::route::{ChapterTab, CourseRoute};

/// Which chapter nodes are open, and which one the route points at.
///
/// Every node is a two-state machine (collapsed / expanded). Navigation
/// forces the target chapter open; user toggles flip any single node without
/// touching the rest, so any number of nodes can be open at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<ChapterId>,
    active_chapter: Option<ChapterId>,
    active_tab: ChapterTab,
}

impl ExpansionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State as derived from an initial location.
    #[must_use]
    pub fn from_route(route: &CourseRoute) -> Self {
        let mut state = Self::new();
        state.route_changed(route);
        state
    }

    #[must_use]
    pub fn is_expanded(&self, chapter_id: ChapterId) -> bool {
        self.expanded.contains(&chapter_id)
    }

    #[must_use]
    pub fn active_chapter(&self) -> Option<ChapterId> {
        self.active_chapter
    }

    #[must_use]
    pub fn active_tab(&self) -> ChapterTab {
        self.active_tab
    }

    /// Flip one chapter between collapsed and expanded.
    pub fn toggle(&mut self, chapter_id: ChapterId) {
        if !self.expanded.remove(&chapter_id) {
            self.expanded.insert(chapter_id);
        }
    }

    /// Apply a navigation: the routed chapter becomes active and is forced
    /// expanded; every other node keeps whatever state it had.
    pub fn route_changed(&mut self, route: &CourseRoute) {
        self.active_chapter = route.chapter_id();
        self.active_tab = route.tab();
        if let Some(chapter_id) = route.chapter_id() {
            self.expanded.insert(chapter_id);
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::CourseId;

    fn chapter_route(chapter: u64, tab: ChapterTab) -> CourseRoute {
        CourseRoute::chapter(CourseId::new(1), ChapterId::new(chapter), tab)
    }

    #[test]
    fn toggling_one_chapter_leaves_others_alone() {
        let mut state = ExpansionState::new();
        state.toggle(ChapterId::new(1));
        state.toggle(ChapterId::new(2));

        state.toggle(ChapterId::new(1));

        assert!(!state.is_expanded(ChapterId::new(1)));
        assert!(state.is_expanded(ChapterId::new(2)));
    }

    #[test]
    fn navigation_always_expands_the_target() {
        let mut state = ExpansionState::new();
        state.route_changed(&chapter_route(3, ChapterTab::Content));
        assert!(state.is_expanded(ChapterId::new(3)));

        // Collapse it, navigate to it again: expanded again.
        state.toggle(ChapterId::new(3));
        assert!(!state.is_expanded(ChapterId::new(3)));
        state.route_changed(&chapter_route(3, ChapterTab::Quiz));
        assert!(state.is_expanded(ChapterId::new(3)));
        assert_eq!(state.active_tab(), ChapterTab::Quiz);
    }

    #[test]
    fn navigation_does_not_collapse_other_chapters() {
        let mut state = ExpansionState::new();
        state.toggle(ChapterId::new(1));
        state.route_changed(&chapter_route(2, ChapterTab::Content));

        assert!(state.is_expanded(ChapterId::new(1)));
        assert!(state.is_expanded(ChapterId::new(2)));
        assert_eq!(state.active_chapter(), Some(ChapterId::new(2)));
    }

    #[test]
    fn course_root_route_clears_the_active_chapter() {
        let mut state = ExpansionState::from_route(&chapter_route(2, ChapterTab::Files));
        assert_eq!(state.active_chapter(), Some(ChapterId::new(2)));

        state.route_changed(&CourseRoute::course(CourseId::new(1)));
        assert_eq!(state.active_chapter(), None);
        // The previously-active chapter stays expanded.
        assert!(state.is_expanded(ChapterId::new(2)));
    }
}

//! Folds freshly-fetched snapshots into existing view state.
//!
//! The backend is authoritative for everything it sends; the only fields
//! that survive a merge untouched are the ones it does not know about: quiz
//! availability discovered by the per-chapter poll, and the degraded markers
//! set when a poll dies.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use course_core::model::{Chapter, ChapterId, ChapterSnapshot, Course};

/// A chapter plus its locally-derived fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterEntry {
    chapter: Chapter,
    has_questions: bool,
    quiz_poll_degraded: bool,
}

impl ChapterEntry {
    fn fresh(chapter: Chapter) -> Self {
        Self {
            chapter,
            has_questions: false,
            quiz_poll_degraded: false,
        }
    }

    #[must_use]
    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    /// Monotonic: once true, stays true across every later merge.
    #[must_use]
    pub fn has_questions(&self) -> bool {
        self.has_questions
    }

    /// True when this chapter's quiz poll died on a fetch error; the entry
    /// itself stays last-known-good.
    #[must_use]
    pub fn quiz_poll_degraded(&self) -> bool {
        self.quiz_poll_degraded
    }
}

/// Which chapter ids a merge added and removed, so the caller can start and
/// stop the matching quiz polls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterDelta {
    pub added: Vec<ChapterId>,
    pub removed: Vec<ChapterId>,
}

/// Merged state for one course view: the course, its chapters in backend
/// order, and the local-only flags layered on top.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseState {
    course: Course,
    chapters: Vec<ChapterEntry>,
    last_synced_at: DateTime<Utc>,
    course_poll_degraded: bool,
}

impl CourseState {
    #[must_use]
    pub fn new(course: Course, now: DateTime<Utc>) -> Self {
        Self {
            course,
            chapters: Vec::new(),
            last_synced_at: now,
            course_poll_degraded: false,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn chapters(&self) -> &[ChapterEntry] {
        &self.chapters
    }

    #[must_use]
    pub fn chapter_ids(&self) -> Vec<ChapterId> {
        self.chapters.iter().map(|e| e.chapter.id()).collect()
    }

    #[must_use]
    pub fn last_synced_at(&self) -> DateTime<Utc> {
        self.last_synced_at
    }

    #[must_use]
    pub fn course_poll_degraded(&self) -> bool {
        self.course_poll_degraded
    }

    /// Replace the course wholesale; it has no local-only fields.
    pub fn merge_course(&mut self, fetched: Course) {
        self.course = fetched;
    }

    /// Fold a fetched chapter list into the current one.
    ///
    /// Membership and order follow the fetched sequence. A fetched chapter
    /// whose id is already present keeps its local-only fields; a new id
    /// enters with `has_questions = false`; ids the backend stopped sending
    /// are dropped. Entries without an id never make it in; they are
    /// filtered here, not in the view layer.
    pub fn merge_chapters(
        &mut self,
        fetched: Vec<ChapterSnapshot>,
        now: DateTime<Utc>,
    ) -> ChapterDelta {
        let mut previous: HashMap<ChapterId, ChapterEntry> = self
            .chapters
            .drain(..)
            .map(|entry| (entry.chapter.id(), entry))
            .collect();

        let mut next = Vec::with_capacity(fetched.len());
        let mut added = Vec::new();
        for snapshot in fetched {
            let Some(chapter) = snapshot.into_chapter() else {
                continue;
            };
            let id = chapter.id();
            let entry = match previous.remove(&id) {
                Some(existing) => ChapterEntry {
                    chapter,
                    has_questions: existing.has_questions,
                    quiz_poll_degraded: existing.quiz_poll_degraded,
                },
                None => {
                    added.push(id);
                    ChapterEntry::fresh(chapter)
                }
            };
            next.push(entry);
        }

        self.chapters = next;
        self.last_synced_at = now;
        ChapterDelta {
            added,
            removed: previous.into_keys().collect(),
        }
    }

    /// One-way flip of a chapter's quiz availability.
    ///
    /// Returns whether anything changed (unknown ids and already-set flags
    /// are no-ops).
    pub fn mark_has_questions(&mut self, chapter_id: ChapterId) -> bool {
        match self
            .chapters
            .iter_mut()
            .find(|entry| entry.chapter.id() == chapter_id)
        {
            Some(entry) if !entry.has_questions => {
                entry.has_questions = true;
                true
            }
            _ => false,
        }
    }

    pub fn mark_quiz_poll_degraded(&mut self, chapter_id: ChapterId) {
        if let Some(entry) = self
            .chapters
            .iter_mut()
            .find(|entry| entry.chapter.id() == chapter_id)
        {
            entry.quiz_poll_degraded = true;
        }
    }

    pub fn mark_course_poll_degraded(&mut self) {
        self.course_poll_degraded = true;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{CourseId, CourseStatus};
    use course_core::time::fixed_now;

    fn course(status: CourseStatus) -> Course {
        Course::new(
            CourseId::new(1),
            Some("Rust".into()),
            None,
            status,
            false,
            None,
        )
    }

    fn snapshot(id: Option<u64>, caption: &str) -> ChapterSnapshot {
        ChapterSnapshot {
            id: id.map(ChapterId::new),
            caption: caption.into(),
            is_completed: false,
            file_count: 0,
        }
    }

    #[test]
    fn merge_inserts_fresh_chapters_without_questions() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        let delta = state.merge_chapters(
            vec![snapshot(Some(1), "A"), snapshot(Some(2), "B")],
            fixed_now(),
        );

        assert_eq!(delta.added, vec![ChapterId::new(1), ChapterId::new(2)]);
        assert!(delta.removed.is_empty());
        assert!(state.chapters().iter().all(|e| !e.has_questions()));
    }

    #[test]
    fn merge_is_server_authoritative_but_preserves_local_flags() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        state.merge_chapters(vec![snapshot(Some(1), "A"), snapshot(Some(2), "B")], fixed_now());
        assert!(state.mark_has_questions(ChapterId::new(1)));

        // Server dropped 1, kept 2 (renamed), added 3.
        let delta = state.merge_chapters(
            vec![snapshot(Some(2), "X"), snapshot(Some(3), "Y")],
            fixed_now(),
        );

        assert_eq!(delta.added, vec![ChapterId::new(3)]);
        assert_eq!(delta.removed, vec![ChapterId::new(1)]);

        let chapters = state.chapters();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].chapter().id(), ChapterId::new(2));
        assert_eq!(chapters[0].chapter().caption(), "X");
        assert!(!chapters[0].has_questions());
        assert_eq!(chapters[1].chapter().id(), ChapterId::new(3));
        assert_eq!(chapters[1].chapter().caption(), "Y");
        assert!(!chapters[1].has_questions());
    }

    #[test]
    fn has_questions_survives_merges_once_set() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        state.merge_chapters(vec![snapshot(Some(5), "Quiz me")], fixed_now());
        assert!(state.mark_has_questions(ChapterId::new(5)));

        for round in 0..3 {
            state.merge_chapters(
                vec![snapshot(Some(5), &format!("rename {round}"))],
                fixed_now(),
            );
            assert!(state.chapters()[0].has_questions(), "round {round}");
        }
    }

    #[test]
    fn mark_has_questions_is_one_way_and_idempotent() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        state.merge_chapters(vec![snapshot(Some(1), "A")], fixed_now());

        assert!(state.mark_has_questions(ChapterId::new(1)));
        assert!(!state.mark_has_questions(ChapterId::new(1)));
        assert!(!state.mark_has_questions(ChapterId::new(99)));
        assert!(state.chapters()[0].has_questions());
    }

    #[test]
    fn idless_chapters_are_filtered_at_the_merge_boundary() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        let delta = state.merge_chapters(
            vec![
                snapshot(Some(1), "A"),
                snapshot(None, "placeholder"),
                snapshot(Some(2), "B"),
            ],
            fixed_now(),
        );

        assert_eq!(delta.added, vec![ChapterId::new(1), ChapterId::new(2)]);
        assert_eq!(state.chapters().len(), 2);
    }

    #[test]
    fn merge_course_replaces_every_field() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        state.merge_course(course(CourseStatus::Finished));
        assert_eq!(state.course().status(), CourseStatus::Finished);
    }

    #[test]
    fn order_follows_the_fetched_sequence() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        state.merge_chapters(vec![snapshot(Some(1), "A"), snapshot(Some(2), "B")], fixed_now());
        state.merge_chapters(vec![snapshot(Some(2), "B"), snapshot(Some(1), "A")], fixed_now());

        let ids = state.chapter_ids();
        assert_eq!(ids, vec![ChapterId::new(2), ChapterId::new(1)]);
    }

    #[test]
    fn degraded_markers_survive_merges() {
        let mut state = CourseState::new(course(CourseStatus::Creating), fixed_now());
        state.merge_chapters(vec![snapshot(Some(1), "A")], fixed_now());
        state.mark_quiz_poll_degraded(ChapterId::new(1));
        state.mark_course_poll_degraded();

        state.merge_chapters(vec![snapshot(Some(1), "A v2")], fixed_now());
        assert!(state.chapters()[0].quiz_poll_degraded());
        assert!(state.course_poll_degraded());
    }
}

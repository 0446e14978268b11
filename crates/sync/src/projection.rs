//! Pure mapping from merged state to a render tree.
//!
//! The tree is plain data; whatever renders it (terminal, GUI, web view)
//! decides the chrome. No I/O and no mutation happen here.

use course_core::model::{ChapterId, CourseId, CourseStatus};
use course_core::route::ChapterTab;

use crate::convergence::CourseState;
use crate::nav::ExpansionState;

/// Render tree for the course sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarTree {
    pub course_id: CourseId,
    pub title: Option<String>,
    pub status: CourseStatus,
    /// True while the backend is still generating chapters.
    pub generating: bool,
    /// The course-level poll died; chapter membership may be stale.
    pub degraded: bool,
    pub chapters: Vec<ChapterNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterNode {
    pub id: ChapterId,
    /// 1-based position in backend order, used for the "3. Title" captions.
    pub ordinal: usize,
    pub caption: String,
    pub is_completed: bool,
    pub is_active: bool,
    pub is_expanded: bool,
    /// This chapter's quiz poll died; quiz availability may be stale.
    pub degraded: bool,
    pub tabs: Vec<TabItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabItem {
    pub tab: ChapterTab,
    pub is_active: bool,
}

/// Project merged course state plus navigation state into the sidebar tree.
#[must_use]
pub fn project(state: &CourseState, nav: &ExpansionState) -> SidebarTree {
    let chapters = state
        .chapters()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let chapter = entry.chapter();
            let is_active = nav.active_chapter() == Some(chapter.id());

            let mut tabs = vec![tab_item(ChapterTab::Content, is_active, nav)];
            if chapter.file_count() > 0 {
                tabs.push(tab_item(ChapterTab::Files, is_active, nav));
            }
            if entry.has_questions() {
                tabs.push(tab_item(ChapterTab::Quiz, is_active, nav));
            }

            ChapterNode {
                id: chapter.id(),
                ordinal: index + 1,
                caption: chapter.caption().to_string(),
                is_completed: chapter.is_completed(),
                is_active,
                is_expanded: nav.is_expanded(chapter.id()),
                degraded: entry.quiz_poll_degraded(),
                tabs,
            }
        })
        .collect();

    SidebarTree {
        course_id: state.course().id(),
        title: state.course().title().map(str::to_owned),
        status: state.course().status(),
        generating: state.course().status().is_creating(),
        degraded: state.course_poll_degraded(),
        chapters,
    }
}

fn tab_item(tab: ChapterTab, node_active: bool, nav: &ExpansionState) -> TabItem {
    TabItem {
        tab,
        is_active: node_active && nav.active_tab() == tab,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{ChapterSnapshot, Course};
    use course_core::route::CourseRoute;
    use course_core::time::fixed_now;

    fn state_with_chapters(chapters: Vec<ChapterSnapshot>) -> CourseState {
        let course = Course::new(
            CourseId::new(1),
            Some("Rust".into()),
            None,
            CourseStatus::Creating,
            false,
            None,
        );
        let mut state = CourseState::new(course, fixed_now());
        state.merge_chapters(chapters, fixed_now());
        state
    }

    fn snapshot(id: u64, file_count: u32) -> ChapterSnapshot {
        ChapterSnapshot {
            id: Some(ChapterId::new(id)),
            caption: format!("Chapter {id}"),
            is_completed: false,
            file_count,
        }
    }

    #[test]
    fn quiz_tab_appears_only_after_discovery() {
        let mut state = state_with_chapters(vec![snapshot(1, 0)]);
        let nav = ExpansionState::new();

        let before = project(&state, &nav);
        assert_eq!(
            before.chapters[0]
                .tabs
                .iter()
                .map(|t| t.tab)
                .collect::<Vec<_>>(),
            vec![ChapterTab::Content]
        );

        state.mark_has_questions(ChapterId::new(1));
        let after = project(&state, &nav);
        assert!(
            after.chapters[0]
                .tabs
                .iter()
                .any(|t| t.tab == ChapterTab::Quiz)
        );
    }

    #[test]
    fn files_tab_requires_files() {
        let state = state_with_chapters(vec![snapshot(1, 0), snapshot(2, 3)]);
        let tree = project(&state, &ExpansionState::new());

        assert!(
            !tree.chapters[0]
                .tabs
                .iter()
                .any(|t| t.tab == ChapterTab::Files)
        );
        assert!(
            tree.chapters[1]
                .tabs
                .iter()
                .any(|t| t.tab == ChapterTab::Files)
        );
    }

    #[test]
    fn ordinals_follow_backend_order() {
        let state = state_with_chapters(vec![snapshot(9, 0), snapshot(4, 0)]);
        let tree = project(&state, &ExpansionState::new());
        assert_eq!(tree.chapters[0].ordinal, 1);
        assert_eq!(tree.chapters[0].id, ChapterId::new(9));
        assert_eq!(tree.chapters[1].ordinal, 2);
    }

    #[test]
    fn active_chapter_and_tab_come_from_navigation() {
        let state = state_with_chapters(vec![snapshot(1, 2), snapshot(2, 0)]);
        let nav = ExpansionState::from_route(&CourseRoute::chapter(
            CourseId::new(1),
            ChapterId::new(1),
            ChapterTab::Files,
        ));

        let tree = project(&state, &nav);
        assert!(tree.chapters[0].is_active);
        assert!(tree.chapters[0].is_expanded);
        assert!(!tree.chapters[1].is_active);

        let files_tab = tree.chapters[0]
            .tabs
            .iter()
            .find(|t| t.tab == ChapterTab::Files)
            .unwrap();
        assert!(files_tab.is_active);
        let content_tab = tree.chapters[0]
            .tabs
            .iter()
            .find(|t| t.tab == ChapterTab::Content)
            .unwrap();
        assert!(!content_tab.is_active);
    }

    #[test]
    fn generating_flag_tracks_status() {
        let state = state_with_chapters(vec![]);
        let tree = project(&state, &ExpansionState::new());
        assert!(tree.generating);
        assert_eq!(tree.status, CourseStatus::Creating);
    }
}

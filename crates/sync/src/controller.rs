//! Orchestrates one course view: initial load, course-level and per-chapter
//! polls, navigation state, and teardown.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

use client::api::CourseApi;
use client::error::ApiError;
use course_core::model::{ChapterId, ChapterSnapshot, Course, CourseId};
use course_core::route::CourseRoute;
use course_core::time::Clock;

use crate::config::SyncConfig;
use crate::convergence::CourseState;
use crate::nav::ExpansionState;
use crate::projection::{SidebarTree, project};
use crate::scheduler::PollScheduler;

/// Poll registry key: one course-level poll, one quiz poll per chapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PollKey {
    Course,
    Quiz(ChapterId),
}

/// A failed initial load. Poll failures never surface here; they only stop
/// the failing key and leave rendered state as last-known-good.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

struct ViewState {
    course_id: Option<CourseId>,
    course: Option<CourseState>,
    nav: ExpansionState,
    version: u64,
}

struct Shared {
    view: Mutex<ViewState>,
    changes: watch::Sender<u64>,
}

/// Sync controller for one course view.
///
/// Cheap to clone; clones share state and polls. Owns every poll it starts:
/// loading a different course or calling [`shutdown`](Self::shutdown) cancels
/// all of them unconditionally.
#[derive(Clone)]
pub struct CourseSyncController {
    api: Arc<dyn CourseApi>,
    config: SyncConfig,
    clock: Clock,
    scheduler: PollScheduler<PollKey>,
    shared: Arc<Shared>,
}

impl CourseSyncController {
    #[must_use]
    pub fn new(api: Arc<dyn CourseApi>, config: SyncConfig) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            api,
            config,
            clock: Clock::default(),
            scheduler: PollScheduler::new(),
            shared: Arc::new(Shared {
                view: Mutex::new(ViewState {
                    course_id: None,
                    course: None,
                    nav: ExpansionState::new(),
                    version: 0,
                }),
                changes,
            }),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Receiver that observes a version bump on every state change.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }

    /// Enter a course view: fetch course and chapters concurrently, then wire
    /// up the polls.
    ///
    /// Any polls from a previously-loaded course are stopped first,
    /// regardless of their completion state. The course-level poll only runs
    /// while the course is still being created; a quiz poll starts for every
    /// chapter.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` when either initial fetch fails; nothing is
    /// rendered in that case and the caller may retry.
    pub async fn load(&self, course_id: CourseId) -> Result<(), LoadError> {
        self.scheduler.stop_all();

        let (course, chapters) = tokio::try_join!(
            self.api.fetch_course(course_id),
            self.api.fetch_chapters(course_id)
        )?;
        let status = course.status();

        let added = {
            let mut view = self.lock_view();
            let mut state = CourseState::new(course, self.clock.now());
            let delta = state.merge_chapters(chapters, self.clock.now());
            view.course_id = Some(course_id);
            view.course = Some(state);
            view.nav = ExpansionState::new();
            delta.added
        };
        self.notify();

        if status.is_creating() {
            self.start_course_poll(course_id);
        }
        for chapter_id in added {
            self.start_quiz_poll(course_id, chapter_id);
        }
        Ok(())
    }

    /// Stop every poll for this view. Idempotent; state stays readable.
    pub fn shutdown(&self) {
        self.scheduler.stop_all();
    }

    /// Apply a navigation within the loaded course.
    pub fn route_changed(&self, route: &CourseRoute) {
        {
            let mut view = self.lock_view();
            if view.course_id != Some(route.course_id()) {
                return;
            }
            view.nav.route_changed(route);
        }
        self.notify();
    }

    /// User clicked a chapter header: flip its expansion.
    pub fn toggle_chapter(&self, chapter_id: ChapterId) {
        {
            let mut view = self.lock_view();
            view.nav.toggle(chapter_id);
        }
        self.notify();
    }

    /// Current render tree, or `None` before the first successful load.
    #[must_use]
    pub fn sidebar(&self) -> Option<SidebarTree> {
        let view = self.lock_view();
        view.course
            .as_ref()
            .map(|state| project(state, &view.nav))
    }

    /// Snapshot of the merged course state.
    #[must_use]
    pub fn course_state(&self) -> Option<CourseState> {
        self.lock_view().course.clone()
    }

    #[must_use]
    pub fn is_polling(&self, key: &PollKey) -> bool {
        self.scheduler.is_active(key)
    }

    #[must_use]
    pub fn active_poll_count(&self) -> usize {
        self.scheduler.active_count()
    }

    fn start_course_poll(&self, course_id: CourseId) {
        let fetch = {
            let api = Arc::clone(&self.api);
            move || {
                let api = Arc::clone(&api);
                async move {
                    let (course, chapters) = tokio::try_join!(
                        api.fetch_course(course_id),
                        api.fetch_chapters(course_id)
                    )?;
                    Ok::<_, ApiError>((course, chapters))
                }
            }
        };
        let on_success = {
            let controller = self.clone();
            move |(course, chapters): (Course, Vec<ChapterSnapshot>)| {
                controller.apply_course_tick(course_id, course, chapters);
            }
        };
        let on_failure = {
            let controller = self.clone();
            move |_err: ApiError| controller.apply_course_degraded(course_id)
        };
        self.scheduler.start(
            PollKey::Course,
            self.config.course_poll_interval,
            fetch,
            on_success,
            |(course, _): &(Course, Vec<ChapterSnapshot>)| course.status().is_terminal(),
            on_failure,
        );
    }

    fn start_quiz_poll(&self, course_id: CourseId, chapter_id: ChapterId) {
        let fetch = {
            let api = Arc::clone(&self.api);
            move || {
                let api = Arc::clone(&api);
                async move { api.fetch_chapter_question_count(course_id, chapter_id).await }
            }
        };
        let on_success = {
            let controller = self.clone();
            move |count: usize| {
                if count > 0 {
                    controller.apply_quiz_found(course_id, chapter_id);
                }
            }
        };
        let on_failure = {
            let controller = self.clone();
            move |_err: ApiError| controller.apply_quiz_degraded(course_id, chapter_id)
        };
        self.scheduler.start(
            PollKey::Quiz(chapter_id),
            self.config.quiz_poll_interval,
            fetch,
            on_success,
            |count: &usize| *count > 0,
            on_failure,
        );
    }

    /// Merge one course-poll result, then reconcile quiz polls with the new
    /// chapter id set: fresh chapters start polling, vanished ones stop.
    fn apply_course_tick(
        &self,
        course_id: CourseId,
        course: Course,
        chapters: Vec<ChapterSnapshot>,
    ) {
        let delta = {
            let mut view = self.lock_view();
            if view.course_id != Some(course_id) {
                return;
            }
            let Some(state) = view.course.as_mut() else {
                return;
            };
            state.merge_course(course);
            state.merge_chapters(chapters, self.clock.now())
        };
        self.notify();

        for chapter_id in delta.removed {
            self.scheduler.stop(&PollKey::Quiz(chapter_id));
        }
        for chapter_id in delta.added {
            self.start_quiz_poll(course_id, chapter_id);
        }
    }

    fn apply_quiz_found(&self, course_id: CourseId, chapter_id: ChapterId) {
        let changed = {
            let mut view = self.lock_view();
            if view.course_id != Some(course_id) {
                return;
            }
            view.course
                .as_mut()
                .is_some_and(|state| state.mark_has_questions(chapter_id))
        };
        if changed {
            self.notify();
        }
    }

    fn apply_quiz_degraded(&self, course_id: CourseId, chapter_id: ChapterId) {
        {
            let mut view = self.lock_view();
            if view.course_id != Some(course_id) {
                return;
            }
            if let Some(state) = view.course.as_mut() {
                state.mark_quiz_poll_degraded(chapter_id);
            }
        }
        self.notify();
    }

    fn apply_course_degraded(&self, course_id: CourseId) {
        {
            let mut view = self.lock_view();
            if view.course_id != Some(course_id) {
                return;
            }
            if let Some(state) = view.course.as_mut() {
                state.mark_course_poll_degraded();
            }
        }
        self.notify();
    }

    fn notify(&self) {
        let version = {
            let mut view = self.lock_view();
            view.version += 1;
            view.version
        };
        let _ = self.shared.changes.send(version);
    }

    fn lock_view(&self) -> MutexGuard<'_, ViewState> {
        self.shared
            .view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

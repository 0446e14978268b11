//! Async interfaces to the course backend.
//!
//! The sync layer and tests depend on these traits rather than on HTTP, so a
//! scripted in-memory backend can stand in for the real one.

use async_trait::async_trait;

use course_core::model::{
    ChapterId, ChapterSnapshot, Course, CourseId, CourseSummary, CourseUpdate, DocumentId,
    ImageId, NewCourse,
};

use crate::error::ApiError;

/// Read surface the sync controller polls against.
///
/// All calls are idempotent reads with no client-side retry; retry policy is
/// the poll scheduler's concern.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Fetch a single course.
    ///
    /// # Errors
    ///
    /// `ApiError::NotFound` when the course no longer exists, otherwise the
    /// transport/decode taxonomy.
    async fn fetch_course(&self, course_id: CourseId) -> Result<Course, ApiError>;

    /// Fetch the course's chapter list in backend order.
    ///
    /// Entries may lack an identifier mid-generation; the convergence layer
    /// filters those, not this one.
    async fn fetch_chapters(&self, course_id: CourseId)
    -> Result<Vec<ChapterSnapshot>, ApiError>;

    /// Number of generated quiz questions for a chapter; ≥ 1 means the quiz
    /// tab can be shown.
    async fn fetch_chapter_question_count(
        &self,
        course_id: CourseId,
        chapter_id: ChapterId,
    ) -> Result<usize, ApiError>;
}

/// Course management outside the polling core: listing, creation, editing,
/// uploads. Plain request/response, no special concurrency handling.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn list_my_courses(&self) -> Result<Vec<CourseSummary>, ApiError>;

    async fn list_public_courses(&self) -> Result<Vec<CourseSummary>, ApiError>;

    /// Kick off generation of a new course; returns the id to navigate to.
    async fn create_course(&self, draft: &NewCourse) -> Result<CourseId, ApiError>;

    /// Apply a partial update (rename / visibility) and return the new state.
    async fn update_course(
        &self,
        course_id: CourseId,
        update: &CourseUpdate,
    ) -> Result<Course, ApiError>;

    async fn delete_course(&self, course_id: CourseId) -> Result<(), ApiError>;

    /// Upload a source document to attach to a creation request.
    async fn upload_document(&self, file_name: &str, bytes: Vec<u8>)
    -> Result<DocumentId, ApiError>;

    /// Upload an image to attach to a creation request.
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImageId, ApiError>;
}

//
// ─── ACCOUNTS ──────────────────────────────────────────────────────────────────
//

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Opaque bearer token returned by login/register.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token value stays out of logs.
        f.write_str("AuthToken(***)")
    }
}

/// The signed-in user's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub profile_image_base64: Option<String>,
}

/// Authentication and account surface.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ApiError>;

    async fn register(&self, account: &NewAccount) -> Result<AuthToken, ApiError>;

    async fn current_user(&self) -> Result<Account, ApiError>;
}

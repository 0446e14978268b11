use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, DocumentId, ImageId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Error for an unrecognized course status tag on the wire.
///
/// The backend encodes status as `"CourseStatus.CREATING"` etc. Anything else
/// is treated as a malformed payload rather than silently falling through.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized course status: {raw}")]
pub struct StatusParseError {
    pub raw: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseDraftError {
    #[error("course query cannot be empty")]
    EmptyQuery,

    #[error("study time must be > 0 hours")]
    InvalidTimeHours,
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Generation lifecycle of a course.
///
/// `Creating` is the only value that keeps the course-level poll alive;
/// `Completed` and `Finished` are both terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseStatus {
    Creating,
    InProgress,
    Completed,
    Finished,
}

impl CourseStatus {
    /// Returns the tag used by the backend for this status.
    #[must_use]
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            CourseStatus::Creating => "CourseStatus.CREATING",
            CourseStatus::InProgress => "CourseStatus.IN_PROGRESS",
            CourseStatus::Completed => "CourseStatus.COMPLETED",
            CourseStatus::Finished => "CourseStatus.FINISHED",
        }
    }

    /// True while the backend is still generating chapters for the course.
    #[must_use]
    pub fn is_creating(&self) -> bool {
        matches!(self, CourseStatus::Creating)
    }

    /// True once generation can no longer add chapters.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CourseStatus::Completed | CourseStatus::Finished)
    }
}

impl FromStr for CourseStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both the prefixed form the API emits and the bare enum name.
        let tag = s.strip_prefix("CourseStatus.").unwrap_or(s);
        match tag {
            "CREATING" => Ok(CourseStatus::Creating),
            "IN_PROGRESS" => Ok(CourseStatus::InProgress),
            "COMPLETED" => Ok(CourseStatus::Completed),
            "FINISHED" => Ok(CourseStatus::Finished),
            _ => Err(StatusParseError { raw: s.to_string() }),
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CourseStatus::Creating => "creating",
            CourseStatus::InProgress => "in progress",
            CourseStatus::Completed => "completed",
            CourseStatus::Finished => "finished",
        };
        write!(f, "{label}")
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// A course as cached on the client.
///
/// Read-mostly: replaced wholesale on every refresh, discarded when the view
/// navigates away. The backend is authoritative for every field.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    title: Option<String>,
    description: Option<String>,
    status: CourseStatus,
    is_public: bool,
    image_url: Option<String>,
}

impl Course {
    #[must_use]
    pub fn new(
        id: CourseId,
        title: Option<String>,
        description: Option<String>,
        status: CourseStatus,
        is_public: bool,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id,
            title: normalize_text(title),
            description: normalize_text(description),
            status,
            is_public,
            image_url,
        }
    }

    #[must_use]
    pub fn id(&self) -> CourseId {
        self.id
    }

    /// Title as entered, or `None` while generation has not produced one yet.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> CourseStatus {
        self.status
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// The backend serializes missing text as the literal string "None".
fn normalize_text(value: Option<String>) -> Option<String> {
    match value {
        Some(s) if s.trim().is_empty() || s == "None" => None,
        other => other,
    }
}

//
// ─── LISTING ───────────────────────────────────────────────────────────────────
//

/// Listing shape for the dashboard and public-courses pages.
///
/// Never merged into sync state; progress is derived from the chapter counts
/// the listing endpoints include.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: CourseStatus,
    pub is_public: bool,
    pub image_url: Option<String>,
    pub chapter_count: u32,
    pub completed_chapter_count: u32,
}

impl CourseSummary {
    /// Completion percentage shown on course cards.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        match self.status {
            CourseStatus::Completed | CourseStatus::Finished => 100,
            CourseStatus::Creating => 0,
            CourseStatus::InProgress => {
                if self.chapter_count == 0 {
                    0
                } else {
                    (100 * self.completed_chapter_count) / self.chapter_count
                }
            }
        }
    }
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

/// Requested difficulty for a generated course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    University,
}

/// Validated request to generate a new course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCourse {
    pub query: String,
    pub time_hours: u32,
    pub language: String,
    pub difficulty: Difficulty,
    pub document_ids: Vec<DocumentId>,
    pub picture_ids: Vec<ImageId>,
}

impl NewCourse {
    /// Build a creation request.
    ///
    /// # Errors
    ///
    /// Returns `CourseDraftError` when the query is blank or the requested
    /// study time is zero.
    pub fn new(
        query: impl Into<String>,
        time_hours: u32,
        language: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, CourseDraftError> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(CourseDraftError::EmptyQuery);
        }
        if time_hours == 0 {
            return Err(CourseDraftError::InvalidTimeHours);
        }
        Ok(Self {
            query,
            time_hours,
            language: language.into(),
            difficulty,
            document_ids: Vec::new(),
            picture_ids: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_documents(mut self, document_ids: Vec<DocumentId>) -> Self {
        self.document_ids = document_ids;
        self
    }

    #[must_use]
    pub fn with_pictures(mut self, picture_ids: Vec<ImageId>) -> Self {
        self.picture_ids = picture_ids;
        self
    }
}

/// Partial update for the rename / visibility dialogs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CourseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

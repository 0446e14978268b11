//! Wire shapes for the course backend, kept separate from the domain model.
//!
//! Conversions into `course-core` types happen here so malformed payloads are
//! rejected at one boundary and the rest of the client never sees raw JSON.

use serde::Deserialize;

use course_core::model::{
    ChapterId, ChapterSnapshot, Course, CourseId, CourseStatus, CourseSummary,
};

use crate::api::Account;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct CoursePayload {
    pub course_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CoursePayload {
    pub(crate) fn into_course(self) -> Result<Course, ApiError> {
        let status = parse_status(&self.status)?;
        Ok(Course::new(
            CourseId::new(self.course_id),
            self.title,
            self.description,
            status,
            self.is_public,
            self.image_url,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterPayload {
    // Mid-generation the backend can emit rows without an id yet.
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub file_count: u32,
}

impl ChapterPayload {
    pub(crate) fn into_snapshot(self) -> ChapterSnapshot {
        ChapterSnapshot {
            id: self.id.map(ChapterId::new),
            caption: self.caption.unwrap_or_default(),
            is_completed: self.is_completed,
            file_count: self.file_count,
        }
    }
}

/// Question bodies are opaque to the navigation layer; only their count
/// matters.
#[derive(Debug, Deserialize)]
pub(crate) struct QuestionPayload {}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseSummaryPayload {
    pub course_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub chapter_count: u32,
    #[serde(default)]
    pub completed_chapter_count: u32,
}

impl CourseSummaryPayload {
    pub(crate) fn into_summary(self) -> Result<CourseSummary, ApiError> {
        let status = parse_status(&self.status)?;
        Ok(CourseSummary {
            id: CourseId::new(self.course_id),
            title: self.title,
            description: self.description,
            status,
            is_public: self.is_public,
            image_url: self.image_url,
            chapter_count: self.chapter_count,
            completed_chapter_count: self.completed_chapter_count,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedCoursePayload {
    pub course_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadPayload {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenPayload {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountPayload {
    pub id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub profile_image_base64: Option<String>,
}

impl AccountPayload {
    pub(crate) fn into_account(self) -> Account {
        Account {
            id: self.id,
            username: self.username,
            email: self.email,
            is_admin: self.is_admin,
            profile_image_base64: self.profile_image_base64,
        }
    }
}

fn parse_status(raw: &str) -> Result<CourseStatus, ApiError> {
    raw.parse()
        .map_err(|err: course_core::model::StatusParseError| ApiError::Decode(err.to_string()))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_payload_converts() {
        let payload: CoursePayload = serde_json::from_str(
            r#"{
                "course_id": 12,
                "title": "Intro to Rust",
                "description": null,
                "status": "CourseStatus.CREATING",
                "is_public": true,
                "image_url": "https://cdn.example/c12.png"
            }"#,
        )
        .unwrap();
        let course = payload.into_course().unwrap();
        assert_eq!(course.id(), CourseId::new(12));
        assert_eq!(course.title(), Some("Intro to Rust"));
        assert_eq!(course.status(), CourseStatus::Creating);
        assert!(course.is_public());
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let payload: CoursePayload = serde_json::from_str(
            r#"{"course_id": 1, "status": "CourseStatus.ARCHIVED"}"#,
        )
        .unwrap();
        assert!(matches!(
            payload.into_course().unwrap_err(),
            ApiError::Decode(_)
        ));
    }

    #[test]
    fn chapter_payload_tolerates_missing_fields() {
        let payload: ChapterPayload = serde_json::from_str(r#"{"caption": "Traits"}"#).unwrap();
        let snapshot = payload.into_snapshot();
        assert_eq!(snapshot.id, None);
        assert_eq!(snapshot.caption, "Traits");
        assert!(!snapshot.is_completed);
        assert_eq!(snapshot.file_count, 0);
    }

    #[test]
    fn chapter_payload_with_id() {
        let payload: ChapterPayload = serde_json::from_str(
            r#"{"id": 4, "caption": "Lifetimes", "is_completed": true, "file_count": 3}"#,
        )
        .unwrap();
        let snapshot = payload.into_snapshot();
        assert_eq!(snapshot.id, Some(ChapterId::new(4)));
        assert!(snapshot.is_completed);
    }

    #[test]
    fn question_payloads_ignore_their_fields() {
        let questions: Vec<QuestionPayload> = serde_json::from_str(
            r#"[{"id": 1, "text": "What is a borrow?"}, {"id": 2, "text": "Name the traits"}]"#,
        )
        .unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[test]
    fn summary_payload_converts_with_counts() {
        let payload: CourseSummaryPayload = serde_json::from_str(
            r#"{
                "course_id": 3,
                "title": "Linear Algebra",
                "status": "CourseStatus.IN_PROGRESS",
                "chapter_count": 10,
                "completed_chapter_count": 4
            }"#,
        )
        .unwrap();
        let summary = payload.into_summary().unwrap();
        assert_eq!(summary.chapter_count, 10);
        assert_eq!(summary.progress_percent(), 40);
    }
}

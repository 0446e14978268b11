use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::model::{ChapterId, CourseId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    #[error("location is not a parseable URL or path")]
    Malformed,

    #[error("location is not a course route")]
    NotCourseRoute,

    #[error("course segment is not a valid id: {raw}")]
    InvalidCourseId { raw: String },

    #[error("chapter segment is not a valid id: {raw}")]
    InvalidChapterId { raw: String },
}

//
// ─── TABS ──────────────────────────────────────────────────────────────────────
//

/// Tab within a chapter view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChapterTab {
    #[default]
    Content,
    Files,
    Quiz,
}

impl ChapterTab {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterTab::Content => "content",
            ChapterTab::Files => "files",
            ChapterTab::Quiz => "quiz",
        }
    }
}

impl fmt::Display for ChapterTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTab(pub String);

impl fmt::Display for UnknownTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown chapter tab: {}", self.0)
    }
}

impl std::error::Error for UnknownTab {}

impl FromStr for ChapterTab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(ChapterTab::Content),
            "files" => Ok(ChapterTab::Files),
            "quiz" => Ok(ChapterTab::Quiz),
            other => Err(UnknownTab(other.to_string())),
        }
    }
}

//
// ─── ROUTE ─────────────────────────────────────────────────────────────────────
//

/// Parsed course location:
/// `/dashboard/courses/{courseId}[/chapters/{chapterId}][?tab=content|files|quiz]`.
///
/// An unrecognized or missing `tab` value falls back to `Content`, mirroring
/// how the navigation treats any unexpected tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseRoute {
    course_id: CourseId,
    chapter_id: Option<ChapterId>,
    tab: ChapterTab,
}

impl CourseRoute {
    #[must_use]
    pub fn course(course_id: CourseId) -> Self {
        Self {
            course_id,
            chapter_id: None,
            tab: ChapterTab::default(),
        }
    }

    #[must_use]
    pub fn chapter(course_id: CourseId, chapter_id: ChapterId, tab: ChapterTab) -> Self {
        Self {
            course_id,
            chapter_id: Some(chapter_id),
            tab,
        }
    }

    /// Parse a location, given either as an absolute URL or an app path.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::NotCourseRoute` for any location outside
    /// `/dashboard/courses/…`, and an id error when a segment is present but
    /// not numeric.
    pub fn parse(location: &str) -> Result<Self, RouteError> {
        let url = if location.contains("://") {
            Url::parse(location).map_err(|_| RouteError::Malformed)?
        } else {
            Url::parse("app://local")
                .and_then(|base| base.join(location))
                .map_err(|_| RouteError::Malformed)?
        };

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let (course_raw, rest) = match segments.as_slice() {
            ["dashboard", "courses", course, rest @ ..] => (*course, rest),
            _ => return Err(RouteError::NotCourseRoute),
        };

        let course_id: CourseId =
            course_raw
                .parse()
                .map_err(|_| RouteError::InvalidCourseId {
                    raw: course_raw.to_string(),
                })?;

        let chapter_id = match rest {
            [] => None,
            ["chapters", chapter] => {
                Some(
                    chapter
                        .parse()
                        .map_err(|_| RouteError::InvalidChapterId {
                            raw: (*chapter).to_string(),
                        })?,
                )
            }
            _ => return Err(RouteError::NotCourseRoute),
        };

        let tab = url
            .query_pairs()
            .find(|(name, _)| name == "tab")
            .map(|(_, value)| value.parse().unwrap_or_default())
            .unwrap_or_default();

        Ok(Self {
            course_id,
            chapter_id,
            tab,
        })
    }

    #[must_use]
    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    #[must_use]
    pub fn chapter_id(&self) -> Option<ChapterId> {
        self.chapter_id
    }

    #[must_use]
    pub fn tab(&self) -> ChapterTab {
        self.tab
    }

    /// Render the route back to an app path, suitable for navigation.
    #[must_use]
    pub fn to_path(&self) -> String {
        match self.chapter_id {
            Some(chapter_id) => format!(
                "/dashboard/courses/{}/chapters/{}?tab={}",
                self.course_id, chapter_id, self.tab
            ),
            None => format!("/dashboard/courses/{}", self.course_id),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_course_root() {
        let route = CourseRoute::parse("/dashboard/courses/12").unwrap();
        assert_eq!(route.course_id(), CourseId::new(12));
        assert_eq!(route.chapter_id(), None);
        assert_eq!(route.tab(), ChapterTab::Content);
    }

    #[test]
    fn parses_chapter_with_tab() {
        let route = CourseRoute::parse("/dashboard/courses/12/chapters/3?tab=quiz").unwrap();
        assert_eq!(route.course_id(), CourseId::new(12));
        assert_eq!(route.chapter_id(), Some(ChapterId::new(3)));
        assert_eq!(route.tab(), ChapterTab::Quiz);
    }

    #[test]
    fn missing_tab_defaults_to_content() {
        let route = CourseRoute::parse("/dashboard/courses/12/chapters/3").unwrap();
        assert_eq!(route.tab(), ChapterTab::Content);
    }

    #[test]
    fn unknown_tab_falls_back_to_content() {
        let route = CourseRoute::parse("/dashboard/courses/12/chapters/3?tab=stats").unwrap();
        assert_eq!(route.tab(), ChapterTab::Content);
    }

    #[test]
    fn parses_absolute_url() {
        let route =
            CourseRoute::parse("https://example.com/dashboard/courses/7/chapters/1?tab=files")
                .unwrap();
        assert_eq!(route.course_id(), CourseId::new(7));
        assert_eq!(route.tab(), ChapterTab::Files);
    }

    #[test]
    fn rejects_non_course_routes() {
        assert_eq!(
            CourseRoute::parse("/dashboard/settings").unwrap_err(),
            RouteError::NotCourseRoute
        );
        assert_eq!(
            CourseRoute::parse("/dashboard/courses/7/files/1").unwrap_err(),
            RouteError::NotCourseRoute
        );
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(matches!(
            CourseRoute::parse("/dashboard/courses/abc").unwrap_err(),
            RouteError::InvalidCourseId { .. }
        ));
        assert!(matches!(
            CourseRoute::parse("/dashboard/courses/1/chapters/x").unwrap_err(),
            RouteError::InvalidChapterId { .. }
        ));
    }

    #[test]
    fn route_round_trips_through_path() {
        let route = CourseRoute::chapter(CourseId::new(5), ChapterId::new(2), ChapterTab::Files);
        let parsed = CourseRoute::parse(&route.to_path()).unwrap();
        assert_eq!(parsed, route);
    }
}

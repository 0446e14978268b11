#![forbid(unsafe_code)]

pub mod model;
pub mod route;
pub mod time;

pub use model::{
    Chapter, ChapterId, ChapterSnapshot, Course, CourseDraftError, CourseId, CourseStatus,
    CourseSummary, CourseUpdate, Difficulty, DocumentId, ImageId, NewCourse, StatusParseError,
};
pub use route::{ChapterTab, CourseRoute, RouteError};
pub use time::Clock;

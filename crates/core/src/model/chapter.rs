use crate::model::ids::ChapterId;

/// A chapter of a generated course.
///
/// The quiz-availability flag lives next to the chapter in the sync layer,
/// not here: it is discovered by a separate poll and is never part of the
/// chapter payload itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    id: ChapterId,
    caption: String,
    is_completed: bool,
    file_count: u32,
}

impl Chapter {
    #[must_use]
    pub fn new(id: ChapterId, caption: impl Into<String>, is_completed: bool, file_count: u32) -> Self {
        Self {
            id,
            caption: caption.into(),
            is_completed,
            file_count,
        }
    }

    #[must_use]
    pub fn id(&self) -> ChapterId {
        self.id
    }

    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn file_count(&self) -> u32 {
        self.file_count
    }
}

/// A chapter as fetched, before convergence.
///
/// While a course is mid-generation the backend can emit placeholder rows
/// without an identifier; those entries are dropped at the convergence
/// boundary, never handed to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSnapshot {
    pub id: Option<ChapterId>,
    pub caption: String,
    pub is_completed: bool,
    pub file_count: u32,
}

impl ChapterSnapshot {
    /// Promote the snapshot to a chapter, if it carries an identifier.
    #[must_use]
    pub fn into_chapter(self) -> Option<Chapter> {
        let id = self.id?;
        Some(Chapter {
            id,
            caption: self.caption,
            is_completed: self.is_completed,
            file_count: self.file_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_with_id_promotes() {
        let snapshot = ChapterSnapshot {
            id: Some(ChapterId::new(4)),
            caption: "Borrowing".into(),
            is_completed: false,
            file_count: 2,
        };
        let chapter = snapshot.into_chapter().unwrap();
        assert_eq!(chapter.id(), ChapterId::new(4));
        assert_eq!(chapter.caption(), "Borrowing");
        assert_eq!(chapter.file_count(), 2);
    }

    #[test]
    fn snapshot_without_id_is_dropped() {
        let snapshot = ChapterSnapshot {
            id: None,
            caption: "pending".into(),
            is_completed: false,
            file_count: 0,
        };
        assert!(snapshot.into_chapter().is_none());
    }
}

use std::time::Duration;

/// Polling cadence for one course view.
///
/// The defaults trade responsiveness against request volume: quiz discovery
/// wants to feel immediate once generation finishes a chapter, while course
/// status moves slowly enough that two seconds is plenty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Cadence of the course-level status/chapter-list poll.
    pub course_poll_interval: Duration,
    /// Cadence of each per-chapter quiz-availability poll.
    pub quiz_poll_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            course_poll_interval: Duration::from_millis(2_000),
            quiz_poll_interval: Duration::from_millis(500),
        }
    }
}

impl SyncConfig {
    /// Create a config suitable for quick unit tests (no real waiting).
    #[must_use]
    pub fn instant() -> Self {
        Self {
            course_poll_interval: Duration::from_millis(5),
            quiz_poll_interval: Duration::from_millis(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cadences() {
        let config = SyncConfig::default();
        assert_eq!(config.course_poll_interval, Duration::from_millis(2_000));
        assert_eq!(config.quiz_poll_interval, Duration::from_millis(500));
    }
}

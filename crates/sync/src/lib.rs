#![forbid(unsafe_code)]

//! Keeps a course navigation tree converged with backend state that arrives
//! progressively while the course is being generated.
//!
//! Fetched snapshots flow from the resource client through the poll
//! scheduler into the convergence reducer; the navigation store and the pure
//! view projection turn the merged result into a render tree.
//! [`CourseSyncController`] wires the pieces together for one course view.

pub mod config;
pub mod controller;
pub mod convergence;
pub mod nav;
pub mod projection;
pub mod scheduler;

pub use config::SyncConfig;
pub use controller::{CourseSyncController, LoadError, PollKey};
pub use convergence::{ChapterDelta, ChapterEntry, CourseState};
pub use nav::ExpansionState;
pub use projection::{ChapterNode, SidebarTree, TabItem, project};
pub use scheduler::PollScheduler;

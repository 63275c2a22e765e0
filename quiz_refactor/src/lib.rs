//! Podcast/quiz relationship refactor.
//!
//! Enforces a 1:1 link between episodes and quizzes: every episode gets a
//! quiz (placeholders are created where missing), unreferenced quizzes are
//! archived, and the `episodes.quiz_id` foreign key is tightened to
//! `NOT NULL` + `ON DELETE CASCADE`. Every forward run hands back a
//! [`RollbackPayload`] that [`rollback::run`] can use to reverse it.
//!
//! Runs execute inside a single database transaction. A dry run performs the
//! same steps and rolls the transaction back, so its report shows the exact
//! would-be effects without changing anything.

pub mod archive;
pub mod audit;
pub mod dashboard;
pub mod error;
pub mod migrate;
pub mod payload;
pub mod rollback;
pub mod run_log;
pub mod schema;
pub mod snapshot;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{RefactorError, RefactorResult, RunFailure};
pub use payload::RollbackPayload;
pub use run_log::{LogEntry, LogLevel, RunLog};

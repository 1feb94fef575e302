//! Kanban board core: task filtering, cached column views, and the
//! bookkeeping a board view needs around them.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod util;

pub use model::{BoardConfig, FilterCriteria, Priority, TaskRecord, TaskStatus};
pub use ops::board::{Board, BoardError};
pub use ops::cache::ResultCache;

pub mod batch;
pub mod board;
pub mod cache;
pub mod filter;
pub mod lifecycle;
pub mod list_state;
pub mod perf;
pub mod sort;

//! 核心类型：错误、共享状态模型

pub mod error;
pub mod state;

pub use error::CanvasError;
pub use state::{DocumentSelection, LogEntry, Resource, SessionState};

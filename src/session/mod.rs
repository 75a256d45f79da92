//! 会话层：共享状态存储、进度投影、资源集合管理

pub mod progress;
pub mod resources;
pub mod store;

pub use progress::{project, ProgressStep, ProgressView};
pub use resources::{AddResourceDialog, EditResourceDialog, ResourceManager};
pub use store::StateStore;

//! 操作员控制台：主循环（app）、命令解析（event）、文本渲染（render）

pub mod app;
pub mod event;
pub mod render;

pub use app::{run_console, run_console_with, ConsoleApp, ConsoleExit, Outcome};
pub use event::{ConsoleCommand, ResourceField};

//! Canvas - 研究画布会话层
//!
//! 人与 Agent 共同编辑同一份研究会话状态（问题、资源、报告草稿、进度日志），
//! Agent 发起的破坏性操作须经人工确认后才会生效。
//!
//! 模块划分：
//! - **actions**: 受控动作注册表与人工确认网关（DeleteResources 等）
//! - **agent**: Agent 通道（订阅共享状态、提议受控动作）
//! - **backend**: 导出 / 源文档通知的后端客户端（reqwest 实现与记录型 Mock）
//! - **canvas**: 画布会话组装
//! - **catalog**: 源文档目录
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话状态类型与错误
//! - **dispatch**: 源文档选择的副作用分发
//! - **events**: 画布事件
//! - **export**: PDF / Codelabs 导出
//! - **session**: 共享状态存储、资源管理、进度投影
//! - **ui**: 操作员控制台
//! - **server**: Agent 桥接 HTTP 服务（web feature）

pub mod actions;
pub mod agent;
pub mod backend;
pub mod canvas;
pub mod catalog;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod events;
pub mod export;
pub mod observability;
#[cfg(feature = "web")]
pub mod server;
pub mod session;
pub mod ui;

pub use canvas::Canvas;
pub use config::{load_config, AppConfig};
pub use core::{CanvasError, DocumentSelection, LogEntry, Resource, SessionState};

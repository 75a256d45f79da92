//! 画布错误类型
//!
//! 校验类 no-op（空 url、编辑目标缺失）与查找未命中不是错误，直接静默跳过；
//! 这里只覆盖网络、IO、配置以及确认网关的协议错误。

use thiserror::Error;

/// 画布会话运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    /// Agent 提议了未注册的受控动作
    #[error("Unknown gated action: {0}")]
    UnknownAction(String),

    /// 与内置受控动作重名，不允许替换
    #[error("Gated action {0} is built in and cannot be replaced")]
    ReservedAction(String),

    #[error("Invalid arguments for {action}: {reason}")]
    InvalidArguments { action: String, reason: String },

    /// 已有一个待确认的提议，同一时间只允许一个
    #[error("Gate busy: proposal {0} is still pending")]
    GateBusy(String),

    #[error("No pending proposal")]
    NoPendingProposal,

    /// 提议尚未展示给用户（仍处于 proposed），不能作出决定
    #[error("Proposal {0} is not executing yet")]
    NotExecuting(String),

    /// 提议在用户决定前被撤回（动作被注销或 Agent 放弃等待）
    #[error("Proposal withdrawn: {0}")]
    Withdrawn(String),
}

impl From<reqwest::Error> for CanvasError {
    fn from(e: reqwest::Error) -> Self {
        CanvasError::Network(e.to_string())
    }
}

impl From<config::ConfigError> for CanvasError {
    fn from(e: config::ConfigError) -> Self {
        CanvasError::ConfigError(e.to_string())
    }
}

//! 状态定义：SessionState（与 Agent 共享的唯一对象）、Resource、LogEntry、DocumentSelection
//!
//! 字段的 JSON 名与 Agent 侧保持一致（`model`、`research_question`、`resources`、`report`、`logs`），
//! 人和 Agent 读写的是同一份结构。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 会话共享状态：每个活跃会话恰好一份，写入总是整体替换
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// 会话启动时确定的后端模型 / Agent 标识
    #[serde(rename = "model", default)]
    pub model_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_question: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    /// 进度日志：对 Agent 只追加，人工从不修改
    #[serde(rename = "logs", default)]
    pub progress_log: Vec<LogEntry>,
}

impl SessionState {
    /// 会话初始状态：只带模型标识
    pub fn new(model_identifier: impl Into<String>) -> Self {
        Self {
            model_identifier: model_identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources = resources;
        self
    }
}

/// 研究资源，以 url 为唯一标识；url 为空视为无效
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Resource {
    pub fn new(url: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Agent 写入的单步进度记录；除 message/done 外的字段原样保留
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub done: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, done: bool) -> Self {
        Self {
            message: message.into(),
            done,
            extra: Map::new(),
        }
    }
}

/// 文档选择（临时 UI 状态，不写入 SessionState）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSelection {
    pub id: String,
    pub name: String,
}

impl DocumentSelection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

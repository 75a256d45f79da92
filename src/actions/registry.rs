//! 受控动作注册表
//!
//! 所有受控动作实现 GatedAction（name / description / parameters_schema / render），
//! 由 ActionRegistry 按名注册与查找。Agent 可在运行时注册任意参数形状的动作。

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::core::{Resource, SessionState};

/// 提议在确认界面上的展示内容
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProposalBody {
    pub title: String,
    /// 与提议相关、当前仍在状态中的资源
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// 受控动作 trait：只负责描述与渲染，从不修改状态
pub trait GatedAction: Send + Sync {
    /// 动作名称（Agent 提议时使用）
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认不限参数
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 「同意」按钮上的文字
    fn confirm_label(&self) -> &str {
        "Confirm"
    }

    /// 提议前校验参数
    fn validate(&self, _args: &Value) -> Result<(), String> {
        Ok(())
    }

    /// 用当前状态渲染提议
    fn render(&self, args: &Value, state: &SessionState) -> ProposalBody;
}

/// 注册表中动作的公开描述
#[derive(Clone, Debug, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// 按名存储 Arc<dyn GatedAction>，支持 register / unregister / get / descriptors
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn GatedAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: impl GatedAction + 'static) {
        self.register_arc(Arc::new(action));
    }

    /// 同名动作会被替换
    pub fn register_arc(&mut self, action: Arc<dyn GatedAction>) {
        let name = action.name().to_string();
        self.actions.insert(name, action);
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.actions.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn GatedAction>> {
        self.actions.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    pub fn descriptors(&self) -> Vec<ActionDescriptor> {
        let mut list: Vec<ActionDescriptor> = self
            .actions
            .iter()
            .map(|(name, action)| ActionDescriptor {
                name: name.clone(),
                description: action.description().to_string(),
                parameters: action.parameters_schema(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}

/// Agent 运行时注册的动作：参数 schema 由 Agent 给出，渲染时原样展示参数
pub struct DynamicAction {
    name: String,
    description: String,
    parameters: Value,
}

impl DynamicAction {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

impl GatedAction for DynamicAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.parameters.clone()
    }

    fn validate(&self, args: &Value) -> Result<(), String> {
        if args.is_object() || args.is_null() {
            Ok(())
        } else {
            Err("arguments must be a JSON object".to_string())
        }
    }

    fn render(&self, args: &Value, _state: &SessionState) -> ProposalBody {
        let title = if self.description.is_empty() {
            self.name.clone()
        } else {
            self.description.clone()
        };
        ProposalBody {
            title,
            resources: Vec::new(),
            details: Some(args.clone()),
        }
    }
}

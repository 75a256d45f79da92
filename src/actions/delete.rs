//! DeleteResources：按 url 批量删除资源前请求人工确认
//!
//! 只渲染当前状态中 url 在 args.urls 里的资源；真正的删除由 Agent 在收到 YES 后调用 batch_delete 完成。

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::Value;

use crate::actions::{GatedAction, ProposalBody};
use crate::core::SessionState;

pub const DELETE_RESOURCES: &str = "DeleteResources";

/// DeleteResources 的参数
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct DeleteResourcesArgs {
    /// 待删除资源的 url；缺省或 null 视为空列表
    #[serde(default)]
    pub urls: Option<Vec<String>>,
}

impl DeleteResourcesArgs {
    pub fn into_urls(self) -> Vec<String> {
        self.urls.unwrap_or_default()
    }

    pub fn parse(args: &Value) -> Result<Self, String> {
        if args.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(args.clone()).map_err(|e| e.to_string())
    }
}

#[derive(Debug, Default)]
pub struct DeleteResourcesAction;

impl GatedAction for DeleteResourcesAction {
    fn name(&self) -> &str {
        DELETE_RESOURCES
    }

    fn description(&self) -> &str {
        "Delete resources identified by url, after the user approves. Args: {\"urls\": [\"https://...\"]}."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schema_for!(DeleteResourcesArgs)).unwrap_or_else(|_| serde_json::json!({}))
    }

    fn confirm_label(&self) -> &str {
        "Delete"
    }

    fn validate(&self, args: &Value) -> Result<(), String> {
        DeleteResourcesArgs::parse(args).map(|_| ())
    }

    fn render(&self, args: &Value, state: &SessionState) -> ProposalBody {
        let urls = DeleteResourcesArgs::parse(args).unwrap_or_default().into_urls();
        let resources = state
            .resources
            .iter()
            .filter(|r| urls.contains(&r.url))
            .cloned()
            .collect();
        ProposalBody {
            title: "Delete these resources?".to_string(),
            resources,
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Resource;

    #[test]
    fn test_render_lists_only_matching_resources() {
        let state = SessionState::new("m").with_resources(vec![
            Resource::new("a", "A", ""),
            Resource::new("b", "B", ""),
        ]);
        let body = DeleteResourcesAction.render(&serde_json::json!({"urls": ["b", "gone"]}), &state);
        assert_eq!(body.title, "Delete these resources?");
        assert_eq!(body.resources, vec![Resource::new("b", "B", "")]);
    }

    #[test]
    fn test_missing_urls_render_empty_list() {
        let state = SessionState::new("m").with_resources(vec![Resource::new("a", "A", "")]);
        let body = DeleteResourcesAction.render(&serde_json::json!({}), &state);
        assert!(body.resources.is_empty());
    }

    #[test]
    fn test_validate_rejects_wrong_shape() {
        assert!(DeleteResourcesAction.validate(&serde_json::json!({"urls": "a"})).is_err());
        assert!(DeleteResourcesAction.validate(&serde_json::json!({"urls": ["a"]})).is_ok());
    }

    #[test]
    fn test_null_urls_are_treated_as_empty() {
        let args = serde_json::json!({"urls": null});
        assert!(DeleteResourcesAction.validate(&args).is_ok());

        let state = SessionState::new("m").with_resources(vec![Resource::new("a", "A", "")]);
        let body = DeleteResourcesAction.render(&args, &state);
        assert_eq!(body.title, "Delete these resources?");
        assert!(body.resources.is_empty());
    }

    #[test]
    fn test_schema_mentions_urls() {
        let schema = DeleteResourcesAction.parameters_schema();
        assert!(schema["properties"].get("urls").is_some());
    }
}

//! 进度日志投影：从 SessionState.logs 派生可渲染视图，纯函数、不持有状态

use serde::Serialize;

use crate::core::SessionState;

/// 单条进度（按日志顺序编号）
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressStep {
    pub index: usize,
    pub message: String,
    pub done: bool,
}

/// 可渲染的进度视图
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressView {
    pub steps: Vec<ProgressStep>,
}

impl ProgressView {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn completed(&self) -> usize {
        self.steps.iter().filter(|s| s.done).count()
    }
}

/// 日志为空时返回 None（不显示占位），否则按原顺序原样投影
pub fn project(state: &SessionState) -> Option<ProgressView> {
    if state.progress_log.is_empty() {
        return None;
    }
    let steps = state
        .progress_log
        .iter()
        .enumerate()
        .map(|(index, entry)| ProgressStep {
            index,
            message: entry.message.clone(),
            done: entry.done,
        })
        .collect();
    Some(ProgressView { steps })
}

//! 画布事件：确认网关状态变化、下载就绪、打开查看器等，供任意前端订阅展示

use std::path::PathBuf;

use serde::Serialize;

use crate::actions::Decision;

/// 单个画布事件（可序列化为 JSON 供前端展示）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    /// Agent 提出了需要人工确认的动作
    ProposalOpened { id: String, name: String },
    /// 用户作出决定
    ProposalResolved {
        id: String,
        name: String,
        decision: Decision,
    },
    /// 提议在决定前被撤回
    ProposalWithdrawn { id: String, name: String },
    /// 导出的文件已保存，可供下载
    DownloadReady { path: PathBuf },
    /// 需要在新的查看上下文中打开的地址
    OpenViewer { url: String },
}

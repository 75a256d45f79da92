//! 文本渲染
//!
//! 把 SessionState、进度视图、待确认提议、文档目录与画布事件转成控制台文本。
//! 报告等长文本按字符折叠，避免刷屏。

use std::fmt::Write as _;

use crate::actions::{ProposalStatus, ProposalView};
use crate::config::CatalogEntry;
use crate::core::{DocumentSelection, Resource, SessionState};
use crate::events::CanvasEvent;
use crate::session::ProgressView;

/// 报告在总览中显示的最大字符数
const MAX_REPORT_CHARS: usize = 600;

/// 对过长内容做折叠：保留前 N 字 + 省略提示（按字符，避免截断 UTF-8）
fn truncate_for_display(content: &str, limit: usize) -> String {
    let total = content.chars().count();
    if total <= limit {
        return content.to_string();
    }
    let head: String = content.chars().take(limit).collect();
    format!("{}\n... [truncated, {} chars]", head, total)
}

fn render_resources(out: &mut String, resources: &[Resource]) {
    for (i, r) in resources.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} <{}>", i + 1, r.title, r.url);
        if !r.description.is_empty() {
            let _ = writeln!(out, "     {}", r.description);
        }
    }
}

pub fn render_state(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model: {}", state.model_identifier);
    let _ = writeln!(
        out,
        "Research question: {}",
        state.research_question.as_deref().unwrap_or("(Your research question)")
    );
    let _ = writeln!(out, "Resources:");
    if state.resources.is_empty() {
        let _ = writeln!(out, "  Click the button above to add resources manually.");
    } else {
        render_resources(&mut out, &state.resources);
    }
    let _ = writeln!(out, "Research draft:");
    match state.report.as_deref() {
        Some(report) if !report.is_empty() => {
            let _ = writeln!(out, "{}", truncate_for_display(report, MAX_REPORT_CHARS));
        }
        _ => {
            let _ = writeln!(out, "  Your research draft will be prepared here...");
        }
    }
    out
}

pub fn render_progress(view: &ProgressView) -> String {
    let mut out = String::new();
    for step in &view.steps {
        let mark = if step.done { "x" } else { " " };
        let _ = writeln!(out, "  [{}] {}", mark, step.message);
    }
    out
}

pub fn render_proposal(view: &ProposalView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    render_resources(&mut out, &view.resources);
    if let Some(details) = &view.details {
        let _ = writeln!(out, "  {}", details);
    }
    match view.status {
        ProposalStatus::Executing => {
            let choices: Vec<String> = view
                .affordances
                .iter()
                .map(|a| format!("{} ({})", a.label, a.decision))
                .collect();
            let _ = writeln!(out, "  {}", choices.join("  "));
        }
        ProposalStatus::Proposed => {
            let _ = writeln!(out, "  (type `review` to decide)");
        }
        ProposalStatus::Resolved => {}
    }
    out
}

pub fn render_catalog(entries: &[CatalogEntry], selected: &DocumentSelection) -> String {
    let mut out = String::from("Select a Source Document:\n");
    for (i, e) in entries.iter().enumerate() {
        let mark = if e.id == selected.id { "*" } else { " " };
        let _ = writeln!(out, " {}{}. {}", mark, i + 1, e.name);
    }
    out
}

pub fn render_event(event: &CanvasEvent) -> String {
    match event {
        CanvasEvent::ProposalOpened { name, .. } => format!("Agent requests confirmation for {name}"),
        CanvasEvent::ProposalResolved { name, decision, .. } => format!("{name}: {decision}"),
        CanvasEvent::ProposalWithdrawn { name, .. } => format!("{name} was withdrawn"),
        CanvasEvent::DownloadReady { path } => format!("Download ready: {}", path.display()),
        CanvasEvent::OpenViewer { url } => format!("Open {url} to view the Codelab"),
    }
}

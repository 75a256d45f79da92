//! 控制台应用主循环
//!
//! 逐行读取 stdin，解析为 ConsoleCommand 后作用于画布会话；同时打印画布事件
//! （Agent 发起确认、下载就绪等）。新增 / 编辑资源沿用对话框协议。

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::actions::Decision;
use crate::canvas::Canvas;
use crate::core::{CanvasError, Resource};
use crate::session::{AddResourceDialog, EditResourceDialog};
use crate::ui::event::{ConsoleCommand, ResourceField};
use crate::ui::render::{render_catalog, render_event, render_progress, render_proposal, render_state};

const HELP: &str = "\
Commands:
  show                                 current canvas
  question <text> / report <text>      edit research question / draft
  add <url> | <title> | <description>  add a resource
  remove <url>                         remove a resource
  edit <url>, set url|title|description <value>, save, cancel
  docs, select <n|id>                  choose a source document
  pdf, codelabs                        export
  review, yes, no                      decide on the agent's pending request
  quit";

/// 单次命令的执行结果
#[derive(Debug, Default)]
pub struct Outcome {
    pub output: String,
    pub quit: bool,
}

impl Outcome {
    fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            quit: false,
        }
    }
}

/// 控制台结束的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    /// 用户输入 quit
    Quit,
    /// 输入流结束（EOF），例如无终端运行
    InputClosed,
}

/// 控制台侧的画布界面：持有新增 / 编辑对话框状态
pub struct ConsoleApp {
    canvas: Arc<Canvas>,
    add: AddResourceDialog,
    edit: EditResourceDialog,
}

impl ConsoleApp {
    pub fn new(canvas: Arc<Canvas>) -> Self {
        Self {
            canvas,
            add: AddResourceDialog::default(),
            edit: EditResourceDialog::default(),
        }
    }

    pub fn edit_dialog(&self) -> &EditResourceDialog {
        &self.edit
    }

    pub async fn handle(&mut self, cmd: ConsoleCommand) -> Outcome {
        match cmd {
            ConsoleCommand::Help => Outcome::text(HELP),
            ConsoleCommand::Show => {
                let mut out = render_state(&self.canvas.state());
                if let Some(progress) = self.canvas.progress() {
                    out.push_str("Progress:\n");
                    out.push_str(&render_progress(&progress));
                }
                Outcome::text(out)
            }
            ConsoleCommand::Question(text) => {
                self.canvas.set_research_question(text);
                Outcome::text("Research question updated.")
            }
            ConsoleCommand::Report(text) => {
                self.canvas.set_report(text);
                Outcome::text("Research draft updated.")
            }
            ConsoleCommand::Add { url, title, description } => {
                self.add.open();
                self.add.draft = Resource::new(url, title, description);
                if self.add.submit(self.canvas.resources()) {
                    Outcome::text("Resource added.")
                } else {
                    Outcome::text("A resource needs a url.")
                }
            }
            ConsoleCommand::Remove(url) => {
                self.canvas.resources().remove(&url);
                Outcome::text(format!("Removed {url}."))
            }
            ConsoleCommand::Edit(url) => {
                let found = self.canvas.state().resources.into_iter().find(|r| r.url == url);
                match found {
                    Some(resource) => {
                        self.edit.begin(&resource);
                        Outcome::text(format!("Editing {url}. Use set/save/cancel."))
                    }
                    None => Outcome::text(format!("No resource with url {url}.")),
                }
            }
            ConsoleCommand::Set(field, value) => match self.edit.editing_mut() {
                Some(resource) => {
                    match field {
                        ResourceField::Url => resource.url = value,
                        ResourceField::Title => resource.title = value,
                        ResourceField::Description => resource.description = value,
                    }
                    Outcome::text("Edited (not saved yet).")
                }
                None => Outcome::text("Nothing is being edited."),
            },
            ConsoleCommand::Save => {
                if self.edit.editing.is_none() {
                    return Outcome::text("Nothing is being edited.");
                }
                if self.edit.submit(self.canvas.resources()) {
                    Outcome::text("Resource saved.")
                } else {
                    Outcome::text("The resource no longer exists; nothing was saved.")
                }
            }
            ConsoleCommand::Cancel => {
                self.edit.cancel();
                Outcome::text("Edit cancelled.")
            }
            ConsoleCommand::Documents => Outcome::text(render_catalog(
                self.canvas.catalog().entries(),
                &self.canvas.selected_document(),
            )),
            ConsoleCommand::Select(key) => {
                let selection = key
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| self.canvas.catalog().nth(n))
                    .or_else(|| self.canvas.catalog().find(&key));
                match selection {
                    Some(doc) => {
                        let name = doc.name.clone();
                        self.canvas.select(doc);
                        Outcome::text(format!("Selected {name}."))
                    }
                    None => Outcome::text(format!("Unknown document: {key}")),
                }
            }
            ConsoleCommand::ExportPdf => match self.canvas.export_pdf().await {
                Some(path) => Outcome::text(format!("Saved {}", path.display())),
                None => Outcome::text("Export failed (see log)."),
            },
            ConsoleCommand::ExportCodelabs => match self.canvas.export_codelabs().await {
                Some(url) => Outcome::text(format!("Codelab ready at {url}")),
                None => Outcome::text("Export failed (see log)."),
            },
            ConsoleCommand::Review => match self.canvas.gate().present().await {
                Some(view) => Outcome::text(render_proposal(&view)),
                None => Outcome::text("No pending request."),
            },
            ConsoleCommand::Approve => self.decide(Decision::Yes).await,
            ConsoleCommand::Decline => self.decide(Decision::No).await,
            ConsoleCommand::Quit => Outcome {
                output: String::new(),
                quit: true,
            },
            ConsoleCommand::Unknown(line) => Outcome::text(format!("Unknown command: {line}\n{HELP}")),
        }
    }

    async fn decide(&mut self, decision: Decision) -> Outcome {
        match self.canvas.gate().resolve(decision).await {
            Ok(view) => Outcome::text(format!("{}: {}", view.name, decision)),
            Err(CanvasError::NotExecuting(_)) => Outcome::text("Review the request first (`review`)."),
            Err(e) => Outcome::text(e.to_string()),
        }
    }
}

/// 运行控制台：stdin 逐行命令 + 画布事件输出，quit 或 EOF 时退出
pub async fn run_console(canvas: Arc<Canvas>) -> anyhow::Result<ConsoleExit> {
    run_console_with(canvas, BufReader::new(tokio::io::stdin())).await
}

/// 从任意行输入运行控制台
pub async fn run_console_with<R>(canvas: Arc<Canvas>, input: R) -> anyhow::Result<ConsoleExit>
where
    R: AsyncBufRead + Unpin,
{
    let mut events = canvas.subscribe_events();
    let mut app = ConsoleApp::new(canvas);
    let mut lines = input.lines();
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { return Ok(ConsoleExit::InputClosed) };
                let Some(cmd) = ConsoleCommand::parse(&line) else { continue };
                let outcome = app.handle(cmd).await;
                if !outcome.output.is_empty() {
                    println!("{}", outcome.output.trim_end());
                }
                if outcome.quit {
                    return Ok(ConsoleExit::Quit);
                }
            }
            event = events.recv() => match event {
                Ok(event) => println!("» {}", render_event(&event)),
                Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "console lagged behind canvas events"),
                Err(RecvError::Closed) => return Ok(ConsoleExit::Quit),
            },
        }
    }
}

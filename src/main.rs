//! Canvas - 研究画布会话层
//!
//! 入口：初始化日志、加载配置、创建画布会话，启动 Agent 桥接（web feature）并运行控制台。

use std::sync::Arc;

use anyhow::Context;
use canvas::{
    config::AppConfig,
    load_config, observability,
    ui::{run_console, ConsoleExit},
    Canvas,
};
#[cfg(feature = "web")]
use canvas::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let canvas = Arc::new(Canvas::from_config(&cfg));

    #[cfg(feature = "web")]
    let bridge = {
        let cancel = tokio_util::sync::CancellationToken::new();
        let handle = tokio::spawn({
            let canvas = Arc::clone(&canvas);
            let bind = cfg.web.bind.clone();
            let cancel = cancel.clone();
            async move {
                if let Err(e) = server::serve(canvas, &bind, cancel).await {
                    tracing::error!("Agent bridge stopped: {:#}", e);
                }
            }
        });
        (cancel, handle)
    };

    let exit = run_console(Arc::clone(&canvas))
        .await
        .context("Console run failed")?;

    // 无终端运行时 stdin 立即结束，桥接服务继续运行到 Ctrl-C
    #[cfg(feature = "web")]
    if exit == ConsoleExit::InputClosed {
        tracing::info!("Console input closed, agent bridge keeps running until Ctrl-C");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
    }
    #[cfg(not(feature = "web"))]
    if exit == ConsoleExit::InputClosed {
        tracing::info!("Console input closed");
    }

    // 先撤回挂起中的提议（Agent 侧得到 Withdrawn），长轮询请求才能结束
    canvas.gate().withdraw().await;

    #[cfg(feature = "web")]
    {
        let (cancel, handle) = bridge;
        cancel.cancel();
        let _ = handle.await;
    }

    canvas.shutdown();
    Ok(())
}

//! 共享状态存储
//!
//! 每个会话一份 SessionState，基于 watch 通道：read 取当前快照，write 整体替换并通知订阅者。
//! 不做字段级合并；调用方需先读最新状态、再写回完整对象。并发策略为后写者胜（last-write-wins）。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::core::SessionState;

/// 单会话状态寄存器；Clone 得到的是同一份状态的另一个句柄
#[derive(Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<SessionState>>,
    revision: Arc<AtomicU64>,
}

impl StateStore {
    /// 以 `{ model }` 为初始状态创建
    pub fn new(model_identifier: impl Into<String>) -> Self {
        Self::with_state(SessionState::new(model_identifier))
    }

    pub fn with_state(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 当前状态快照
    pub fn read(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    /// 整体替换状态；没有订阅者也照常生效
    pub fn write(&self, new_state: SessionState) {
        self.tx.send_replace(new_state);
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(revision, "session state replaced");
    }

    /// 已发生的写入次数，仅用于观测，不参与写入判定
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }
}

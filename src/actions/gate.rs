//! 人工确认网关
//!
//! 单个提议的状态机：proposed → executing → resolved(YES | NO)。
//! Agent 提议后拿到 ProposalTicket 并挂起等待；界面 present 时进入 executing 并给出两个决定按钮；
//! resolve 通过 oneshot 把 "YES" / "NO" 交还给 Agent。网关本身从不修改资源数据。
//! 同一时间只允许一个待确认提议，新的提议在前一个未结束时会被拒绝（GateBusy）。

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, oneshot, Mutex, RwLock};

use crate::actions::{ActionDescriptor, ActionRegistry, GatedAction, ProposalBody};
use crate::core::{CanvasError, Resource};
use crate::events::CanvasEvent;
use crate::session::StateStore;

/// 用户决定；序列化为字面量 "YES" / "NO"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

impl Decision {
    pub fn token(&self) -> &'static str {
        match self {
            Decision::Yes => "YES",
            Decision::No => "NO",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Yes)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YES" => Ok(Decision::Yes),
            "NO" => Ok(Decision::No),
            other => Err(format!("unknown decision: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Proposed,
    Executing,
    Resolved,
}

/// 决定按钮
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Affordance {
    pub label: String,
    pub decision: Decision,
}

/// 渲染后的提议（供界面展示）
#[derive(Clone, Debug, Serialize)]
pub struct ProposalView {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub status: ProposalStatus,
    pub title: String,
    pub resources: Vec<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 仅 executing 时给出：取消（NO）与确认（YES）
    pub affordances: Vec<Affordance>,
    pub proposed_at: DateTime<Utc>,
}

struct PendingProposal {
    id: String,
    name: String,
    arguments: Value,
    status: ProposalStatus,
    proposed_at: DateTime<Utc>,
    handler: Option<oneshot::Sender<Decision>>,
}

impl PendingProposal {
    /// 等待方已放弃（ticket 被丢弃）
    fn abandoned(&self) -> bool {
        self.handler.as_ref().map_or(true, |h| h.is_closed())
    }
}

/// Agent 侧持有的等待凭证，决定到达前一直挂起
pub struct ProposalTicket {
    pub id: String,
    rx: oneshot::Receiver<Decision>,
}

impl ProposalTicket {
    pub async fn decision(self) -> Result<Decision, CanvasError> {
        let Self { id, rx } = self;
        rx.await.map_err(|_| CanvasError::Withdrawn(id))
    }
}

pub struct ConfirmationGate {
    registry: RwLock<ActionRegistry>,
    /// 构造时注册的内置动作，Agent 不能替换或注销
    builtin: HashSet<String>,
    pending: Mutex<Option<PendingProposal>>,
    store: StateStore,
    events: broadcast::Sender<CanvasEvent>,
}

impl ConfirmationGate {
    pub fn new(registry: ActionRegistry, store: StateStore, events: broadcast::Sender<CanvasEvent>) -> Self {
        let builtin = registry.names().into_iter().collect();
        Self {
            registry: RwLock::new(registry),
            builtin,
            pending: Mutex::new(None),
            store,
            events,
        }
    }

    /// 注册（或替换同名的）动作；与内置动作重名时拒绝
    pub async fn register(&self, action: Arc<dyn GatedAction>) -> Result<(), CanvasError> {
        let name = action.name().to_string();
        if self.builtin.contains(&name) {
            tracing::warn!(action = %name, "refusing to replace built-in gated action");
            return Err(CanvasError::ReservedAction(name));
        }
        self.registry.write().await.register_arc(action);
        tracing::info!(action = %name, "gated action registered");
        Ok(())
    }

    /// 注销动作；若该动作正有待确认提议，一并撤回。内置动作不可注销
    pub async fn unregister(&self, name: &str) -> bool {
        if self.builtin.contains(name) {
            tracing::warn!(action = %name, "refusing to unregister built-in gated action");
            return false;
        }
        let removed = self.registry.write().await.unregister(name);
        let mut pending = self.pending.lock().await;
        if pending.as_ref().is_some_and(|p| p.name == name) {
            if let Some(p) = pending.take() {
                self.emit_withdrawn(&p);
            }
        }
        removed
    }

    pub async fn actions(&self) -> Vec<ActionDescriptor> {
        self.registry.read().await.descriptors()
    }

    /// Agent 提议一个受控动作；返回的 ticket 在用户决定后完成
    pub async fn propose(&self, name: &str, arguments: Value) -> Result<ProposalTicket, CanvasError> {
        let action = self
            .registry
            .read()
            .await
            .get(name)
            .ok_or_else(|| CanvasError::UnknownAction(name.to_string()))?;
        action
            .validate(&arguments)
            .map_err(|reason| CanvasError::InvalidArguments {
                action: name.to_string(),
                reason,
            })?;

        let mut pending = self.pending.lock().await;
        if let Some(existing) = pending.as_ref() {
            if !existing.abandoned() {
                tracing::warn!(action = %name, pending = %existing.id, "proposal rejected, gate busy");
                return Err(CanvasError::GateBusy(existing.id.clone()));
            }
            if let Some(stale) = pending.take() {
                tracing::info!(proposal = %stale.id, "clearing abandoned proposal");
                self.emit_withdrawn(&stale);
            }
        }

        let (tx, rx) = oneshot::channel();
        let id = uuid::Uuid::new_v4().to_string();
        *pending = Some(PendingProposal {
            id: id.clone(),
            name: name.to_string(),
            arguments,
            status: ProposalStatus::Proposed,
            proposed_at: Utc::now(),
            handler: Some(tx),
        });
        tracing::info!(proposal = %id, action = %name, "gated action proposed");
        let _ = self.events.send(CanvasEvent::ProposalOpened {
            id: id.clone(),
            name: name.to_string(),
        });
        Ok(ProposalTicket { id, rx })
    }

    /// 当前提议（不改变状态）
    pub async fn current(&self) -> Option<ProposalView> {
        let pending = self.pending.lock().await;
        let p = pending.as_ref()?;
        Some(self.render(p).await)
    }

    /// 展示提议：proposed → executing，之后才可作出决定
    pub async fn present(&self) -> Option<ProposalView> {
        let mut pending = self.pending.lock().await;
        let p = pending.as_mut()?;
        if p.status == ProposalStatus::Proposed {
            p.status = ProposalStatus::Executing;
            tracing::info!(proposal = %p.id, action = %p.name, "proposal executing");
        }
        Some(self.render(p).await)
    }

    /// 用户决定：把 "YES" / "NO" 交还给 Agent 并销毁提议，返回 resolved 快照
    pub async fn resolve(&self, decision: Decision) -> Result<ProposalView, CanvasError> {
        let mut pending = self.pending.lock().await;
        let p = pending.as_ref().ok_or(CanvasError::NoPendingProposal)?;
        if p.status != ProposalStatus::Executing {
            return Err(CanvasError::NotExecuting(p.id.clone()));
        }
        let Some(mut p) = pending.take() else {
            return Err(CanvasError::NoPendingProposal);
        };
        drop(pending);

        p.status = ProposalStatus::Resolved;
        if let Some(handler) = p.handler.take() {
            if handler.send(decision).is_err() {
                tracing::warn!(proposal = %p.id, "requester no longer waiting for decision");
            }
        }
        tracing::info!(proposal = %p.id, action = %p.name, decision = %decision, "proposal resolved");
        let _ = self.events.send(CanvasEvent::ProposalResolved {
            id: p.id.clone(),
            name: p.name.clone(),
            decision,
        });
        Ok(self.render(&p).await)
    }

    /// 撤回当前提议，Agent 侧 ticket 将得到 Withdrawn
    pub async fn withdraw(&self) -> Option<String> {
        let p = self.pending.lock().await.take()?;
        self.emit_withdrawn(&p);
        Some(p.id)
    }

    pub async fn is_pending(&self) -> bool {
        self.pending.lock().await.is_some()
    }

    fn emit_withdrawn(&self, p: &PendingProposal) {
        tracing::info!(proposal = %p.id, action = %p.name, "proposal withdrawn");
        let _ = self.events.send(CanvasEvent::ProposalWithdrawn {
            id: p.id.clone(),
            name: p.name.clone(),
        });
    }

    async fn render(&self, p: &PendingProposal) -> ProposalView {
        let action = self.registry.read().await.get(&p.name);
        let state = self.store.read();
        let (body, confirm_label) = match action {
            Some(action) => (action.render(&p.arguments, &state), action.confirm_label().to_string()),
            None => (
                ProposalBody {
                    title: p.name.clone(),
                    ..ProposalBody::default()
                },
                "Confirm".to_string(),
            ),
        };
        let affordances = if p.status == ProposalStatus::Executing {
            vec![
                Affordance {
                    label: "Cancel".to_string(),
                    decision: Decision::No,
                },
                Affordance {
                    label: confirm_label,
                    decision: Decision::Yes,
                },
            ]
        } else {
            Vec::new()
        };
        ProposalView {
            id: p.id.clone(),
            name: p.name.clone(),
            arguments: p.arguments.clone(),
            status: p.status,
            title: body.title,
            resources: body.resources,
            details: body.details,
            affordances,
            proposed_at: p.proposed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{DeleteResourcesAction, DynamicAction, DELETE_RESOURCES};
    use crate::core::SessionState;
    use serde_json::json;

    fn gate_with(resources: Vec<Resource>) -> (Arc<ConfirmationGate>, StateStore, broadcast::Receiver<CanvasEvent>) {
        let store = StateStore::with_state(SessionState::new("m").with_resources(resources));
        let (events, rx) = broadcast::channel(16);
        let mut registry = ActionRegistry::new();
        registry.register(DeleteResourcesAction);
        (Arc::new(ConfirmationGate::new(registry, store.clone(), events)), store, rx)
    }

    fn res(url: &str) -> Resource {
        Resource::new(url, url.to_uppercase(), "")
    }

    #[test]
    fn test_decision_tokens_are_literal() {
        assert_eq!(Decision::Yes.token(), "YES");
        assert_eq!(Decision::No.token(), "NO");
        assert_eq!(serde_json::to_value(Decision::Yes).unwrap(), json!("YES"));
        assert_eq!("NO".parse::<Decision>().unwrap(), Decision::No);
        assert!("yes".parse::<Decision>().is_err());
    }

    #[tokio::test]
    async fn test_proposal_moves_through_states() {
        let (gate, _store, _rx) = gate_with(vec![res("a"), res("b")]);
        let ticket = gate.propose(DELETE_RESOURCES, json!({"urls": ["a"]})).await.unwrap();

        let view = gate.current().await.unwrap();
        assert_eq!(view.status, ProposalStatus::Proposed);
        assert!(view.affordances.is_empty());
        assert!(matches!(gate.resolve(Decision::Yes).await, Err(CanvasError::NotExecuting(_))));

        let view = gate.present().await.unwrap();
        assert_eq!(view.status, ProposalStatus::Executing);
        assert_eq!(view.resources, vec![res("a")]);
        let labels: Vec<_> = view.affordances.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, ["Cancel", "Delete"]);

        let resolved = gate.resolve(Decision::Yes).await.unwrap();
        assert_eq!(resolved.status, ProposalStatus::Resolved);
        assert_eq!(ticket.decision().await.unwrap().token(), "YES");
        assert!(!gate.is_pending().await);
    }

    #[tokio::test]
    async fn test_gate_never_mutates_resources() {
        let (gate, store, _rx) = gate_with(vec![res("a"), res("b")]);
        for decision in [Decision::Yes, Decision::No] {
            let ticket = gate.propose(DELETE_RESOURCES, json!({"urls": ["a", "b"]})).await.unwrap();
            gate.present().await.unwrap();
            gate.resolve(decision).await.unwrap();
            assert_eq!(ticket.decision().await.unwrap(), decision);
        }
        assert_eq!(store.read().resources, vec![res("a"), res("b")]);
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn test_second_proposal_is_rejected_while_pending() {
        let (gate, _store, _rx) = gate_with(vec![]);
        let first = gate.propose(DELETE_RESOURCES, json!({"urls": []})).await.unwrap();
        let err = gate.propose(DELETE_RESOURCES, json!({"urls": []})).await.err().unwrap();
        assert!(matches!(err, CanvasError::GateBusy(ref id) if *id == first.id));
    }

    #[tokio::test]
    async fn test_abandoned_proposal_is_replaced() {
        let (gate, _store, mut rx) = gate_with(vec![]);
        let first = gate.propose(DELETE_RESOURCES, json!({"urls": []})).await.unwrap();
        let first_id = first.id.clone();
        drop(first);

        let second = gate.propose(DELETE_RESOURCES, json!({"urls": ["x"]})).await.unwrap();
        assert_ne!(second.id, first_id);

        let mut saw_withdrawn = false;
        while let Ok(event) = rx.try_recv() {
            if let CanvasEvent::ProposalWithdrawn { id, .. } = event {
                saw_withdrawn = id == first_id;
            }
        }
        assert!(saw_withdrawn);
    }

    #[tokio::test]
    async fn test_unknown_action_and_bad_arguments() {
        let (gate, _store, _rx) = gate_with(vec![]);
        assert!(matches!(
            gate.propose("DropTables", json!({})).await,
            Err(CanvasError::UnknownAction(_))
        ));
        assert!(matches!(
            gate.propose(DELETE_RESOURCES, json!({"urls": 3})).await,
            Err(CanvasError::InvalidArguments { .. })
        ));
        assert!(matches!(gate.resolve(Decision::No).await, Err(CanvasError::NoPendingProposal)));
    }

    #[tokio::test]
    async fn test_unregister_withdraws_pending() {
        let (gate, _store, _rx) = gate_with(vec![]);
        gate.register(Arc::new(DynamicAction::new("Publish", "Publish?", json!({}))))
            .await
            .unwrap();
        let ticket = gate.propose("Publish", json!({"to": "blog"})).await.unwrap();

        assert!(gate.unregister("Publish").await);
        assert!(matches!(ticket.decision().await, Err(CanvasError::Withdrawn(_))));
        assert!(!gate.is_pending().await);
    }

    #[tokio::test]
    async fn test_builtin_action_cannot_be_replaced() {
        let (gate, _store, _rx) = gate_with(vec![res("a")]);
        let impostor = DynamicAction::new(DELETE_RESOURCES, "Delete?", json!({}));
        assert!(matches!(
            gate.register(Arc::new(impostor)).await,
            Err(CanvasError::ReservedAction(ref name)) if name == DELETE_RESOURCES
        ));
        assert!(!gate.unregister(DELETE_RESOURCES).await);

        let _ticket = gate.propose(DELETE_RESOURCES, json!({"urls": ["a"]})).await.unwrap();
        let view = gate.present().await.unwrap();
        assert_eq!(view.title, "Delete these resources?");
        assert_eq!(view.resources, vec![res("a")]);
    }

    #[tokio::test]
    async fn test_null_urls_proposal_reaches_the_user() {
        let (gate, _store, _rx) = gate_with(vec![res("a")]);
        let _ticket = gate.propose(DELETE_RESOURCES, json!({"urls": null})).await.unwrap();
        let view = gate.present().await.unwrap();
        assert_eq!(view.status, ProposalStatus::Executing);
        assert!(view.resources.is_empty());
    }

    #[tokio::test]
    async fn test_waiting_agent_resumes_after_decision() {
        let (gate, _store, _rx) = gate_with(vec![res("a")]);
        let ticket = gate.propose(DELETE_RESOURCES, json!({"urls": ["a"]})).await.unwrap();
        let waiter = tokio::spawn(ticket.decision());

        gate.present().await.unwrap();
        gate.resolve(Decision::No).await.unwrap();
        assert_eq!(waiter.await.unwrap().unwrap().token(), "NO");
    }
}

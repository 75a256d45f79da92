//! 资源集合管理
//!
//! 所有操作都是「读当前状态 → 计算新的 resources → 整体写回」。
//! 校验失败（空 url、编辑目标缺失）与查找未命中均为静默 no-op。
//! 另含新增 / 编辑对话框的协议：新增成功后清空草稿并关闭；编辑开始时按值快照并单独记下原 url。

use std::collections::HashSet;

use crate::core::Resource;
use crate::session::StateStore;

/// 追加草稿；url 为空时返回 None
pub fn appended(resources: &[Resource], draft: &Resource) -> Option<Vec<Resource>> {
    if !draft.is_valid() {
        return None;
    }
    let mut next = resources.to_vec();
    next.push(draft.clone());
    Some(next)
}

/// 去掉所有 url 相同的条目
pub fn without(resources: &[Resource], url: &str) -> Vec<Resource> {
    resources.iter().filter(|r| r.url != url).cloned().collect()
}

/// 原位替换 url == original_url 的条目；未命中返回 None
pub fn replaced(resources: &[Resource], original_url: &str, edited: &Resource) -> Option<Vec<Resource>> {
    if original_url.is_empty() || !resources.iter().any(|r| r.url == original_url) {
        return None;
    }
    Some(
        resources
            .iter()
            .map(|r| if r.url == original_url { edited.clone() } else { r.clone() })
            .collect(),
    )
}

/// 去掉 url 属于集合的所有条目
pub fn without_all(resources: &[Resource], urls: &HashSet<String>) -> Vec<Resource> {
    resources.iter().filter(|r| !urls.contains(&r.url)).cloned().collect()
}

/// 共享状态中 resources 集合的 CRUD
#[derive(Clone)]
pub struct ResourceManager {
    store: StateStore,
}

impl ResourceManager {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Vec<Resource> {
        self.store.read().resources
    }

    /// 追加到末尾；url 为空时不写入，返回 false
    pub fn add(&self, draft: &Resource) -> bool {
        let mut state = self.store.read();
        match appended(&state.resources, draft) {
            Some(next) => {
                state.resources = next;
                self.store.write(state);
                tracing::info!(url = %draft.url, "resource added");
                true
            }
            None => false,
        }
    }

    /// 按 url 删除；未命中时集合不变
    pub fn remove(&self, url: &str) {
        let mut state = self.store.read();
        let before = state.resources.len();
        state.resources = without(&state.resources, url);
        let removed = before - state.resources.len();
        self.store.write(state);
        tracing::info!(url = %url, removed, "resource remove");
    }

    /// 以编辑开始时的原 url 定位并原位替换，支持改名
    pub fn update(&self, original_url: &str, edited: &Resource) -> bool {
        let mut state = self.store.read();
        match replaced(&state.resources, original_url, edited) {
            Some(next) => {
                state.resources = next;
                self.store.write(state);
                tracing::info!(original_url = %original_url, url = %edited.url, "resource updated");
                true
            }
            None => false,
        }
    }

    /// 仅供确认网关批准后由 Agent 调用
    pub fn batch_delete<S: AsRef<str>>(&self, urls: &[S]) {
        let urls: HashSet<String> = urls.iter().map(|u| u.as_ref().to_string()).collect();
        let mut state = self.store.read();
        let before = state.resources.len();
        state.resources = without_all(&state.resources, &urls);
        let removed = before - state.resources.len();
        self.store.write(state);
        tracing::info!(requested = urls.len(), removed, "resources batch deleted");
    }
}

/// 新增资源对话框
#[derive(Debug, Default)]
pub struct AddResourceDialog {
    pub open: bool,
    pub draft: Resource,
}

impl AddResourceDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// 提交草稿：成功则清空草稿并关闭对话框；url 为空时保持原样
    pub fn submit(&mut self, manager: &ResourceManager) -> bool {
        if !manager.add(&self.draft) {
            return false;
        }
        self.draft = Resource::default();
        self.open = false;
        true
    }
}

/// 编辑资源对话框：editing 是按值拷贝的快照，original_url 单独保存以支持改名
#[derive(Debug, Default)]
pub struct EditResourceDialog {
    pub open: bool,
    pub editing: Option<Resource>,
    pub original_url: Option<String>,
}

impl EditResourceDialog {
    pub fn begin(&mut self, resource: &Resource) {
        self.editing = Some(resource.clone());
        self.original_url = Some(resource.url.clone());
        self.open = true;
    }

    pub fn editing_mut(&mut self) -> Option<&mut Resource> {
        self.editing.as_mut()
    }

    /// 两者都存在才写回，返回是否真的写入；原 url 已不在列表中时什么都不改。提交后对话框重置
    pub fn submit(&mut self, manager: &ResourceManager) -> bool {
        let (Some(edited), Some(original_url)) = (self.editing.as_ref(), self.original_url.as_deref()) else {
            return false;
        };
        if original_url.is_empty() {
            return false;
        }
        let updated = manager.update(original_url, edited);
        self.cancel();
        updated
    }

    pub fn cancel(&mut self) {
        self.editing = None;
        self.original_url = None;
        self.open = false;
    }
}

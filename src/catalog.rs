//! 源文档目录：固定的 {id, name} 列表，选择其中一项是 /sourcedocument 通知的唯一触发点

use crate::config::CatalogEntry;
use crate::core::DocumentSelection;

#[derive(Debug, Clone)]
pub struct DocumentCatalog {
    entries: Vec<CatalogEntry>,
}

impl DocumentCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// 按 id 查找；未知 id 返回 None
    pub fn find(&self, id: &str) -> Option<DocumentSelection> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| DocumentSelection::new(e.id.clone(), e.name.clone()))
    }

    /// 按列表序号（从 1 开始）查找
    pub fn nth(&self, position: usize) -> Option<DocumentSelection> {
        let e = self.entries.get(position.checked_sub(1)?)?;
        Some(DocumentSelection::new(e.id.clone(), e.name.clone()))
    }
}

//! Ordered tab collection owned by one window.

use crate::types::errors::TabError;
use crate::types::tab::{Tab, TabId};

/// Trait defining the tab collection interface.
pub trait TabCollectionTrait {
    fn push_tab(&mut self, tab: Tab, active: bool) -> TabId;
    fn insert_tab(&mut self, index: usize, tab: Tab, active: bool) -> usize;
    fn take_tab(&mut self, tab_id: TabId) -> Result<(usize, Tab), TabError>;
    fn move_tab(&mut self, tab_id: TabId, new_index: usize) -> Result<(), TabError>;
    fn switch_tab(&mut self, tab_id: TabId) -> Result<(), TabError>;
    fn get_tab(&self, tab_id: TabId) -> Option<&Tab>;
    fn get_tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab>;
    fn get_active_tab(&self) -> Option<&Tab>;
    fn active_tab_id(&self) -> Option<TabId>;
    fn position(&self, tab_id: TabId) -> Option<usize>;
    fn contains(&self, tab_id: TabId) -> bool;
    fn tab_count(&self) -> usize;
    fn tab_order(&self) -> Vec<TabId>;
}

/// In-memory ordered tab sequence with one active tab.
#[derive(Debug, Default)]
pub struct TabCollection {
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
}

impl TabCollection {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tab> {
        self.tabs.iter_mut()
    }

    /// Tab preceding `removed_index`, or the first tab when the removed one
    /// was first.
    fn predecessor_of(&self, removed_index: usize) -> Option<TabId> {
        let index = removed_index.saturating_sub(1);
        self.tabs.get(index).or_else(|| self.tabs.first()).map(|t| t.id)
    }
}

impl TabCollectionTrait for TabCollection {
    /// Appends a tab. The first tab always becomes active.
    fn push_tab(&mut self, tab: Tab, active: bool) -> TabId {
        let id = tab.id;
        self.tabs.push(tab);
        if active || self.active_tab_id.is_none() {
            self.active_tab_id = Some(id);
        }
        id
    }

    /// Inserts a tab, clamping the index to the end of the sequence.
    /// Returns the index it landed at.
    fn insert_tab(&mut self, index: usize, tab: Tab, active: bool) -> usize {
        let index = index.min(self.tabs.len());
        let id = tab.id;
        self.tabs.insert(index, tab);
        if active || self.active_tab_id.is_none() {
            self.active_tab_id = Some(id);
        }
        index
    }

    /// Removes a tab and returns it with its former index. When the active
    /// tab is removed, the tab before it becomes active.
    fn take_tab(&mut self, tab_id: TabId) -> Result<(usize, Tab), TabError> {
        let index = self
            .position(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;
        let tab = self.tabs.remove(index);

        if self.active_tab_id == Some(tab_id) {
            self.active_tab_id = self.predecessor_of(index);
        }

        Ok((index, tab))
    }

    /// Moves a tab to a new position and makes it active.
    fn move_tab(&mut self, tab_id: TabId, new_index: usize) -> Result<(), TabError> {
        let index = self
            .position(tab_id)
            .ok_or_else(|| TabError::NotFound(tab_id.to_string()))?;

        if new_index >= self.tabs.len() {
            return Err(TabError::InvalidIndex(new_index));
        }

        let tab = self.tabs.remove(index);
        self.tabs.insert(new_index, tab);
        self.active_tab_id = Some(tab_id);
        Ok(())
    }

    fn switch_tab(&mut self, tab_id: TabId) -> Result<(), TabError> {
        if !self.contains(tab_id) {
            return Err(TabError::NotFound(tab_id.to_string()));
        }
        self.active_tab_id = Some(tab_id);
        Ok(())
    }

    fn get_tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    fn get_tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == tab_id)
    }

    fn get_active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.and_then(|id| self.get_tab(id))
    }

    fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    fn position(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn contains(&self, tab_id: TabId) -> bool {
        self.position(tab_id).is_some()
    }

    fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    fn tab_order(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }
}

//! Window registry: owns every open window and its tab collection.

use tracing::{debug, info};
use url::Url;

use crate::managers::tab_manager::{TabCollection, TabCollectionTrait};
use crate::types::errors::{TabError, WindowError};
use crate::types::tab::{Tab, TabId};
use crate::types::window::{Rect, WindowId};

/// An open browser window.
#[derive(Debug)]
pub struct Window {
    pub id: WindowId,
    pub frame: Rect,
    pub tabs: TabCollection,
}

impl Window {
    fn new(frame: Rect) -> Self {
        Self {
            id: WindowId::new(),
            frame,
            tabs: TabCollection::new(),
        }
    }
}

/// Result of closing a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The tab was removed and the window still has tabs.
    TabClosed { window: WindowId },
    /// The window's last tab was removed and the window was closed.
    WindowClosed { window: WindowId },
    /// The last tab of the last window was asked to close. Nothing was
    /// removed; the application should terminate instead.
    ExitApplication,
}

/// Trait defining the window registry interface.
pub trait WindowRegistryTrait {
    fn open_window(&mut self, frame: Rect, urls: Vec<Url>) -> Result<WindowId, WindowError>;
    fn spawn_window_with_tab(&mut self, tab: Tab, frame: Rect) -> WindowId;
    fn close_window(&mut self, window_id: WindowId) -> Result<Window, WindowError>;
    fn new_tab(&mut self, window_id: WindowId, url: Url) -> Result<TabId, WindowError>;
    fn close_tab(&mut self, window_id: WindowId, tab_id: TabId)
        -> Result<CloseOutcome, WindowError>;
    fn window(&self, window_id: WindowId) -> Option<&Window>;
    fn window_mut(&mut self, window_id: WindowId) -> Option<&mut Window>;
    fn find_tab(&self, tab_id: TabId) -> Option<WindowId>;
    fn window_count(&self) -> usize;
}

/// Holds windows in the order they were opened.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: Vec<Window>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
        }
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter()
    }

    /// Looks a tab up in whichever window currently owns it.
    pub fn tab(&self, tab_id: TabId) -> Option<&Tab> {
        self.windows.iter().find_map(|w| w.tabs.get_tab(tab_id))
    }

    pub fn tab_mut(&mut self, tab_id: TabId) -> Option<&mut Tab> {
        self.windows
            .iter_mut()
            .find_map(|w| w.tabs.get_tab_mut(tab_id))
    }

    fn position(&self, window_id: WindowId) -> Option<usize> {
        self.windows.iter().position(|w| w.id == window_id)
    }
}

impl WindowRegistryTrait for WindowRegistry {
    /// Opens a window with one tab per URL. The first tab is active.
    fn open_window(&mut self, frame: Rect, urls: Vec<Url>) -> Result<WindowId, WindowError> {
        if urls.is_empty() {
            return Err(WindowError::Empty);
        }

        let mut window = Window::new(frame);
        for url in urls {
            window.tabs.push_tab(Tab::new(url), false);
        }

        let id = window.id;
        info!(window_id = %id, tabs = window.tabs.tab_count(), "Window opened");
        self.windows.push(window);
        Ok(id)
    }

    /// Opens a window whose sole, active member is `tab`.
    fn spawn_window_with_tab(&mut self, tab: Tab, frame: Rect) -> WindowId {
        let mut window = Window::new(frame);
        let tab_id = window.tabs.push_tab(tab, true);
        let id = window.id;
        info!(window_id = %id, tab_id = %tab_id, "Window spawned for tab");
        self.windows.push(window);
        id
    }

    fn close_window(&mut self, window_id: WindowId) -> Result<Window, WindowError> {
        let index = self
            .position(window_id)
            .ok_or_else(|| WindowError::NotFound(window_id.to_string()))?;
        let window = self.windows.remove(index);
        info!(window_id = %window_id, "Window closed");
        Ok(window)
    }

    fn new_tab(&mut self, window_id: WindowId, url: Url) -> Result<TabId, WindowError> {
        let window = self
            .window_mut(window_id)
            .ok_or_else(|| WindowError::NotFound(window_id.to_string()))?;
        let tab_id = window.tabs.push_tab(Tab::new(url), true);
        debug!(window_id = %window_id, tab_id = %tab_id, "Tab opened");
        Ok(tab_id)
    }

    /// Closes a tab. A window left without tabs is closed with it, except
    /// for the last window, where the exit path is reported instead.
    fn close_tab(
        &mut self,
        window_id: WindowId,
        tab_id: TabId,
    ) -> Result<CloseOutcome, WindowError> {
        let window_count = self.windows.len();
        let window = self
            .window_mut(window_id)
            .ok_or_else(|| WindowError::NotFound(window_id.to_string()))?;

        if !window.tabs.contains(tab_id) {
            return Err(TabError::NotFound(tab_id.to_string()).into());
        }

        if window.tabs.tab_count() == 1 {
            if window_count == 1 {
                info!(tab_id = %tab_id, "Last tab of last window closing; exiting");
                return Ok(CloseOutcome::ExitApplication);
            }
            self.close_window(window_id)?;
            return Ok(CloseOutcome::WindowClosed { window: window_id });
        }

        window.tabs.take_tab(tab_id)?;
        debug!(window_id = %window_id, tab_id = %tab_id, "Tab closed");
        Ok(CloseOutcome::TabClosed { window: window_id })
    }

    fn window(&self, window_id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|w| w.id == window_id)
    }

    fn window_mut(&mut self, window_id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|w| w.id == window_id)
    }

    fn find_tab(&self, tab_id: TabId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|w| w.tabs.contains(tab_id))
            .map(|w| w.id)
    }

    fn window_count(&self) -> usize {
        self.windows.len()
    }
}

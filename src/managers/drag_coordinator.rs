//! Cross-window tab drag protocol.
//!
//! A drag session lives between [`DragCoordinator::begin_drag`] and the end of
//! the gesture. Every drop entry point clears it, whatever the outcome, so a
//! failed or ignored drop can never leave a stuck session behind.

use tracing::{debug, info, warn};

use crate::managers::tab_manager::TabCollectionTrait;
use crate::managers::window_manager::{WindowRegistry, WindowRegistryTrait};
use crate::types::tab::TabId;
use crate::types::window::{Point, Rect, WindowId};

/// Transient state of an in-progress tab drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub tab_id: TabId,
    pub source_window: WindowId,
    /// Set once the tab has been moved into another window by a drop.
    pub is_moving_tab: bool,
    moved: Option<DropOutcome>,
}

/// What a drop did to the window registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The tab was moved within its own window.
    Reordered { window: WindowId, index: usize },
    /// The tab was transferred into another window.
    MovedAcrossWindows {
        origin: WindowId,
        target: WindowId,
        index: usize,
        origin_closed: bool,
    },
    /// The release point fell inside the source window's tab strip.
    InsideTabStrip,
    /// A single tab was released outside without a prior move.
    Unchanged,
    /// The tab was detached into a new window.
    SpawnedWindow { window: WindowId },
    /// No session, or the dragged tab no longer exists.
    Ignored,
}

/// Owns the drag session and applies drops to a [`WindowRegistry`].
#[derive(Debug, Default)]
pub struct DragCoordinator {
    session: Option<DragSession>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self { session: None }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Starts a drag of `tab_id` out of `source_window` and makes the tab
    /// active there. Returns `false` when the tab is not in that window.
    pub fn begin_drag(
        &mut self,
        registry: &mut WindowRegistry,
        tab_id: TabId,
        source_window: WindowId,
    ) -> bool {
        let Some(window) = registry.window_mut(source_window) else {
            warn!(window_id = %source_window, "Drag started from unknown window");
            self.session = None;
            return false;
        };

        if window.tabs.switch_tab(tab_id).is_err() {
            warn!(tab_id = %tab_id, window_id = %source_window, "Dragged tab not in source window");
            self.session = None;
            return false;
        }

        debug!(tab_id = %tab_id, window_id = %source_window, "Drag started");
        self.session = Some(DragSession {
            tab_id,
            source_window,
            is_moving_tab: false,
            moved: None,
        });
        true
    }

    /// Drops the dragged tab into `target_window`'s tab strip at
    /// `target_index` (clamped to the end of the sequence).
    ///
    /// The session stays open after a cross-window move so the follow-up
    /// [`drop_outside`](Self::drop_outside) resolves as a move.
    pub fn drop_at(
        &mut self,
        registry: &mut WindowRegistry,
        target_window: WindowId,
        target_index: usize,
    ) -> DropOutcome {
        let Some(session) = self.session.as_mut() else {
            return DropOutcome::Ignored;
        };
        let tab_id = session.tab_id;

        let Some(origin) = registry.find_tab(tab_id) else {
            warn!(tab_id = %tab_id, "Dropped tab no longer exists");
            self.session = None;
            return DropOutcome::Ignored;
        };
        if registry.window(target_window).is_none() {
            warn!(window_id = %target_window, "Drop target window is gone");
            self.session = None;
            return DropOutcome::Ignored;
        }

        if origin == target_window {
            let outcome = reorder(registry, target_window, tab_id, target_index);
            self.session = None;
            return outcome;
        }

        let outcome = move_across(registry, origin, target_window, tab_id, target_index);
        session.is_moving_tab = true;
        session.moved = Some(outcome);
        outcome
    }

    /// Handles the release of a drag that did not land in a tab strip.
    /// `frame` is the source window's frame. Always ends the session.
    pub fn drop_outside(
        &mut self,
        registry: &mut WindowRegistry,
        point: Point,
        frame: Rect,
    ) -> DropOutcome {
        let Some(session) = self.session.take() else {
            return DropOutcome::Ignored;
        };

        if frame.tab_strip().contains(point) {
            debug!(tab_id = %session.tab_id, "Released inside tab strip");
            return DropOutcome::InsideTabStrip;
        }

        if session.is_moving_tab {
            return session.moved.unwrap_or(DropOutcome::Ignored);
        }

        let Some(origin) = registry.find_tab(session.tab_id) else {
            warn!(tab_id = %session.tab_id, "Released tab no longer exists");
            return DropOutcome::Ignored;
        };
        let Some(window) = registry.window_mut(origin) else {
            return DropOutcome::Ignored;
        };

        if window.tabs.tab_count() <= 1 {
            debug!(tab_id = %session.tab_id, "Single tab released outside; left in place");
            return DropOutcome::Unchanged;
        }

        let tab = match window.tabs.take_tab(session.tab_id) {
            Ok((_, tab)) => tab,
            Err(e) => {
                warn!(error = %e, "Failed to detach dragged tab");
                return DropOutcome::Ignored;
            }
        };

        let new_window = registry.spawn_window_with_tab(tab, frame.centered_below(point));
        info!(
            tab_id = %session.tab_id,
            origin = %origin,
            window_id = %new_window,
            "Tab detached into new window"
        );
        DropOutcome::SpawnedWindow { window: new_window }
    }

    /// Abandons the current drag, if any.
    pub fn end_drag(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(tab_id = %session.tab_id, "Drag ended");
        }
    }
}

fn reorder(
    registry: &mut WindowRegistry,
    window_id: WindowId,
    tab_id: TabId,
    target_index: usize,
) -> DropOutcome {
    let Some(window) = registry.window_mut(window_id) else {
        return DropOutcome::Ignored;
    };
    let index = target_index.min(window.tabs.tab_count().saturating_sub(1));

    match window.tabs.move_tab(tab_id, index) {
        Ok(()) => {
            debug!(tab_id = %tab_id, window_id = %window_id, index, "Tab reordered");
            DropOutcome::Reordered {
                window: window_id,
                index,
            }
        }
        Err(e) => {
            warn!(error = %e, "Reorder failed");
            DropOutcome::Ignored
        }
    }
}

/// Removes the tab from `origin` and inserts it into `target` in one step,
/// so it is never in both sequences. An emptied origin window is closed.
fn move_across(
    registry: &mut WindowRegistry,
    origin: WindowId,
    target: WindowId,
    tab_id: TabId,
    target_index: usize,
) -> DropOutcome {
    let Some(origin_window) = registry.window_mut(origin) else {
        return DropOutcome::Ignored;
    };
    let tab = match origin_window.tabs.take_tab(tab_id) {
        Ok((_, tab)) => tab,
        Err(e) => {
            warn!(error = %e, "Failed to detach tab from origin window");
            return DropOutcome::Ignored;
        }
    };
    let origin_empty = origin_window.tabs.is_empty();

    let Some(target_window) = registry.window_mut(target) else {
        return DropOutcome::Ignored;
    };
    let index = target_window.tabs.insert_tab(target_index, tab, true);

    let origin_closed = origin_empty && registry.close_window(origin).is_ok();

    info!(
        tab_id = %tab_id,
        origin = %origin,
        target = %target,
        index,
        origin_closed,
        "Tab moved across windows"
    );
    DropOutcome::MovedAcrossWindows {
        origin,
        target,
        index,
        origin_closed,
    }
}

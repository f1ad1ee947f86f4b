//! Single-node selection: at most one active node, plus the ribbons that
//! pass through it.
//!
//! The active address survives re-layouts; callers pass each freshly
//! computed [`SankeyLayout`] and the address is re-resolved against it.

use std::fmt;

use crate::ir::Address;
use crate::layout::{NodeLayout, SankeyLayout};
use crate::theme::Color;

pub type NodeCallback = Box<dyn FnMut(&NodeLayout)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Active(Address),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverPhase {
    Enter,
    Leave,
}

/// What the renderer should emphasize after a transition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Highlight {
    pub node: Option<Address>,
    /// Indices into [`SankeyLayout::flows`].
    pub ribbons: Vec<usize>,
    pub color: Option<Color>,
}

impl Highlight {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    pub fn contains_ribbon(&self, idx: usize) -> bool {
        self.ribbons.contains(&idx)
    }

    fn for_node(layout: &SankeyLayout, node: &NodeLayout) -> Self {
        Self {
            node: Some(node.address),
            ribbons: layout.ribbons_through(node.address),
            color: Some(node.color),
        }
    }
}

#[derive(Default)]
pub struct Selection {
    state: SelectionState,
    on_node_selected: Option<NodeCallback>,
    on_node_deselected: Option<NodeCallback>,
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("state", &self.state)
            .field("on_node_selected", &self.on_node_selected.is_some())
            .field("on_node_deselected", &self.on_node_deselected.is_some())
            .finish()
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_node_selected(mut self, callback: impl FnMut(&NodeLayout) + 'static) -> Self {
        self.on_node_selected = Some(Box::new(callback));
        self
    }

    pub fn on_node_deselected(mut self, callback: impl FnMut(&NodeLayout) + 'static) -> Self {
        self.on_node_deselected = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected_address(&self) -> Option<Address> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Active(address) => Some(address),
        }
    }

    /// Records `address` as active without firing callbacks; the next
    /// [`Selection::reapply`] resolves it against a layout.
    pub fn set_selected_address(&mut self, address: Option<Address>) {
        self.state = match address {
            Some(address) => SelectionState::Active(address),
            None => SelectionState::Idle,
        };
    }

    pub fn is_active(&self, address: Address) -> bool {
        self.state == SelectionState::Active(address)
    }

    /// Click on a node: toggles it, or moves the selection to it.
    ///
    /// Unknown addresses leave the state unchanged.
    pub fn activate(&mut self, layout: &SankeyLayout, address: Address) -> Highlight {
        let Some(node) = layout.node(address) else {
            tracing::warn!(%address, "activate on unknown node ignored");
            return self.current_highlight(layout);
        };

        if let SelectionState::Active(previous) = self.state {
            if let Some(prev_node) = layout.node(previous) {
                if let Some(callback) = self.on_node_deselected.as_mut() {
                    callback(prev_node);
                }
            }
            self.state = SelectionState::Idle;
            if previous == address {
                tracing::debug!(%address, "node deselected");
                return Highlight::none();
            }
        }

        self.select(layout, node)
    }

    /// Re-resolves the recorded address against a fresh layout and
    /// re-applies its highlight, firing the selected callback again.
    /// An address that no longer resolves clears the selection.
    pub fn reapply(&mut self, layout: &SankeyLayout) -> Highlight {
        let SelectionState::Active(address) = self.state else {
            return Highlight::none();
        };
        match layout.node(address) {
            Some(node) => self.select(layout, node),
            None => {
                tracing::warn!(%address, "selected node missing after re-layout; clearing");
                self.state = SelectionState::Idle;
                Highlight::none()
            }
        }
    }

    /// Fill to apply to a hovered node, or `None` when the node is active
    /// and hover must not touch it.
    pub fn hover(
        &self,
        layout: &SankeyLayout,
        address: Address,
        phase: HoverPhase,
    ) -> Option<Color> {
        if self.is_active(address) {
            return None;
        }
        let node = layout.node(address)?;
        Some(match phase {
            HoverPhase::Enter => node.color.brighter(1.0),
            HoverPhase::Leave => node.color,
        })
    }

    /// Highlight for the current state without any transition.
    pub fn current_highlight(&self, layout: &SankeyLayout) -> Highlight {
        self.selected_address()
            .and_then(|address| layout.node(address))
            .map(|node| Highlight::for_node(layout, node))
            .unwrap_or_default()
    }

    fn select(&mut self, layout: &SankeyLayout, node: &NodeLayout) -> Highlight {
        self.state = SelectionState::Active(node.address);
        tracing::debug!(address = %node.address, "node selected");
        if let Some(callback) = self.on_node_selected.as_mut() {
            callback(node);
        }
        Highlight::for_node(layout, node)
    }
}

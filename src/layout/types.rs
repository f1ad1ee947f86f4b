use serde::Serialize;

use crate::ir::{Address, LabelSide};
use crate::theme::Color;

/// Aggregate flow volume through an entity, before scaling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Sizes {
    pub size_in: f32,
    pub size_out: f32,
    pub size: f32,
}

impl Sizes {
    pub(crate) fn add_in(&mut self, magnitude: f32) {
        self.size_in += magnitude;
    }

    pub(crate) fn add_out(&mut self, magnitude: f32) {
        self.size_out += magnitude;
    }

    /// Size is the larger side, never the sum.
    pub(crate) fn settle(&mut self) {
        self.size = self.size_in.max(self.size_out);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeLayout {
    pub address: Address,
    pub unique_id: String,
    pub title: String,
    pub color: Color,
    #[serde(flatten)]
    pub sizes: Sizes,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeLayout {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Vertical bracket and text anchor for a group label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupLabelLayout {
    pub line_x: f32,
    pub line_y0: f32,
    pub line_y1: f32,
    pub text_x: f32,
    pub text_y: f32,
    pub text_dx: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupLayout {
    pub title: String,
    pub label: LabelSide,
    #[serde(flatten)]
    pub sizes: Sizes,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_layout: Option<GroupLabelLayout>,
    pub nodes: Vec<NodeLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerLayout {
    pub title: String,
    /// Normalized column position as supplied by the caller.
    pub x: f32,
    #[serde(flatten)]
    pub sizes: Sizes,
    pub total_height: f32,
    pub y: f32,
    pub label_x: f32,
    pub label_y: f32,
    pub groups: Vec<GroupLayout>,
}

impl LayerLayout {
    pub fn node_count(&self) -> usize {
        self.groups.iter().map(|group| group.nodes.len()).sum()
    }

    /// Gaps between consecutive nodes, summed over all groups.
    pub fn node_spacings(&self) -> usize {
        self.groups
            .iter()
            .map(|group| group.nodes.len().saturating_sub(1))
            .sum()
    }

    pub fn group_spacings(&self) -> usize {
        self.groups.len().saturating_sub(1)
    }

    /// Magnitude actually stacked down the column: the sum of node sizes.
    ///
    /// Equals `sizes.size` when every node is balanced, and exceeds it when
    /// the layer mixes sink-only and source-only nodes.
    pub fn stacked_size(&self) -> f32 {
        self.groups
            .iter()
            .flat_map(|group| &group.nodes)
            .map(|node| node.sizes.size)
            .sum()
    }
}

/// One corner column of a ribbon polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaPoint {
    pub x: f32,
    pub y0: f32,
    pub y1: f32,
}

/// One hop of a flow, drawn as a filled area between `source` and `target`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowRibbon {
    /// Index of the flow in the diagram input.
    pub flow: usize,
    pub magnitude: f32,
    pub source: Address,
    pub target: Address,
    pub area: [AreaPoint; 4],
    /// `flow passes-l-g-n ...` for every node on the full path.
    pub classes: String,
}

impl FlowRibbon {
    pub fn passes(&self, address: Address) -> bool {
        let token = address.passes_class();
        self.classes.split(' ').any(|class| class == token)
    }

    pub fn thickness(&self) -> f32 {
        self.area[0].y1 - self.area[0].y0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SankeyLayout {
    pub width: f32,
    pub height: f32,
    pub available_width: f32,
    pub available_height: f32,
    pub node_width: f32,
    pub yscale: f32,
    pub layers: Vec<LayerLayout>,
    pub flows: Vec<FlowRibbon>,
}

impl SankeyLayout {
    pub fn node(&self, address: Address) -> Option<&NodeLayout> {
        self.layers
            .get(address.layer)?
            .groups
            .get(address.group)?
            .nodes
            .get(address.node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeLayout> {
        self.layers
            .iter()
            .flat_map(|layer| &layer.groups)
            .flat_map(|group| &group.nodes)
    }

    /// Indices into `flows` of every ribbon whose flow visits `address`.
    pub fn ribbons_through(&self, address: Address) -> Vec<usize> {
        self.flows
            .iter()
            .enumerate()
            .filter_map(|(idx, ribbon)| ribbon.passes(address).then_some(idx))
            .collect()
    }
}

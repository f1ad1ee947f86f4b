use crate::ir::{Address, Diagram};
use crate::theme::Color;

use super::types::{GroupLayout, LayerLayout, NodeLayout, Sizes};

/// Builds a fresh working hierarchy mirroring `diagram` with every derived
/// attribute zeroed, then accumulates flow volume into it.
///
/// Paths must already be validated; every hop resolves to a node.
pub(super) fn size_hierarchy(diagram: &Diagram, node_width: f32) -> Vec<LayerLayout> {
    let mut layers: Vec<LayerLayout> = diagram
        .layers
        .iter()
        .enumerate()
        .map(|(layer_idx, layer)| LayerLayout {
            title: layer.title.clone(),
            x: layer.x,
            sizes: Sizes::default(),
            total_height: 0.0,
            y: 0.0,
            label_x: 0.0,
            label_y: 0.0,
            groups: layer
                .items
                .iter()
                .enumerate()
                .map(|(group_idx, group)| GroupLayout {
                    title: group.title.clone(),
                    label: group.label,
                    sizes: Sizes::default(),
                    x: 0.0,
                    y: 0.0,
                    width: node_width,
                    height: 0.0,
                    label_layout: None,
                    nodes: group
                        .items
                        .iter()
                        .enumerate()
                        .map(|(node_idx, node)| NodeLayout {
                            address: Address::new(layer_idx, group_idx, node_idx),
                            unique_id: String::new(),
                            title: node.title.clone(),
                            color: Color::resolve(node.color.as_deref()),
                            sizes: Sizes::default(),
                            x: 0.0,
                            y: 0.0,
                            width: node_width,
                            height: 0.0,
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    for flow in &diagram.flows {
        let last = flow.path.len().saturating_sub(1);
        for (hop, address) in flow.path.iter().enumerate() {
            let layer = &mut layers[address.layer];
            let group = &mut layer.groups[address.group];
            let node = &mut group.nodes[address.node];
            if hop > 0 {
                layer.sizes.add_in(flow.magnitude);
                group.sizes.add_in(flow.magnitude);
                node.sizes.add_in(flow.magnitude);
            }
            if hop < last {
                layer.sizes.add_out(flow.magnitude);
                group.sizes.add_out(flow.magnitude);
                node.sizes.add_out(flow.magnitude);
            }
        }
    }

    for layer in &mut layers {
        layer.sizes.settle();
        for group in &mut layer.groups {
            group.sizes.settle();
            for node in &mut group.nodes {
                node.sizes.settle();
            }
        }
    }

    layers
}

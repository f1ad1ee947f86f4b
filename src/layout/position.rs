use crate::config::SankeyConfig;

use super::scale::spacing_overhead;
use super::types::{GroupLabelLayout, LayerLayout};

/// Assigns absolute geometry to every layer, group and node.
///
/// Each layer is centered vertically; groups stack top to bottom with
/// `group_padding` inside and `group_spacing` between them, nodes stack
/// with `node_spacing` between them. No trailing gap follows the last
/// node of a group or the last group of a layer.
pub(super) fn position_hierarchy(layers: &mut [LayerLayout], yscale: f32, config: &SankeyConfig) {
    let available_width = config.available_width();
    let available_height = config.available_height();
    let space = &config.label_space;

    for layer in layers.iter_mut() {
        layer.total_height = layer.stacked_size() * yscale + spacing_overhead(layer, config);
        layer.y = 0.5 * (available_height - layer.total_height) + space.top;

        let column_x = space.left + (available_width - config.node_width) * layer.x;
        layer.label_x = column_x + 0.5 * config.node_width;
        layer.label_y = 0.5 * space.top;

        let group_count = layer.groups.len();
        let mut y = layer.y;
        for (group_idx, group) in layer.groups.iter_mut().enumerate() {
            group.x = column_x;
            group.y = y;
            group.width = config.node_width;
            y += config.group_padding;

            let node_count = group.nodes.len();
            for (node_idx, node) in group.nodes.iter_mut().enumerate() {
                node.x = group.x;
                node.y = y;
                node.width = config.node_width;
                y += node.sizes.size * yscale;
                node.height = y - node.y;
                node.unique_id = node.address.unique_id();
                if node_idx + 1 < node_count {
                    y += config.node_spacing;
                }
            }

            y += config.group_padding;
            group.height = y - group.y;
            group.label_layout = group.label.is_visible().then(|| {
                let side = group.label.sign();
                let label_x = group.x + 0.5 * config.node_width + 0.5 * side * config.node_width;
                GroupLabelLayout {
                    line_x: label_x + config.group_label_distance * side,
                    line_y0: group.y + config.group_padding,
                    line_y1: group.y + group.height - config.group_padding,
                    text_x: label_x,
                    text_y: group.y + 0.5 * group.height,
                    text_dx: side * config.group_label_distance * 2.0,
                }
            });

            if group_idx + 1 < group_count {
                y += config.group_spacing;
            }
        }
    }
}

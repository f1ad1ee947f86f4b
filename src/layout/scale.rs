use crate::config::SankeyConfig;

use super::types::LayerLayout;

/// Pixel height a layer needs for spacing and padding alone.
pub(super) fn spacing_overhead(layer: &LayerLayout, config: &SankeyConfig) -> f32 {
    layer.group_spacings() as f32 * config.group_spacing
        + 2.0 * layer.groups.len() as f32 * config.group_padding
        + layer.node_spacings() as f32 * config.node_spacing
}

/// Shared magnitude-to-pixel factor: the tightest layer exactly fills the
/// available height. Zero-size layers place no constraint; when no layer
/// has volume the scale is zero.
pub(super) fn solve_yscale(layers: &[LayerLayout], config: &SankeyConfig) -> f32 {
    let available = config.available_height();
    let candidate = layers
        .iter()
        .map(|layer| (layer, layer.stacked_size()))
        .filter(|&(_, size)| size > 0.0)
        .map(|(layer, size)| (available - spacing_overhead(layer, config)) / size)
        .fold(None, |best: Option<f32>, value| {
            Some(best.map_or(value, |best| best.min(value)))
        });

    match candidate {
        Some(yscale) => {
            if yscale < 0.0 {
                tracing::warn!(
                    yscale,
                    "spacing exceeds available height; clamping scale to zero"
                );
            }
            yscale.max(0.0)
        }
        None => {
            tracing::warn!("every layer has zero size; laying out spacing only");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Address, LabelSide};
    use crate::layout::types::{GroupLayout, NodeLayout, Sizes};

    fn node(idx: usize, size_in: f32, size_out: f32) -> NodeLayout {
        NodeLayout {
            address: Address::new(0, 0, idx),
            unique_id: String::new(),
            title: String::new(),
            color: Default::default(),
            sizes: Sizes {
                size_in,
                size_out,
                size: size_in.max(size_out),
            },
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 0.0,
        }
    }

    fn group(nodes: Vec<NodeLayout>) -> GroupLayout {
        GroupLayout {
            title: String::new(),
            label: LabelSide::Hidden,
            sizes: Sizes::default(),
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 0.0,
            label_layout: None,
            nodes,
        }
    }

    fn with_groups(groups: Vec<GroupLayout>) -> LayerLayout {
        let mut sizes = Sizes::default();
        for node in groups.iter().flat_map(|group| &group.nodes) {
            sizes.size_in += node.sizes.size_in;
            sizes.size_out += node.sizes.size_out;
        }
        sizes.size = sizes.size_in.max(sizes.size_out);
        LayerLayout {
            title: String::new(),
            x: 0.0,
            sizes,
            total_height: 0.0,
            y: 0.0,
            label_x: 0.0,
            label_y: 0.0,
            groups,
        }
    }

    /// Balanced layer of `size` carried by the first node.
    fn layer(size: f32, nodes_per_group: &[usize]) -> LayerLayout {
        let mut carried = false;
        let groups = nodes_per_group
            .iter()
            .map(|&count| {
                let nodes = (0..count)
                    .map(|idx| {
                        let size = if carried { 0.0 } else { size };
                        carried = true;
                        node(idx, size, size)
                    })
                    .collect();
                group(nodes)
            })
            .collect();
        with_groups(groups)
    }

    fn config() -> SankeyConfig {
        // available height 450
        SankeyConfig::default().with_group_spacing(5.0)
    }

    #[test]
    fn tightest_layer_sets_the_scale() {
        let cfg = config();
        // loose: 450 - 20 = 430 over 10 -> 43
        let loose = layer(10.0, &[1]);
        // tight: 450 - 5 - 40 - 3*2 = 399 over 20 -> 19.95
        let tight = layer(20.0, &[2, 2]);
        let yscale = solve_yscale(&[loose, tight], &cfg);
        assert!((yscale - 19.95).abs() < 1e-4);
    }

    #[test]
    fn zero_size_layers_are_ignored() {
        let cfg = config();
        let yscale = solve_yscale(&[layer(0.0, &[3]), layer(10.0, &[1])], &cfg);
        assert!((yscale - 43.0).abs() < 1e-4);
    }

    #[test]
    fn all_zero_layers_collapse_to_zero_scale() {
        let cfg = config();
        assert_eq!(solve_yscale(&[layer(0.0, &[1]), layer(0.0, &[2])], &cfg), 0.0);
        assert_eq!(solve_yscale(&[], &cfg), 0.0);
    }

    #[test]
    fn spacing_beyond_available_height_clamps_to_zero() {
        // 450 available, 40 groups padded twice is 800 before any volume
        let cfg = config();
        let crowded = layer(10.0, &[1; 40]);
        assert!(spacing_overhead(&crowded, &cfg) > cfg.available_height());
        assert_eq!(solve_yscale(&[crowded], &cfg), 0.0);
    }

    #[test]
    fn mixed_sink_and_source_layer_uses_stacked_size() {
        let cfg = config();
        // sink takes 4 in, source sends 6 out: layer.size is 6, the column stacks 10
        let mixed = with_groups(vec![group(vec![node(0, 4.0, 0.0), node(1, 0.0, 6.0)])]);
        assert_eq!(mixed.sizes.size, 6.0);
        assert_eq!(mixed.stacked_size(), 10.0);
        // 450 - 20 - 3 = 427 over 10
        let yscale = solve_yscale(&[mixed], &cfg);
        assert!((yscale - 42.7).abs() < 1e-4);
    }

    #[test]
    fn overhead_counts_gaps_not_items() {
        let cfg = config();
        let overhead = spacing_overhead(&layer(1.0, &[3, 1]), &cfg);
        // 1 group gap, 2 groups padded twice, 2 node gaps
        assert_eq!(overhead, 5.0 + 40.0 + 6.0);
    }
}

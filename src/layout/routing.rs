use std::collections::HashMap;

use crate::config::SankeyConfig;
use crate::ir::{Address, Flow};

use super::types::{AreaPoint, FlowRibbon, LayerLayout, NodeLayout};

/// Next free offset on each side of a node. `None` until the first lane
/// is allocated there, at which point allocation starts at the node top.
#[derive(Debug, Clone, Copy, Default)]
struct LaneCursor {
    filled_in_y: Option<f32>,
    filled_out_y: Option<f32>,
}

/// Working copy of a flow; `hop` indexes the current source in `path`.
#[derive(Debug, Clone)]
struct PendingFlow {
    index: usize,
    magnitude: f32,
    path: Vec<Address>,
    hop: usize,
    classes: String,
}

impl PendingFlow {
    fn from(&self) -> Address {
        self.path[self.hop]
    }

    fn to(&self) -> Address {
        self.path[self.hop + 1]
    }

    fn remaining(&self) -> usize {
        self.path.len() - self.hop
    }
}

fn node_at(layers: &[LayerLayout], address: Address) -> &NodeLayout {
    &layers[address.layer].groups[address.group].nodes[address.node]
}

/// Allocates a lane for every hop of every flow and emits one ribbon per hop.
///
/// Rounds process one source layer at a time in `(from, to)` address order,
/// so lanes stack contiguously at each node in a reproducible order. The
/// caller's flows are only read; paths are walked on a private copy.
pub(super) fn route_flows(
    flows: &[Flow],
    layers: &[LayerLayout],
    yscale: f32,
    config: &SankeyConfig,
) -> Vec<FlowRibbon> {
    let mut pending: Vec<PendingFlow> = flows
        .iter()
        .enumerate()
        .map(|(index, flow)| PendingFlow {
            index,
            magnitude: flow.magnitude,
            path: flow.path.clone(),
            hop: 0,
            classes: format!("flow {}", flow.membership_classes()),
        })
        .collect();

    let hop_count: usize = flows.iter().map(|f| f.path.len().saturating_sub(1)).sum();
    let mut ribbons = Vec::with_capacity(hop_count);
    let mut cursors: HashMap<Address, LaneCursor> = HashMap::new();
    let mut round = 0usize;

    loop {
        pending.retain(|flow| flow.remaining() > 1);
        if pending.is_empty() {
            break;
        }
        // stable: flows with identical hops keep input order
        pending.sort_by(|a, b| a.from().cmp(&b.from()).then_with(|| a.to().cmp(&b.to())));

        let layer_idx = pending[0].from().layer;
        let mut batch = 0usize;
        for flow in pending.iter_mut().filter(|f| f.from().layer == layer_idx) {
            let from = flow.from();
            let to = flow.to();
            let source = node_at(layers, from);
            let target = node_at(layers, to);
            let h = flow.magnitude * yscale;

            let source_cursor = cursors.entry(from).or_default();
            let source_y0 = source_cursor.filled_out_y.unwrap_or(source.y);
            let source_y1 = source_y0 + h;
            source_cursor.filled_out_y = Some(source_y1);

            let target_cursor = cursors.entry(to).or_default();
            let target_y0 = target_cursor.filled_in_y.unwrap_or(target.y);
            let target_y1 = target_y0 + h;
            target_cursor.filled_in_y = Some(target_y1);

            let source_x = source.x + config.node_width;
            ribbons.push(FlowRibbon {
                flow: flow.index,
                magnitude: flow.magnitude,
                source: from,
                target: to,
                area: [
                    AreaPoint {
                        x: source_x,
                        y0: source_y0,
                        y1: source_y1,
                    },
                    AreaPoint {
                        x: source_x + config.flow_start_width,
                        y0: source_y0,
                        y1: source_y1,
                    },
                    AreaPoint {
                        x: target.x - config.flow_start_width,
                        y0: target_y0,
                        y1: target_y1,
                    },
                    AreaPoint {
                        x: target.x,
                        y0: target_y0,
                        y1: target_y1,
                    },
                ],
                classes: flow.classes.clone(),
            });

            flow.hop += 1;
            batch += 1;
        }
        tracing::trace!(round, layer = layer_idx, batch, "routed flow batch");
        round += 1;
    }

    tracing::debug!(rounds = round, ribbons = ribbons.len(), "flow routing complete");
    ribbons
}

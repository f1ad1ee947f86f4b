use crate::ir::{Address, Diagram};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("flow {flow} hop {hop} references missing node {address}")]
    InvalidAddress {
        flow: usize,
        hop: usize,
        address: Address,
    },
    #[error("flow {flow} has {len} hop(s); a path needs at least two")]
    ShortPath { flow: usize, len: usize },
    #[error("flow {flow} has invalid magnitude {magnitude}")]
    InvalidMagnitude { flow: usize, magnitude: f32 },
    #[error("layer {layer} has column position {x} outside [0, 1]")]
    InvalidColumn { layer: usize, x: f32 },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Checks the whole input before any geometry is computed.
pub(super) fn validate(diagram: &Diagram) -> Result<()> {
    for (layer, entry) in diagram.layers.iter().enumerate() {
        if !entry.x.is_finite() || !(0.0..=1.0).contains(&entry.x) {
            return Err(LayoutError::InvalidColumn { layer, x: entry.x });
        }
    }
    for (flow, entry) in diagram.flows.iter().enumerate() {
        if !entry.magnitude.is_finite() || entry.magnitude < 0.0 {
            return Err(LayoutError::InvalidMagnitude {
                flow,
                magnitude: entry.magnitude,
            });
        }
        if entry.path.len() < 2 {
            return Err(LayoutError::ShortPath {
                flow,
                len: entry.path.len(),
            });
        }
        if let Some((hop, address)) = entry
            .path
            .iter()
            .enumerate()
            .find(|(_, address)| !diagram.contains(**address))
        {
            return Err(LayoutError::InvalidAddress {
                flow,
                hop,
                address: *address,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::LabelSide;

    fn two_nodes() -> Diagram {
        let mut diagram = Diagram::new();
        for (idx, x) in [0.0, 1.0].into_iter().enumerate() {
            diagram.push_layer(format!("L{idx}"), x);
            diagram.push_group(idx, "G", LabelSide::Hidden);
            diagram.push_node(idx, 0, "N", None);
        }
        diagram
    }

    #[test]
    fn reports_offending_flow_and_hop() {
        let mut diagram = two_nodes();
        diagram.push_flow(1.0, vec![Address::new(0, 0, 0), Address::new(1, 0, 0)]);
        diagram.push_flow(1.0, vec![Address::new(0, 0, 0), Address::new(1, 3, 0)]);
        assert_eq!(
            validate(&diagram),
            Err(LayoutError::InvalidAddress {
                flow: 1,
                hop: 1,
                address: Address::new(1, 3, 0),
            })
        );
    }

    #[test]
    fn rejects_single_hop_and_negative_flows() {
        let mut diagram = two_nodes();
        diagram.push_flow(1.0, vec![Address::new(0, 0, 0)]);
        assert!(matches!(
            validate(&diagram),
            Err(LayoutError::ShortPath { flow: 0, len: 1 })
        ));

        let mut diagram = two_nodes();
        diagram.push_flow(-2.0, vec![Address::new(0, 0, 0), Address::new(1, 0, 0)]);
        assert!(matches!(
            validate(&diagram),
            Err(LayoutError::InvalidMagnitude { flow: 0, .. })
        ));
    }

    #[test]
    fn rejects_column_outside_unit_range() {
        let mut diagram = two_nodes();
        diagram.layers[1].x = 1.5;
        assert_eq!(
            validate(&diagram),
            Err(LayoutError::InvalidColumn { layer: 1, x: 1.5 })
        );
    }
}

mod error;
mod position;
mod routing;
mod scale;
mod sizing;
pub(crate) mod types;
pub use error::{LayoutError, Result};
pub use types::*;

use crate::config::SankeyConfig;
use crate::ir::Diagram;

use position::position_hierarchy;
use routing::route_flows;
use scale::solve_yscale;
use sizing::size_hierarchy;

/// Lays out `diagram` in one pass: size the hierarchy, solve the shared
/// scale, position every entity, then route flows into lanes.
///
/// The input is never mutated, so calling this again with the same diagram
/// and config yields identical geometry.
pub fn compute_layout(diagram: &Diagram, config: &SankeyConfig) -> Result<SankeyLayout> {
    let _span = tracing::debug_span!(
        "compute_layout",
        layers = diagram.layers.len(),
        flows = diagram.flows.len()
    )
    .entered();

    error::validate(diagram)?;

    let mut layers = size_hierarchy(diagram, config.node_width);
    let yscale = solve_yscale(&layers, config);
    tracing::debug!(yscale, "solved shared scale");
    position_hierarchy(&mut layers, yscale, config);
    let flows = route_flows(&diagram.flows, &layers, yscale, config);

    Ok(SankeyLayout {
        width: config.width,
        height: config.height,
        available_width: config.available_width(),
        available_height: config.available_height(),
        node_width: config.node_width,
        yscale,
        layers,
        flows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Address, LabelSide};

    fn single_flow() -> Diagram {
        let mut diagram = Diagram::new();
        diagram.push_layer("from", 0.0);
        diagram.push_group(0, "g", LabelSide::Hidden);
        diagram.push_node(0, 0, "source", None);
        diagram.push_layer("to", 1.0);
        diagram.push_group(1, "g", LabelSide::Hidden);
        diagram.push_node(1, 0, "sink", None);
        diagram.push_flow(10.0, vec![Address::new(0, 0, 0), Address::new(1, 0, 0)]);
        diagram
    }

    #[test]
    fn single_flow_spans_both_nodes() {
        let config = SankeyConfig::default();
        let layout = compute_layout(&single_flow(), &config).unwrap();
        // 450 available, 20 padding in each single-group layer
        assert!((layout.yscale - 43.0).abs() < 1e-4);

        let source = layout.node(Address::new(0, 0, 0)).unwrap();
        let sink = layout.node(Address::new(1, 0, 0)).unwrap();
        assert_eq!(source.sizes.size, 10.0);
        assert_eq!(sink.sizes.size, 10.0);

        let ribbon = &layout.flows[0];
        assert_eq!(ribbon.area[0].y0, source.y);
        assert!((ribbon.area[0].y1 - source.bottom()).abs() < 1e-3);
        assert_eq!(ribbon.area[3].y0, sink.y);
        assert!((ribbon.area[3].y1 - sink.bottom()).abs() < 1e-3);
        // the tight layer fills the available height exactly
        assert!((layout.layers[0].total_height - config.available_height()).abs() < 1e-3);
    }

    #[test]
    fn relayout_is_bit_identical() {
        let diagram = single_flow();
        let config = SankeyConfig::default();
        let first = compute_layout(&diagram, &config).unwrap();
        let second = compute_layout(&diagram, &config).unwrap();
        assert_eq!(first.flows, second.flows);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn invalid_input_produces_no_layout() {
        let mut diagram = single_flow();
        diagram.push_flow(1.0, vec![Address::new(0, 0, 0), Address::new(2, 0, 0)]);
        let err = compute_layout(&diagram, &SankeyConfig::default()).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidAddress { flow: 1, hop: 1, .. }));
    }

    #[test]
    fn flowless_diagram_lays_out_spacing_only() {
        let mut diagram = single_flow();
        diagram.flows.clear();
        let layout = compute_layout(&diagram, &SankeyConfig::default()).unwrap();
        assert_eq!(layout.yscale, 0.0);
        assert!(layout.flows.is_empty());
        assert_eq!(layout.layers[0].total_height, 20.0);
    }
}

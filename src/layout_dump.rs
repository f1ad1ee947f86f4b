use crate::layout::SankeyLayout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub yscale: f32,
    pub layers: Vec<LayerDump>,
    pub groups: Vec<GroupDump>,
    pub nodes: Vec<NodeDump>,
    pub ribbons: Vec<RibbonDump>,
}

#[derive(Debug, Serialize)]
pub struct LayerDump {
    pub index: usize,
    pub title: String,
    pub size: f32,
    pub y: f32,
    pub total_height: f32,
}

#[derive(Debug, Serialize)]
pub struct GroupDump {
    pub layer: usize,
    pub index: usize,
    pub title: String,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub title: String,
    pub color: String,
    pub size_in: f32,
    pub size_out: f32,
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct RibbonDump {
    pub flow: usize,
    pub source: String,
    pub target: String,
    pub points: Vec<[f32; 3]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &SankeyLayout) -> Self {
        let mut layers = Vec::new();
        let mut groups = Vec::new();
        for (layer_idx, layer) in layout.layers.iter().enumerate() {
            layers.push(LayerDump {
                index: layer_idx,
                title: layer.title.clone(),
                size: layer.sizes.size,
                y: layer.y,
                total_height: layer.total_height,
            });
            for (group_idx, group) in layer.groups.iter().enumerate() {
                groups.push(GroupDump {
                    layer: layer_idx,
                    index: group_idx,
                    title: group.title.clone(),
                    size: group.sizes.size,
                    x: group.x,
                    y: group.y,
                    height: group.height,
                });
            }
        }

        let nodes = layout
            .nodes()
            .map(|node| NodeDump {
                id: node.unique_id.clone(),
                title: node.title.clone(),
                color: node.color.to_hex(),
                size_in: node.sizes.size_in,
                size_out: node.sizes.size_out,
                x: node.x,
                y: node.y,
                height: node.height,
            })
            .collect();

        let ribbons = layout
            .flows
            .iter()
            .map(|ribbon| RibbonDump {
                flow: ribbon.flow,
                source: ribbon.source.unique_id(),
                target: ribbon.target.unique_id(),
                points: ribbon.area.iter().map(|p| [p.x, p.y0, p.y1]).collect(),
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            yscale: layout.yscale,
            layers,
            groups,
            nodes,
            ribbons,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &SankeyLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

use crate::config::RenderConfig;
use crate::layout::{AreaPoint, SankeyLayout};
use crate::selection::Highlight;
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

const LINE_HEIGHT_EM: f32 = 1.1;

pub fn render_svg(layout: &SankeyLayout, theme: &Theme, highlight: &Highlight) -> String {
    let mut svg = String::new();
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);

    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    let _ = write!(
        svg,
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );

    for layer in &layout.layers {
        svg.push_str("<g class=\"node-layer\">");
        svg.push_str(&text_svg(
            layer.label_x,
            layer.label_y,
            0.0,
            "middle",
            "layer-label",
            &layer.title,
            &theme.text_color,
            theme,
        ));

        for group in &layer.groups {
            svg.push_str("<g class=\"node-group\">");
            let _ = write!(
                svg,
                "<rect class=\"node-group\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\"/>",
                group.x, group.y, group.width, group.height, theme.group_fill, theme.group_stroke
            );
            if let Some(label) = &group.label_layout {
                let anchor = if group.label.sign() < 0.0 { "end" } else { "start" };
                let _ = write!(
                    svg,
                    "<g class=\"node-group-label\"><path d=\"M{:.2},{:.2}L{:.2},{:.2}\" stroke=\"{}\" fill=\"none\"/>",
                    label.line_x, label.line_y0, label.line_x, label.line_y1, theme.group_label_color
                );
                svg.push_str(&text_svg(
                    label.text_x,
                    label.text_y,
                    label.text_dx,
                    anchor,
                    "group-label",
                    &group.title,
                    &theme.group_label_color,
                    theme,
                ));
                svg.push_str("</g>");
            }
            svg.push_str("</g>");
        }
        svg.push_str("</g>");
    }

    for (idx, ribbon) in layout.flows.iter().enumerate() {
        let style = match highlight.color.filter(|_| highlight.contains_ribbon(idx)) {
            Some(color) => format!(
                "fill=\"{}\" fill-opacity=\"{}\"",
                color.to_hex(),
                theme.highlight_opacity
            ),
            None => format!(
                "fill=\"{}\" fill-opacity=\"{}\"",
                theme.flow_fill, theme.flow_opacity
            ),
        };
        let _ = write!(
            svg,
            "<path class=\"{}\" d=\"{}\" {style}/>",
            ribbon.classes,
            area_path(&ribbon.area)
        );
    }

    for node in layout.nodes() {
        let _ = write!(
            svg,
            "<rect class=\"node node-{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"><title>{}</title></rect>",
            node.unique_id,
            node.x,
            node.y,
            node.width,
            node.height,
            node.color.to_hex(),
            escape_xml(&node.title)
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Closed area through the ribbon columns, both edges smoothed with a
/// uniform cubic B-spline.
pub fn area_path(points: &[AreaPoint]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let top: Vec<(f32, f32)> = points.iter().map(|p| (p.x, p.y0)).collect();
    let bottom: Vec<(f32, f32)> = points.iter().rev().map(|p| (p.x, p.y1)).collect();
    let mut d = String::new();
    basis_segment(&mut d, &top, 'M');
    basis_segment(&mut d, &bottom, 'L');
    d.push('Z');
    d
}

fn basis_segment(d: &mut String, points: &[(f32, f32)], start: char) {
    let Some(&(x, y)) = points.first() else {
        return;
    };
    let _ = write!(d, "{start}{x:.2},{y:.2}");
    match points.len() {
        1 => {}
        2 => {
            let (x1, y1) = points[1];
            let _ = write!(d, "L{x1:.2},{y1:.2}");
        }
        _ => {
            let (x0, y0) = points[0];
            let (x1, y1) = points[1];
            let _ = write!(d, "L{:.2},{:.2}", (5.0 * x0 + x1) / 6.0, (5.0 * y0 + y1) / 6.0);
            let mut prev = points[0];
            let mut cur = points[1];
            for &next in &points[2..] {
                push_basis_curve(d, prev, cur, next);
                prev = cur;
                cur = next;
            }
            push_basis_curve(d, prev, cur, cur);
            let _ = write!(d, "L{:.2},{:.2}", cur.0, cur.1);
        }
    }
}

fn push_basis_curve(d: &mut String, p0: (f32, f32), p1: (f32, f32), p: (f32, f32)) {
    let _ = write!(
        d,
        "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
        (2.0 * p0.0 + p1.0) / 3.0,
        (2.0 * p0.1 + p1.1) / 3.0,
        (p0.0 + 2.0 * p1.0) / 3.0,
        (p0.1 + 2.0 * p1.1) / 3.0,
        (p0.0 + 4.0 * p1.0 + p.0) / 6.0,
        (p0.1 + 4.0 * p1.1 + p.1) / 6.0
    );
}

/// `<text>` centered on `y`, one `<tspan>` per `\n`-separated line.
#[allow(clippy::too_many_arguments)]
fn text_svg(
    x: f32,
    y: f32,
    dx: f32,
    anchor: &str,
    class: &str,
    text: &str,
    fill: &str,
    theme: &Theme,
) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let first_dy = 0.3 - (lines.len() as f32 - 1.0) * LINE_HEIGHT_EM * 0.5;
    let mut out = format!(
        "<text class=\"{class}\" x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" fill=\"{fill}\">",
        theme.font_family, theme.font_size
    );
    for (idx, line) in lines.iter().enumerate() {
        let dy = idx as f32 * LINE_HEIGHT_EM + first_dy;
        let _ = write!(
            out,
            "<tspan x=\"{x:.2}\" y=\"{y:.2}\" dx=\"{dx:.2}\" dy=\"{dy:.2}em\">{}</tspan>",
            escape_xml(line)
        );
    }
    out.push_str("</text>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, svg)?,
        None => println!("{svg}"),
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let scale = render_cfg.scale.max(0.1);
    let width = ((size.width() as f32) * scale).ceil() as u32;
    let height = ((size.height() as f32) * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width.max(1), height.max(1))
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap_mut,
    );
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SankeyConfig;
    use crate::ir::{Address, Diagram, LabelSide};
    use crate::layout::compute_layout;
    use crate::selection::Selection;

    fn layout() -> SankeyLayout {
        let mut diagram = Diagram::new();
        diagram.push_layer("Year\n2020", 0.0);
        diagram.push_group(0, "Imports & <exports>", LabelSide::Left);
        let a = diagram.push_node(0, 0, "A", Some("#ff0000")).unwrap();
        diagram.push_layer("Year\n2021", 1.0);
        diagram.push_group(1, "Sinks", LabelSide::Right);
        let b = diagram.push_node(1, 0, "B", None).unwrap();
        let c = diagram.push_node(1, 0, "C", None).unwrap();
        diagram.push_flow(1.0, vec![a, b]);
        diagram.push_flow(2.0, vec![a, c]);
        compute_layout(&diagram, &SankeyConfig::default()).unwrap()
    }

    #[test]
    fn render_svg_basic() {
        let layout = layout();
        let svg = render_svg(&layout, &Theme::classic(), &Highlight::none());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path class=\"flow ").count(), 2);
        assert!(svg.contains("class=\"node node-1-0-1\""));
        assert!(svg.contains("passes-0-0-0 passes-1-0-1"));
        assert!(svg.contains("Imports &amp; &lt;exports&gt;"));
        // two-line layer titles
        assert_eq!(svg.matches(">2020</tspan>").count(), 1);
        assert!(svg.contains("dy=\"-0.25em\""));
    }

    #[test]
    fn highlighted_ribbons_take_node_color() {
        let layout = layout();
        let mut selection = Selection::new();
        let highlight = selection.activate(&layout, Address::new(1, 0, 1));
        let svg = render_svg(&layout, &Theme::classic(), &highlight);
        assert_eq!(svg.matches("fill=\"#aaaaaa\" fill-opacity=\"1\"").count(), 1);
        assert_eq!(svg.matches("fill-opacity=\"0.3\"").count(), 1);
    }

    #[test]
    fn area_path_is_closed_basis_curve() {
        let points = [
            AreaPoint { x: 0.0, y0: 0.0, y1: 6.0 },
            AreaPoint { x: 6.0, y0: 0.0, y1: 6.0 },
            AreaPoint { x: 12.0, y0: 12.0, y1: 18.0 },
            AreaPoint { x: 18.0, y0: 12.0, y1: 18.0 },
        ];
        let d = area_path(&points);
        assert!(d.starts_with("M0.00,0.00L1.00,0.00C"));
        assert!(d.contains("L18.00,18.00"));
        assert!(d.ends_with("L0.00,6.00Z"));
        assert_eq!(d.matches('C').count(), 6);
    }
}

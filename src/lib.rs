#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod selection;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LabelSpace, SankeyConfig};
pub use ir::{Address, Diagram, Flow, LabelSide};
pub use layout::{compute_layout, LayoutError, SankeyLayout};
pub use parser::parse_diagram;
pub use render::render_svg;
pub use selection::{Highlight, HoverPhase, Selection};
pub use theme::{Color, Theme};

/// Options for the one-shot [`render_with_options`] entry point.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: SankeyConfig,
    pub selected: Option<Address>,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::default()
        }
    }

    pub fn with_selected(mut self, address: Option<Address>) -> Self {
        self.selected = address;
        self
    }
}

/// Parses diagram data, lays it out and renders it to SVG.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let diagram = parse_diagram(input)?;
    let layout = compute_layout(&diagram, &options.layout)?;
    let mut selection = Selection::new();
    selection.set_selected_address(options.selected);
    let highlight = selection.reapply(&layout);
    Ok(render_svg(&layout, &options.theme, &highlight))
}

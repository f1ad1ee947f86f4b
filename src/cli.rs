use crate::config::load_config;
use crate::ir::Address;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_diagram;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::selection::{Highlight, Selection};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "psankey", version, about = "Multi-layer path Sankey renderer")]
pub struct Args {
    /// Input diagram data (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (layout constants and theme variables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width, overrides the config file
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height, overrides the config file
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Node to highlight, as layer-group-node (e.g. 0-1-2)
    #[arg(short = 's', long = "select")]
    pub select: Option<Address>,

    /// Write the computed layout as JSON to this path
    #[arg(long = "dump")]
    pub dump: Option<PathBuf>,

    /// Log layout progress to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.layout.width = width;
    }
    if let Some(height) = args.height {
        config.layout.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let diagram = parse_diagram(&input)?;
    let layout = compute_layout(&diagram, &config.layout)?;
    tracing::info!(
        layers = layout.layers.len(),
        ribbons = layout.flows.len(),
        "layout computed"
    );

    if let Some(path) = args.dump.as_deref() {
        write_layout_dump(path, &layout)?;
    }

    let highlight = match args.select {
        Some(address) => {
            let mut selection = Selection::new();
            selection.set_selected_address(Some(address));
            let highlight = selection.reapply(&layout);
            if highlight.is_empty() {
                return Err(anyhow::anyhow!("selected node {address} does not exist"));
            }
            highlight
        }
        None => Highlight::none(),
    };

    let svg = render_svg(&layout, &config.theme, &highlight);
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "path_sankey=debug" } else { "path_sankey=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_and_overrides() {
        let args = Args::try_parse_from([
            "psankey", "-i", "data.json", "-w", "640", "--select", "1-0-2", "-e", "png", "-o",
            "out.png",
        ])
        .unwrap();
        assert_eq!(args.width, Some(640.0));
        assert_eq!(args.height, None);
        assert_eq!(args.select, Some(Address::new(1, 0, 2)));
        assert!(matches!(args.output_format, OutputFormat::Png));
    }

    #[test]
    fn rejects_malformed_address() {
        assert!(Args::try_parse_from(["psankey", "--select", "1-0"]).is_err());
    }

    #[test]
    fn png_needs_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        let path = PathBuf::from("x.png");
        assert_eq!(ensure_output(&Some(path.clone()), "png").unwrap(), path);
    }
}

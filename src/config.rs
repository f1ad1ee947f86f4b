use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pixel insets reserved around the diagram for layer titles and group labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelSpace {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for LabelSpace {
    fn default() -> Self {
        Self {
            top: 50.0,
            left: 30.0,
            right: 30.0,
            bottom: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyConfig {
    /// Total canvas width, label space included.
    pub width: f32,
    /// Total canvas height, label space included.
    pub height: f32,
    pub label_space: LabelSpace,
    /// Vertical gap between sibling nodes of a group.
    pub node_spacing: f32,
    /// Vertical gap between sibling groups of a layer.
    pub group_spacing: f32,
    /// Padding above the first and below the last node of a group.
    pub group_padding: f32,
    pub node_width: f32,
    pub group_label_distance: f32,
    /// Flows run horizontally for this distance before curving.
    pub flow_start_width: f32,
}

impl Default for SankeyConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            label_space: LabelSpace::default(),
            node_spacing: 3.0,
            group_spacing: 0.0,
            group_padding: 10.0,
            node_width: 30.0,
            group_label_distance: 5.0,
            flow_start_width: 20.0,
        }
    }
}

impl SankeyConfig {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn available_width(&self) -> f32 {
        self.width - (self.label_space.left + self.label_space.right)
    }

    pub fn available_height(&self) -> f32 {
        self.height - (self.label_space.top + self.label_space.bottom)
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_label_space(mut self, label_space: LabelSpace) -> Self {
        self.label_space = label_space;
        self
    }

    pub fn with_label_space_left(mut self, left: f32) -> Self {
        self.label_space.left = left;
        self
    }

    pub fn with_label_space_right(mut self, right: f32) -> Self {
        self.label_space.right = right;
        self
    }

    pub fn with_node_spacing(mut self, spacing: f32) -> Self {
        self.node_spacing = spacing;
        self
    }

    pub fn with_group_spacing(mut self, spacing: f32) -> Self {
        self.group_spacing = spacing;
        self
    }

    pub fn with_group_padding(mut self, padding: f32) -> Self {
        self.group_padding = padding;
        self
    }

    pub fn with_node_width(mut self, width: f32) -> Self {
        self.node_width = width;
        self
    }

    pub fn with_group_label_distance(mut self, distance: f32) -> Self {
        self.group_label_distance = distance;
        self
    }

    pub fn with_flow_start_width(mut self, width: f32) -> Self {
        self.flow_start_width = width;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    /// Multiplier applied to the canvas size for raster output.
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: SankeyConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: SankeyConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LabelSpaceFile {
    top: Option<f32>,
    left: Option<f32>,
    right: Option<f32>,
    bottom: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeFile {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    background: Option<String>,
    group_fill: Option<String>,
    group_stroke: Option<String>,
    group_label_color: Option<String>,
    flow_fill: Option<String>,
    flow_opacity: Option<f32>,
    highlight_opacity: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeFile>,
    width: Option<f32>,
    height: Option<f32>,
    label_space: Option<LabelSpaceFile>,
    node_spacing: Option<f32>,
    group_spacing: Option<f32>,
    group_padding: Option<f32>,
    node_width: Option<f32>,
    group_label_distance: Option<f32>,
    flow_start_width: Option<f32>,
    render_scale: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlays a camelCase JSON (or JSON5) config document onto the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    let mut config = Config::default();
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        } else {
            tracing::warn!(theme = theme_name, "unknown theme, keeping default");
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.group_fill {
            config.theme.group_fill = v;
        }
        if let Some(v) = vars.group_stroke {
            config.theme.group_stroke = v;
        }
        if let Some(v) = vars.group_label_color {
            config.theme.group_label_color = v;
        }
        if let Some(v) = vars.flow_fill {
            config.theme.flow_fill = v;
        }
        if let Some(v) = vars.flow_opacity {
            config.theme.flow_opacity = v;
        }
        if let Some(v) = vars.highlight_opacity {
            config.theme.highlight_opacity = v;
        }
    }

    let layout = &mut config.layout;
    if let Some(v) = parsed.width {
        layout.width = v;
    }
    if let Some(v) = parsed.height {
        layout.height = v;
    }
    if let Some(space) = parsed.label_space {
        if let Some(v) = space.top {
            layout.label_space.top = v;
        }
        if let Some(v) = space.left {
            layout.label_space.left = v;
        }
        if let Some(v) = space.right {
            layout.label_space.right = v;
        }
        if let Some(v) = space.bottom {
            layout.label_space.bottom = v;
        }
    }
    if let Some(v) = parsed.node_spacing {
        layout.node_spacing = v;
    }
    if let Some(v) = parsed.group_spacing {
        layout.group_spacing = v;
    }
    if let Some(v) = parsed.group_padding {
        layout.group_padding = v;
    }
    if let Some(v) = parsed.node_width {
        layout.node_width = v;
    }
    if let Some(v) = parsed.group_label_distance {
        layout.group_label_distance = v;
    }
    if let Some(v) = parsed.flow_start_width {
        layout.flow_start_width = v;
    }
    if let Some(v) = parsed.render_scale {
        config.render.scale = v;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_chart_constants() {
        let cfg = SankeyConfig::default();
        assert_eq!(cfg.node_spacing, 3.0);
        assert_eq!(cfg.group_spacing, 0.0);
        assert_eq!(cfg.group_padding, 10.0);
        assert_eq!(cfg.node_width, 30.0);
        assert_eq!(cfg.flow_start_width, 20.0);
        assert_eq!(cfg.available_width(), 900.0);
        assert_eq!(cfg.available_height(), 450.0);
    }

    #[test]
    fn builder_overrides_fields() {
        let cfg = SankeyConfig::new(400.0, 300.0)
            .with_label_space_left(10.0)
            .with_node_width(12.0)
            .with_group_spacing(4.0);
        assert_eq!(cfg.available_width(), 360.0);
        assert_eq!(cfg.node_width, 12.0);
        assert_eq!(cfg.group_spacing, 4.0);
    }

    #[test]
    fn config_file_overlays_defaults() {
        let cfg = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": {"flowOpacity": 0.5},
                "width": 640,
                "labelSpace": {"top": 20},
                "nodeSpacing": 6
            }"##,
        )
        .unwrap();
        assert_eq!(cfg.layout.width, 640.0);
        assert_eq!(cfg.layout.height, 500.0);
        assert_eq!(cfg.layout.label_space.top, 20.0);
        assert_eq!(cfg.layout.label_space.left, 30.0);
        assert_eq!(cfg.layout.node_spacing, 6.0);
        assert_eq!(cfg.theme.flow_opacity, 0.5);
        assert_eq!(cfg.theme.font_size, Theme::modern().font_size);
    }

    #[test]
    fn config_file_accepts_json5() {
        let cfg = parse_config("{ nodeWidth: 18, // thin columns\n }").unwrap();
        assert_eq!(cfg.layout.node_width, 18.0);
    }
}

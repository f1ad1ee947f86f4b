use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fill used for nodes without a color, or with one that does not parse.
pub const DEFAULT_NODE_COLOR: &str = "#aaa";

const BRIGHTER: f32 = 1.0 / 0.7;

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap());
static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*[\d.]+\s*)?\)$")
        .unwrap()
});
static HSL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^hsla?\(\s*(-?[\d.]+)\s*,\s*([\d.]+)%\s*,\s*([\d.]+)%\s*(?:,\s*[\d.]+\s*)?\)$")
        .unwrap()
});

/// A color in HSL space: hue in degrees, saturation and lightness in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Color {
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = r as f32 / 255.0;
        let g = g as f32 / 255.0;
        let b = b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        let d = max - min;
        if d == 0.0 {
            // achromatic; hue is undefined, keep it at zero
            return Self { h: 0.0, s: 0.0, l };
        }
        let s = if l < 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        Self { h: h * 60.0, s, l }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let value = input.trim();
        if let Some(named) = named_color(value) {
            return Self::parse(named);
        }
        if let Some(caps) = HEX_RE.captures(value) {
            let hex = &caps[1];
            let expanded: String = if hex.len() == 3 {
                hex.chars().flat_map(|c| [c, c]).collect()
            } else {
                hex.to_string()
            };
            let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
            return Some(Self::from_rgb(channel(0)?, channel(2)?, channel(4)?));
        }
        if let Some(caps) = RGB_RE.captures(value) {
            let channel = |i: usize| caps[i].parse::<u16>().ok().map(|v| v.min(255) as u8);
            return Some(Self::from_rgb(channel(1)?, channel(2)?, channel(3)?));
        }
        if let Some(caps) = HSL_RE.captures(value) {
            let h = caps[1].parse::<f32>().ok()?.rem_euclid(360.0);
            let s = (caps[2].parse::<f32>().ok()? / 100.0).clamp(0.0, 1.0);
            let l = (caps[3].parse::<f32>().ok()? / 100.0).clamp(0.0, 1.0);
            return Some(Self { h, s, l });
        }
        None
    }

    /// Resolves an optional user color, falling back to [`DEFAULT_NODE_COLOR`].
    pub fn resolve(input: Option<&str>) -> Self {
        input
            .filter(|value| !value.trim().is_empty())
            .and_then(Self::parse)
            .unwrap_or_else(Self::default_node)
    }

    pub fn default_node() -> Self {
        // constant input, always parses
        Self::parse(DEFAULT_NODE_COLOR).unwrap_or(Self {
            h: 0.0,
            s: 0.0,
            l: 2.0 / 3.0,
        })
    }

    /// Lightness scaled by `(1 / 0.7)^k`, matching d3's `brighter`.
    pub fn brighter(&self, k: f32) -> Self {
        Self {
            l: self.l * BRIGHTER.powf(k),
            ..*self
        }
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let l = self.l.clamp(0.0, 1.0);
        let s = self.s.clamp(0.0, 1.0);
        let h = self.h.rem_euclid(360.0);
        let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let m1 = 2.0 * l - m2;
        let channel = |hue: f32| {
            let hue = hue.rem_euclid(360.0);
            let v = if hue < 60.0 {
                m1 + (m2 - m1) * hue / 60.0
            } else if hue < 180.0 {
                m2
            } else if hue < 240.0 {
                m1 + (m2 - m1) * (240.0 - hue) / 60.0
            } else {
                m1
            };
            (v * 255.0).round().clamp(0.0, 255.0) as u8
        };
        (channel(h + 120.0), channel(h), channel(h - 120.0))
    }

    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::default_node()
    }
}

fn named_color(name: &str) -> Option<&'static str> {
    let hex = match name.to_ascii_lowercase().as_str() {
        "black" => "#000000",
        "white" => "#ffffff",
        "gray" | "grey" => "#808080",
        "red" => "#ff0000",
        "green" => "#008000",
        "blue" => "#0000ff",
        "orange" => "#ffa500",
        "purple" => "#800080",
        "steelblue" => "#4682b4",
        "teal" => "#008080",
        "gold" => "#ffd700",
        _ => return None,
    };
    Some(hex)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub background: String,
    pub group_fill: String,
    pub group_stroke: String,
    pub group_label_color: String,
    pub flow_fill: String,
    pub flow_opacity: f32,
    pub highlight_opacity: f32,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            text_color: "#333333".to_string(),
            background: "#FFFFFF".to_string(),
            group_fill: "#EEEEEE".to_string(),
            group_stroke: "none".to_string(),
            group_label_color: "#555555".to_string(),
            flow_fill: "#999999".to_string(),
            flow_opacity: 0.3,
            highlight_opacity: 1.0,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
            group_fill: "#F7FAFF".to_string(),
            group_stroke: "#D7E0F0".to_string(),
            group_label_color: "#7A8AA6".to_string(),
            flow_fill: "#7A8AA6".to_string(),
            flow_opacity: 0.25,
            highlight_opacity: 1.0,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

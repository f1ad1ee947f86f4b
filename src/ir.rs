use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};

/// Position of a node in the layer → group → node hierarchy.
///
/// Ordering is lexicographic on `(layer, group, node)`, which is the order
/// the flow router walks source hops in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Address {
    pub layer: usize,
    pub group: usize,
    pub node: usize,
}

impl Address {
    pub const fn new(layer: usize, group: usize, node: usize) -> Self {
        Self { layer, group, node }
    }

    /// Stable external handle, e.g. `"1-0-2"`.
    pub fn unique_id(&self) -> String {
        self.to_string()
    }

    /// Class token carried by every ribbon of a flow passing this node.
    pub fn passes_class(&self) -> String {
        format!("passes-{self}")
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        self.layer
            .cmp(&other.layer)
            .then_with(|| self.group.cmp(&other.group))
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.layer, self.group, self.node)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node address `{0}` (expected `layer-group-node`)")]
pub struct AddressParseError(pub String);

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 3 {
            return Err(AddressParseError(s.to_string()));
        }
        let mut idx = [0usize; 3];
        for (slot, part) in idx.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse::<usize>()
                .map_err(|_| AddressParseError(s.to_string()))?;
        }
        Ok(Address::new(idx[0], idx[1], idx[2]))
    }
}

// Addresses travel as `[layer, group, node]` triples in diagram data.
impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(3)?;
        tup.serialize_element(&self.layer)?;
        tup.serialize_element(&self.group)?;
        tup.serialize_element(&self.node)?;
        tup.end()
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Triple(Vec<usize>),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Triple(values) if values.len() == 3 => {
                Ok(Address::new(values[0], values[1], values[2]))
            }
            Raw::Triple(values) => Err(de::Error::invalid_length(
                values.len(),
                &"an address of exactly three indices",
            )),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// Which side of its column a group's label is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelSide {
    Left,
    Right,
    #[default]
    Hidden,
}

impl LabelSide {
    /// `-1` for left, `1` for right, `0` when hidden.
    pub fn sign(self) -> f32 {
        match self {
            LabelSide::Left => -1.0,
            LabelSide::Right => 1.0,
            LabelSide::Hidden => 0.0,
        }
    }

    pub fn is_visible(self) -> bool {
        self != LabelSide::Hidden
    }
}

impl Serialize for LabelSide {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.sign() as i8)
    }
}

impl<'de> Deserialize<'de> for LabelSide {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(match raw {
            Some(v) if v < 0.0 => LabelSide::Left,
            Some(v) if v > 0.0 => LabelSide::Right,
            _ => LabelSide::Hidden,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub label: LabelSide,
    #[serde(default)]
    pub items: Vec<Node>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub title: String,
    /// Normalized column position in `[0, 1]`.
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub items: Vec<Group>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flow {
    pub magnitude: f32,
    pub path: Vec<Address>,
}

impl Flow {
    pub fn new(magnitude: f32, path: Vec<Address>) -> Self {
        Self { magnitude, path }
    }

    /// Space-separated `passes-l-g-n` tokens for every hop of the path.
    pub fn membership_classes(&self) -> String {
        self.path
            .iter()
            .map(Address::passes_class)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Immutable diagram input: the node hierarchy plus the flows through it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(rename = "nodes", alias = "layers", default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub flows: Vec<Flow>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, address: Address) -> Option<&Node> {
        self.layers
            .get(address.layer)?
            .items
            .get(address.group)?
            .items
            .get(address.node)
    }

    pub fn contains(&self, address: Address) -> bool {
        self.node(address).is_some()
    }

    /// Pushes a layer and returns its index.
    pub fn push_layer(&mut self, title: impl Into<String>, x: f32) -> usize {
        self.layers.push(Layer {
            title: title.into(),
            x,
            items: Vec::new(),
        });
        self.layers.len() - 1
    }

    /// Pushes a group into `layer` and returns its index, or `None` when
    /// the layer does not exist.
    pub fn push_group(
        &mut self,
        layer: usize,
        title: impl Into<String>,
        label: LabelSide,
    ) -> Option<usize> {
        let groups = &mut self.layers.get_mut(layer)?.items;
        groups.push(Group {
            title: title.into(),
            label,
            items: Vec::new(),
        });
        Some(groups.len() - 1)
    }

    /// Pushes a node and returns its address, or `None` when the group does
    /// not exist.
    pub fn push_node(
        &mut self,
        layer: usize,
        group: usize,
        title: impl Into<String>,
        color: Option<&str>,
    ) -> Option<Address> {
        let nodes = &mut self.layers.get_mut(layer)?.items.get_mut(group)?.items;
        nodes.push(Node {
            title: title.into(),
            color: color.map(str::to_string),
        });
        Some(Address::new(layer, group, nodes.len() - 1))
    }

    pub fn push_flow(&mut self, magnitude: f32, path: Vec<Address>) {
        self.flows.push(Flow::new(magnitude, path));
    }

    pub fn node_count(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| &layer.items)
            .map(|group| group.items.len())
            .sum()
    }
}

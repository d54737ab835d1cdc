//! Flatten/unflatten engine: converts nested translation documents to and
//! from the flat ordered key→text mapping every format round-trips through.
//!
//! Translation values form a closed variant ([`Node`]): a string leaf, an
//! object, or an array of strings/objects. Numbers, booleans, and nulls are
//! rejected at conversion time with the offending path, so the flattening
//! code itself only ever pattern-matches the three legal shapes.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::Error;
use crate::key;

/// Ordered mapping from composite key to translatable text. Insertion order
/// is significant: it drives array reconstruction and target-file key order.
pub type FlatMap = IndexMap<String, String>;

/// A translation document value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A translatable string leaf.
    Text(String),
    /// Nested object of named values, insertion-ordered.
    Object(IndexMap<String, Node>),
    /// Array of strings or objects.
    Array(Vec<Node>),
}

impl Node {
    /// Convert a JSON value into a [`Node`], rejecting unsupported leaf
    /// kinds with the path that holds them.
    pub fn from_json(value: &serde_json::Value) -> Result<Node, Error> {
        Self::from_json_at(value, "")
    }

    fn from_json_at(value: &serde_json::Value, path: &str) -> Result<Node, Error> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(Node::Text(s.clone())),
            Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    let child_path = join_path(path, k);
                    out.insert(k.clone(), Self::from_json_at(v, &child_path)?);
                }
                Ok(Node::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let child_path = format!("{}[{}]", path, i);
                    match item {
                        Value::String(_) | Value::Object(_) => {
                            out.push(Self::from_json_at(item, &child_path)?)
                        }
                        other => {
                            return Err(Error::InvalidValue {
                                path: child_path,
                                found: json_kind(other),
                            });
                        }
                    }
                }
                Ok(Node::Array(out))
            }
            other => Err(Error::InvalidValue {
                path: path.to_string(),
                found: json_kind(other),
            }),
        }
    }

    /// Convert back into a JSON value. Arrays come out as native JSON
    /// arrays, never as bracket-suffixed keys.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Text(s) => serde_json::Value::String(s.clone()),
            Node::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(out)
            }
            Node::Array(items) => {
                serde_json::Value::Array(items.iter().map(Node::to_json).collect())
            }
        }
    }

    /// Convert a YAML value into a [`Node`]. Mapping keys must be strings.
    pub fn from_yaml(value: &serde_yaml::Value) -> Result<Node, Error> {
        Self::from_yaml_at(value, "")
    }

    fn from_yaml_at(value: &serde_yaml::Value, path: &str) -> Result<Node, Error> {
        use serde_yaml::Value;

        match value {
            Value::String(s) => Ok(Node::Text(s.clone())),
            Value::Mapping(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    let Value::String(name) = k else {
                        return Err(Error::InvalidStructure(format!(
                            "non-string mapping key at \"{}\"",
                            path
                        )));
                    };
                    let child_path = join_path(path, name);
                    out.insert(name.clone(), Self::from_yaml_at(v, &child_path)?);
                }
                Ok(Node::Object(out))
            }
            Value::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let child_path = format!("{}[{}]", path, i);
                    match item {
                        Value::String(_) | Value::Mapping(_) => {
                            out.push(Self::from_yaml_at(item, &child_path)?)
                        }
                        other => {
                            return Err(Error::InvalidValue {
                                path: child_path,
                                found: yaml_kind(other),
                            });
                        }
                    }
                }
                Ok(Node::Array(out))
            }
            other => Err(Error::InvalidValue {
                path: path.to_string(),
                found: yaml_kind(other),
            }),
        }
    }

    /// Convert back into a YAML value.
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Node::Text(s) => serde_yaml::Value::String(s.clone()),
            Node::Object(map) => {
                let mut out = serde_yaml::Mapping::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(serde_yaml::Value::String(k.clone()), v.to_yaml());
                }
                serde_yaml::Value::Mapping(out)
            }
            Node::Array(items) => {
                serde_yaml::Value::Sequence(items.iter().map(Node::to_yaml).collect())
            }
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "array",
        serde_yaml::Value::Mapping(_) => "object",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

/// Flatten a document into composite keys. Object properties become
/// `prefix.key` (segment codec-escaped), array elements `prefix[index]`,
/// string leaves are assigned directly.
pub fn flatten(node: &Node) -> FlatMap {
    let mut out = FlatMap::new();
    flatten_into(node, "", &mut out);
    out
}

fn flatten_into(node: &Node, prefix: &str, out: &mut FlatMap) {
    match node {
        Node::Text(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Node::Object(map) => {
            for (k, v) in map {
                let encoded = key::encode(k);
                let child = join_path(prefix, &encoded);
                flatten_into(v, &child, out);
            }
        }
        Node::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let child = format!("{}[{}]", prefix, i);
                flatten_into(item, &child, out);
            }
        }
    }
}

/// One parsed piece of a composite key: a decoded segment name plus any
/// trailing array indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Segment {
    pub name: String,
    pub indices: Vec<usize>,
}

/// Split a composite key into segments. Boundaries are computed before
/// decoding: escaped payloads are base64 and therefore contain no dots or
/// brackets, so a plain scan is unambiguous.
pub(crate) fn split_key(composite: &str) -> Result<Vec<Segment>, Error> {
    let mut segments = Vec::new();

    for part in composite.split('.') {
        let (raw_name, rest) = match part.find('[') {
            Some(pos) => part.split_at(pos),
            None => (part, ""),
        };

        let mut indices = Vec::new();
        let mut remainder = rest;
        while !remainder.is_empty() {
            let Some(stripped) = remainder.strip_prefix('[') else {
                return Err(Error::InvalidStructure(format!(
                    "malformed index suffix in key `{}`",
                    composite
                )));
            };
            let Some(close) = stripped.find(']') else {
                return Err(Error::InvalidStructure(format!(
                    "unclosed index bracket in key `{}`",
                    composite
                )));
            };
            let index = stripped[..close].parse::<usize>().map_err(|_| {
                Error::InvalidStructure(format!("non-numeric index in key `{}`", composite))
            })?;
            indices.push(index);
            remainder = &stripped[close + 1..];
        }

        segments.push(Segment {
            name: key::decode(raw_name)?,
            indices,
        });
    }

    Ok(segments)
}

// Intermediate tree that tolerates out-of-order array indices; arrays are
// finalized in index order, compacting any gaps.
enum Slot {
    Text(String),
    Object(IndexMap<String, Slot>),
    Array(BTreeMap<usize, Slot>),
}

impl Slot {
    fn finalize(self) -> Node {
        match self {
            Slot::Text(s) => Node::Text(s),
            Slot::Object(map) => {
                Node::Object(map.into_iter().map(|(k, v)| (k, v.finalize())).collect())
            }
            Slot::Array(map) => Node::Array(map.into_values().map(Slot::finalize).collect()),
        }
    }
}

/// Rebuild a nested document from a flat mapping. Inverse of [`flatten`]:
/// `unflatten(&flatten(x)) == x` for any document within the supported
/// value kinds.
pub fn unflatten(flat: &FlatMap) -> Result<Node, Error> {
    let mut root = Slot::Object(IndexMap::new());

    for (composite, value) in flat {
        let segments = split_key(composite)?;
        insert(&mut root, &segments, value, composite)?;
    }

    Ok(root.finalize())
}

fn insert(root: &mut Slot, segments: &[Segment], value: &str, composite: &str) -> Result<(), Error> {
    let mut cursor = root;

    for (seg_pos, segment) in segments.iter().enumerate() {
        let last_segment = seg_pos == segments.len() - 1;

        // Descend through the named property, unless this segment is a bare
        // index continuation (possible only at the root of an array value).
        if !segment.name.is_empty() || segment.indices.is_empty() {
            let Slot::Object(map) = cursor else {
                return Err(Error::InvalidStructure(format!(
                    "key `{}` conflicts with an existing value",
                    composite
                )));
            };
            cursor = map
                .entry(segment.name.clone())
                .or_insert_with(|| empty_slot_for(segment, last_segment));
        }

        for (idx_pos, index) in segment.indices.iter().enumerate() {
            let leaf_index = last_segment && idx_pos == segment.indices.len() - 1;
            let Slot::Array(items) = cursor else {
                return Err(Error::InvalidStructure(format!(
                    "key `{}` indexes into a non-array value",
                    composite
                )));
            };
            cursor = items
                .entry(*index)
                .or_insert_with(|| next_slot(leaf_index));
        }

        if last_segment {
            match cursor {
                Slot::Text(existing) => *existing = value.to_string(),
                _ => {
                    return Err(Error::InvalidStructure(format!(
                        "key `{}` conflicts with an existing object",
                        composite
                    )));
                }
            }
        }
    }

    Ok(())
}

fn empty_slot_for(segment: &Segment, last_segment: bool) -> Slot {
    if !segment.indices.is_empty() {
        Slot::Array(BTreeMap::new())
    } else if last_segment {
        Slot::Text(String::new())
    } else {
        Slot::Object(IndexMap::new())
    }
}

fn next_slot(leaf: bool) -> Slot {
    if leaf {
        Slot::Text(String::new())
    } else {
        Slot::Object(IndexMap::new())
    }
}

//! Statically declared per-substance attribute schema.
//!
//! A substance declares its physical attributes once; the schema
//! resolves them to dense [`AttrId`]s that index the pool's attribute
//! arrays. The set of keys never changes after construction.

use indexmap::IndexMap;

use crate::id::AttrId;

/// Names reserved for the built-in position arrays.
pub const RESERVED_NAMES: [&str; 3] = ["lon", "lat", "z"];

/// Definition of one physical attribute carried by every element.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeDef {
    /// Attribute name, e.g. `"density"`.
    pub name: String,
    /// Optional unit annotation, e.g. `"kg/m3"`.
    pub units: Option<String>,
    /// Value used when a seed request omits the attribute. `None` makes
    /// the attribute mandatory at seeding.
    pub default: Option<f64>,
}

impl AttributeDef {
    /// An attribute with a default value.
    pub fn with_default(name: impl Into<String>, units: &str, default: f64) -> Self {
        Self {
            name: name.into(),
            units: Some(units.to_string()),
            default: Some(default),
        }
    }

    /// An attribute that every seed request must supply.
    pub fn required(name: impl Into<String>, units: &str) -> Self {
        Self {
            name: name.into(),
            units: Some(units.to_string()),
            default: None,
        }
    }
}

/// Ordered, immutable attribute layout for one substance variant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementSchema {
    attributes: IndexMap<String, AttributeDef>,
}

impl ElementSchema {
    /// Build a schema from attribute definitions.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a name is empty, duplicated, reserved for
    /// positions (`lon`, `lat`, `z`), or if a default is non-finite.
    pub fn new(defs: Vec<AttributeDef>) -> Result<Self, String> {
        let mut attributes = IndexMap::with_capacity(defs.len());
        for def in defs {
            if def.name.is_empty() {
                return Err("attribute name must not be empty".to_string());
            }
            if RESERVED_NAMES.contains(&def.name.as_str()) {
                return Err(format!("attribute name '{}' is reserved", def.name));
            }
            if let Some(d) = def.default {
                if !d.is_finite() {
                    return Err(format!(
                        "default for attribute '{}' must be finite, got {d}",
                        def.name
                    ));
                }
            }
            if attributes.contains_key(&def.name) {
                return Err(format!("duplicate attribute '{}'", def.name));
            }
            attributes.insert(def.name.clone(), def);
        }
        Ok(Self { attributes })
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the schema declares no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Resolve an attribute name to its dense ID.
    pub fn id(&self, name: &str) -> Option<AttrId> {
        self.attributes
            .get_index_of(name)
            .map(|i| AttrId(i as u32))
    }

    /// Definition for an attribute ID.
    pub fn def(&self, id: AttrId) -> Option<&AttributeDef> {
        self.attributes.get_index(id.0 as usize).map(|(_, d)| d)
    }

    /// Name for an attribute ID.
    pub fn name(&self, id: AttrId) -> Option<&str> {
        self.attributes
            .get_index(id.0 as usize)
            .map(|(n, _)| n.as_str())
    }

    /// Iterate `(id, definition)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (AttrId, &AttributeDef)> {
        self.attributes
            .values()
            .enumerate()
            .map(|(i, d)| (AttrId(i as u32), d))
    }
}

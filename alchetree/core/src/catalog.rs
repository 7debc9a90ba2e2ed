//! Element Catalog
//!
//! Types for the element catalog served by the recipe-search backend, plus
//! the fixed, closed set of base elements. Base elements have no recipe and
//! always terminate an ingredient tree, regardless of what the backend claims.

use serde::{Deserialize, Serialize};

/// The closed set of base elements
///
/// Membership here is authoritative: a base element is rendered as a leaf
/// even if a data source supplies ingredients for it.
pub const BASE_ELEMENTS: [&str; 4] = ["Water", "Fire", "Earth", "Air"];

/// Check whether an element name is a base element
#[must_use]
pub fn is_base_element(name: &str) -> bool {
    BASE_ELEMENTS.contains(&name)
}

/// One recipe for an element (a set of ingredient names)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecipe {
    /// Ingredient names, in recipe order
    #[serde(default, alias = "Ingredients")]
    pub ingredients: Vec<String>,
}

/// A catalog entry for one element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    /// Element name (string identity)
    #[serde(alias = "Element", alias = "element")]
    pub name: String,

    /// Optional image reference
    #[serde(default, alias = "ImagePath", alias = "imagePath")]
    pub image_path: Option<String>,

    /// Crafting tier, if the backend reports one
    #[serde(default)]
    pub tier: Option<u32>,

    /// Known recipes for this element
    #[serde(default)]
    pub recipes: Vec<ElementRecipe>,
}

impl ElementData {
    /// Create a bare catalog entry with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether this entry names a base element
    #[must_use]
    pub fn is_base(&self) -> bool {
        is_base_element(&self.name)
    }
}

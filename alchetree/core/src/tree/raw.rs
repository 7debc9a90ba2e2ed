//! Raw Backend Result Shapes
//!
//! The recipe-search backend is loose about field spellings: the same payload
//! may carry `element`, `Element`, or `name`, and `ingredients` or
//! `Ingredients`. All of that duck-typing is resolved exactly once, here, via
//! serde aliases. No downstream code ever inspects alternate spellings.
//!
//! A search result arrives in one of three shapes:
//!
//! - `paths`: linear ingredient paths (one flat node list per recipe path)
//! - `trees`: already-nested derivation trees
//! - a bare single tree (the result object itself carries `name`/`element`
//!   and `ingredients`)

use serde::Deserialize;

/// One entry of a linear ingredient path
///
/// `ingredients` here is a list of element *names*, not nested nodes; the
/// normalizer expands them by lookup within the same path.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPathNode {
    /// Element name under any of its observed spellings
    #[serde(default, alias = "Element", alias = "element")]
    pub name: Option<String>,

    /// Optional image reference
    #[serde(default, alias = "ImagePath", alias = "imagePath")]
    pub image_path: Option<String>,

    /// Ingredient names for this element
    #[serde(default, alias = "Ingredients")]
    pub ingredients: Vec<String>,
}

impl RawPathNode {
    /// Build a path node from a name and ingredient names (test/fixture aid)
    pub fn new<S: Into<String>>(name: impl Into<String>, ingredients: Vec<S>) -> Self {
        Self {
            name: Some(name.into()),
            image_path: None,
            ingredients: ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

/// One node of an already-nested raw tree
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawTreeNode {
    /// Element name under any of its observed spellings
    #[serde(default, alias = "Element", alias = "element")]
    pub name: Option<String>,

    /// Optional image reference
    #[serde(default, alias = "ImagePath", alias = "imagePath")]
    pub image_path: Option<String>,

    /// Source-reported base-element flag (advisory; the closed set wins)
    #[serde(default, alias = "isBaseElement")]
    pub is_base_element: bool,

    /// Source-reported circular-reference flag
    #[serde(default, alias = "isCircularReference")]
    pub is_circular_reference: bool,

    /// Source-reported missing-recipe flag
    #[serde(default, alias = "noRecipe", alias = "hasNoRecipe")]
    pub no_recipe: bool,

    /// Nested ingredient subtrees
    #[serde(default, alias = "Ingredients", alias = "children")]
    pub ingredients: Vec<RawTreeNode>,
}

impl RawTreeNode {
    /// Build a named raw tree node (test/fixture aid)
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Attach ingredient subtrees (test/fixture aid)
    #[must_use]
    pub fn with_ingredients(mut self, ingredients: Vec<RawTreeNode>) -> Self {
        self.ingredients = ingredients;
        self
    }
}

/// A complete raw search result
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawSearchResult {
    /// Linear ingredient paths (path-shaped results)
    #[serde(default)]
    pub paths: Option<Vec<Vec<RawPathNode>>>,

    /// Nested trees (tree-shaped results)
    #[serde(default)]
    pub trees: Option<Vec<RawTreeNode>>,

    /// Name of a bare single-tree result
    #[serde(default, alias = "Element", alias = "element")]
    pub name: Option<String>,

    /// Image reference of a bare single-tree result
    #[serde(default, alias = "ImagePath", alias = "imagePath")]
    pub image_path: Option<String>,

    /// Ingredients of a bare single-tree result
    #[serde(default, alias = "Ingredients")]
    pub ingredients: Vec<RawTreeNode>,

    /// Backend-reported search duration in milliseconds
    #[serde(default, alias = "timeElapsed")]
    pub time_elapsed: Option<f64>,

    /// Backend-reported visited-node count
    #[serde(default, alias = "nodesVisited")]
    pub nodes_visited: Option<u64>,
}

impl RawSearchResult {
    /// A result wrapping path-shaped data (test/fixture aid)
    #[must_use]
    pub fn from_paths(paths: Vec<Vec<RawPathNode>>) -> Self {
        Self {
            paths: Some(paths),
            ..Self::default()
        }
    }

    /// A result wrapping tree-shaped data (test/fixture aid)
    #[must_use]
    pub fn from_trees(trees: Vec<RawTreeNode>) -> Self {
        Self {
            trees: Some(trees),
            ..Self::default()
        }
    }

    /// Whether the result carries no usable data in any shape
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.as_ref().is_none_or(Vec::is_empty)
            && self.trees.as_ref().is_none_or(Vec::is_empty)
            && self.name.is_none()
    }
}

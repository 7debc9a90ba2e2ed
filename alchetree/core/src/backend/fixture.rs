//! Fixture Search Backend
//!
//! A self-contained recipe set for headless operation: integration tests and
//! the demo binary run the full pipeline against it without a live service.
//! Results come back path-shaped (one flat node list per derivation), the
//! same wire shape the real backend emits, so the normalizer's path
//! conversion is exercised end to end.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::catalog::{is_base_element, ElementData, ElementRecipe, BASE_ELEMENTS};
use crate::sequence::Algorithm;
use crate::tree::{RawPathNode, RawSearchResult};

use super::traits::SearchBackend;

/// In-memory backend with one recipe per craftable element
#[derive(Clone, Debug)]
pub struct FixtureBackend {
    recipes: HashMap<String, Vec<String>>,
}

impl FixtureBackend {
    /// Backend with the built-in recipe set
    #[must_use]
    pub fn new() -> Self {
        let mut recipes = HashMap::new();
        for (element, ingredients) in [
            ("Mud", vec!["Water", "Earth"]),
            ("Brick", vec!["Mud", "Fire"]),
            ("Steam", vec!["Water", "Fire"]),
            ("Rain", vec!["Water", "Air"]),
            ("Plant", vec!["Earth", "Rain"]),
            ("Lava", vec!["Earth", "Fire"]),
            ("Stone", vec!["Lava", "Air"]),
            ("Metal", vec!["Stone", "Fire"]),
            ("Sand", vec!["Stone", "Air"]),
            ("Glass", vec!["Sand", "Fire"]),
            ("Wall", vec!["Brick", "Brick"]),
            ("House", vec!["Wall", "Glass"]),
        ] {
            recipes.insert(
                element.to_string(),
                ingredients.into_iter().map(String::from).collect(),
            );
        }
        Self { recipes }
    }

    /// Backend with a caller-supplied recipe map
    #[must_use]
    pub fn with_recipes(recipes: HashMap<String, Vec<String>>) -> Self {
        Self { recipes }
    }

    /// Whether the fixture can derive this element
    #[must_use]
    pub fn knows(&self, element: &str) -> bool {
        is_base_element(element) || self.recipes.contains_key(element)
    }

    /// Collect the target and everything reachable from it as one flat path.
    fn derivation_path(&self, target: &str) -> Vec<RawPathNode> {
        let mut path = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        let mut enqueued = std::collections::HashSet::new();
        queue.push_back(target.to_string());
        enqueued.insert(target.to_string());

        while let Some(element) = queue.pop_front() {
            let ingredients = if is_base_element(&element) {
                Vec::new()
            } else {
                self.recipes.get(&element).cloned().unwrap_or_default()
            };
            for ingredient in &ingredients {
                if enqueued.insert(ingredient.clone()) {
                    queue.push_back(ingredient.clone());
                }
            }
            path.push(RawPathNode::new(element, ingredients));
        }
        path
    }
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchBackend for FixtureBackend {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn load_catalog(&self) -> anyhow::Result<Vec<ElementData>> {
        let mut elements: Vec<ElementData> = BASE_ELEMENTS
            .iter()
            .map(|&name| ElementData::named(name))
            .collect();
        let mut craftable: Vec<&String> = self.recipes.keys().collect();
        craftable.sort();
        for name in craftable {
            let mut data = ElementData::named(name.clone());
            data.recipes = vec![ElementRecipe {
                ingredients: self.recipes[name].clone(),
            }];
            elements.push(data);
        }
        Ok(elements)
    }

    async fn run_search(
        &self,
        target: &str,
        algorithm: Algorithm,
        _count: usize,
    ) -> anyhow::Result<RawSearchResult> {
        if !self.knows(target) {
            anyhow::bail!("unknown element: {target}");
        }
        tracing::debug!(target_element = target, %algorithm, "fixture search");
        // One recipe per element, so every algorithm yields the same single
        // derivation path.
        Ok(RawSearchResult::from_paths(vec![
            self.derivation_path(target)
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_brick_path_shape() {
        let backend = FixtureBackend::new();
        let result = backend.run_search("Brick", Algorithm::Bfs, 1).await.unwrap();
        let paths = result.paths.unwrap();
        assert_eq!(paths.len(), 1);

        let names: Vec<&str> = paths[0]
            .iter()
            .map(|n| n.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["Brick", "Mud", "Fire", "Water", "Earth"]);
    }

    #[tokio::test]
    async fn test_unknown_element_errors() {
        let backend = FixtureBackend::new();
        assert!(backend.run_search("Unobtanium", Algorithm::Dfs, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_catalog_contains_bases_and_recipes() {
        let backend = FixtureBackend::new();
        let catalog = backend.load_catalog().await.unwrap();
        assert!(catalog.iter().any(|e| e.name == "Water" && e.recipes.is_empty()));
        let brick = catalog.iter().find(|e| e.name == "Brick").unwrap();
        assert_eq!(brick.recipes[0].ingredients, vec!["Mud", "Fire"]);
    }

    #[tokio::test]
    async fn test_base_element_is_its_own_derivation() {
        let backend = FixtureBackend::new();
        let result = backend.run_search("Water", Algorithm::Bfs, 1).await.unwrap();
        let paths = result.paths.unwrap();
        assert_eq!(paths[0].len(), 1);
        assert!(paths[0][0].ingredients.is_empty());
    }
}

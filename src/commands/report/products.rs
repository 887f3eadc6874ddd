//! Product (component) definitions used to group repositories in reports.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ProductsConfig {
    #[serde(default)]
    pub products: BTreeMap<String, Product>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Product {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub ignore: bool,
    #[serde(default)]
    pub github_project_name: Option<String>,
}

/// Repository name to product name.
pub type RepoProducts = HashMap<String, String>;

/// Load the products file. A missing or unreadable file only disables
/// grouping, so problems are logged and `None` is returned.
pub fn load_products(path: &Path) -> Option<ProductsConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "products config not found, grouping disabled");
            return None;
        }
    };
    match serde_yaml::from_str::<ProductsConfig>(&content) {
        Ok(config) if !config.products.is_empty() => Some(config),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "products config has no products");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid products config");
            None
        }
    }
}

impl ProductsConfig {
    /// Map every repository of a non-ignored product to that product.
    pub fn repo_products(&self) -> RepoProducts {
        self.products
            .iter()
            .filter(|(_, product)| !product.ignore)
            .flat_map(|(name, product)| {
                product
                    .repositories
                    .iter()
                    .map(move |repo| (repo.clone(), name.clone()))
            })
            .collect()
    }
}

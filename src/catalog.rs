use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::generator::{Category, ProblemConfig};

#[derive(Embed)]
#[folder = "assets/"]
struct CatalogAssets;

const BUNDLED_CATALOG: &str = "maps.toml";

/// Problem settings as written in a catalog file. The category stays text
/// until resolved so one bad entry does not sink the whole catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub limit: u32,
    #[serde(default)]
    pub advanced: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub problem: ProblemSpec,
}

impl MapDefinition {
    /// `None` when the category is unknown or the limit is unusable.
    pub fn problem_config(&self) -> Option<ProblemConfig> {
        let Some(category) = Category::from_key(&self.problem.kind) else {
            warn!(map = %self.id, kind = %self.problem.kind, "unknown problem category");
            return None;
        };
        match ProblemConfig::new(category, self.problem.limit, self.problem.advanced) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(map = %self.id, "{e}");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "map")]
    maps: Vec<MapDefinition>,
}

/// Ordered list of maps. Order decides which map a mastery unlocks.
#[derive(Clone, Debug)]
pub struct MapCatalog {
    maps: Vec<MapDefinition>,
}

impl MapCatalog {
    pub fn bundled() -> Result<Self> {
        let file = CatalogAssets::get(BUNDLED_CATALOG)
            .with_context(|| format!("bundled {BUNDLED_CATALOG} missing"))?;
        let content = std::str::from_utf8(file.data.as_ref())?;
        Self::from_toml(content)
    }

    /// The user catalog at `path` if given, otherwise the bundled one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading catalog {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("parsing catalog {}", path.display()))
            }
            None => Self::bundled(),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        if file.maps.is_empty() {
            bail!("catalog has no maps");
        }
        let mut seen = HashSet::new();
        for map in &file.maps {
            if !seen.insert(map.id.as_str()) {
                bail!("duplicate map id in catalog: {}", map.id);
            }
        }
        Ok(Self { maps: file.maps })
    }

    /// Fail if some map can produce an answer longer than the keypad holds.
    pub fn check_answer_digits(&self, max_digits: usize) -> Result<()> {
        for map in &self.maps {
            if let Some(config) = map.problem_config()
                && config.answer_digits() > max_digits
            {
                bail!(
                    "map {} has answers up to {} ({} digits) but answers are capped at {max_digits} digits",
                    map.id,
                    config.largest_answer(),
                    config.answer_digits()
                );
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&MapDefinition> {
        self.maps.iter().find(|m| m.id == id)
    }

    pub fn first(&self) -> &MapDefinition {
        &self.maps[0]
    }

    pub fn next_after(&self, id: &str) -> Option<&MapDefinition> {
        let index = self.maps.iter().position(|m| m.id == id)?;
        self.maps.get(index + 1)
    }

    pub fn order(&self) -> Vec<String> {
        self.maps.iter().map(|m| m.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapDefinition> {
        self.maps.iter()
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_has_seven_maps() {
        let catalog = MapCatalog::bundled().unwrap();
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.first().id, "map1");
        assert_eq!(
            catalog.order(),
            vec!["map1", "map2", "map3", "map4", "map5", "map6", "map7"]
        );
    }

    #[test]
    fn test_bundled_configs_resolve() {
        let catalog = MapCatalog::bundled().unwrap();
        for map in catalog.iter() {
            assert!(map.problem_config().is_some(), "{} has no config", map.id);
        }
        let map5 = catalog.get("map5").unwrap().problem_config().unwrap();
        assert_eq!(map5.category, Category::Addition);
        assert_eq!(map5.limit, 20);
        assert!(map5.advanced);
        let map4 = catalog.get("map4").unwrap().problem_config().unwrap();
        assert_eq!(map4.category, Category::Comparison);
        assert!(!map4.advanced);
    }

    #[test]
    fn test_answer_digit_cap() {
        assert!(MapCatalog::bundled().unwrap().check_answer_digits(2).is_ok());

        let catalog = MapCatalog::from_toml(
            r#"
[[map]]
id = "big"
title = "Big numbers"
problem = { type = "counting", limit = 150 }
"#,
        )
        .unwrap();
        let err = catalog.check_answer_digits(2).unwrap_err().to_string();
        assert!(err.contains("big"));
        assert!(err.contains("150"));
        assert!(catalog.check_answer_digits(3).is_ok());
    }

    #[test]
    fn test_next_after() {
        let catalog = MapCatalog::bundled().unwrap();
        assert_eq!(catalog.next_after("map1").map(|m| m.id.as_str()), Some("map2"));
        assert!(catalog.next_after("map7").is_none());
        assert!(catalog.next_after("nope").is_none());
    }

    #[test]
    fn test_unknown_category_has_no_config() {
        let catalog = MapCatalog::from_toml(
            r#"
[[map]]
id = "odd"
title = "Odd"
problem = { type = "multiplication", limit = 10 }
"#,
        )
        .unwrap();
        assert!(catalog.get("odd").unwrap().problem_config().is_none());
    }

    #[test]
    fn test_unusable_limit_has_no_config() {
        let catalog = MapCatalog::from_toml(
            r#"
[[map]]
id = "tiny"
title = "Tiny"
problem = { type = "subtraction", limit = 1 }
"#,
        )
        .unwrap();
        assert!(catalog.get("tiny").unwrap().problem_config().is_none());
    }

    #[test]
    fn test_rejects_empty_and_duplicate_catalogs() {
        assert!(MapCatalog::from_toml("map = []").is_err());
        let dup = r#"
[[map]]
id = "a"
title = "A"
problem = { type = "counting", limit = 5 }

[[map]]
id = "a"
title = "A again"
problem = { type = "counting", limit = 5 }
"#;
        let err = MapCatalog::from_toml(dup).unwrap_err().to_string();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn test_load_user_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("maps.toml");
        fs::write(
            &path,
            r#"
[[map]]
id = "garden"
title = "Garden"
problem = { type = "addition", limit = 6 }
"#,
        )
        .unwrap();
        let catalog = MapCatalog::load(Some(&path)).unwrap();
        assert_eq!(catalog.order(), vec!["garden"]);
        assert!(MapCatalog::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}

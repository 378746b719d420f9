//! Scenario catalog, fetched once at startup.

use crate::api::BackendClient;
use crate::model::Scenario;
use anyhow::Result;

#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// One-shot fetch. Callers are expected to degrade to an empty catalog on
    /// failure (manual package + free-text goal still work without it).
    pub async fn fetch(client: &BackendClient) -> Result<Self> {
        Ok(Self::new(client.fetch_scenarios().await?))
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScenarioCatalog {
        ScenarioCatalog::new(vec![
            Scenario {
                id: "s1".into(),
                name: "Login flow".into(),
                package: "com.app.login".into(),
                goal: "Log in as test user".into(),
                steps: vec![serde_json::json!("tap login")],
            },
            Scenario {
                id: "s2".into(),
                name: "Checkout".into(),
                package: "com.shop".into(),
                goal: "Buy an item".into(),
                steps: Vec::new(),
            },
        ])
    }

    #[test]
    fn find_by_id_returns_matching_scenario() {
        let catalog = sample();
        assert_eq!(catalog.find_by_id("s2").unwrap().name, "Checkout");
        assert!(catalog.find_by_id("missing").is_none());
    }

    #[test]
    fn empty_catalog_finds_nothing() {
        assert!(ScenarioCatalog::empty().find_by_id("s1").is_none());
        assert!(ScenarioCatalog::empty().is_empty());
    }
}

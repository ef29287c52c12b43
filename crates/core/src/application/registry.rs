// Probe Registry - ordered probe collection grouped by category

use std::sync::Arc;

use crate::domain::Category;
use crate::error::{AppError, Result};
use crate::port::Probe;

/// Probe selection filter
///
/// `select` with a filter that matches nothing returns an empty sequence,
/// not an error; an empty selection executes into an empty Pass report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Category(Category),
    Probe(String),
}

/// Ordered collection of probes, grouped by category
///
/// Categories keep first-registration order; probes keep registration
/// order within their category. The registry is mutated only at startup;
/// during execution it is shared read-only, which is what makes
/// concurrent executor runs against the same registry safe.
#[derive(Default)]
pub struct ProbeRegistry {
    groups: Vec<(Category, Vec<Arc<dyn Probe>>)>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a probe to its category's sequence
    ///
    /// # Errors
    /// `AppError::DuplicateProbe` if a probe with the same name already
    /// exists in that category. The same name in two different categories
    /// is allowed.
    pub fn register(&mut self, probe: Arc<dyn Probe>) -> Result<()> {
        let category = probe.category();

        if let Some((_, probes)) = self.groups.iter_mut().find(|(c, _)| *c == category) {
            if probes.iter().any(|p| p.name() == probe.name()) {
                return Err(AppError::DuplicateProbe {
                    category,
                    name: probe.name().to_string(),
                });
            }
            probes.push(probe);
        } else {
            self.groups.push((category, vec![probe]));
        }
        Ok(())
    }

    /// Return probes matching the filter, in registry order
    pub fn select(&self, selection: &Selection) -> Vec<Arc<dyn Probe>> {
        match selection {
            Selection::All => self
                .groups
                .iter()
                .flat_map(|(_, probes)| probes.iter().cloned())
                .collect(),
            Selection::Category(category) => self
                .groups
                .iter()
                .filter(|(c, _)| c == category)
                .flat_map(|(_, probes)| probes.iter().cloned())
                .collect(),
            Selection::Probe(name) => self
                .groups
                .iter()
                .flat_map(|(_, probes)| probes.iter())
                .filter(|p| p.name() == name)
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, probes)| probes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Categories in first-registration order
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.groups.iter().map(|(c, _)| c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::probe::mocks::MockProbe;

    fn registry_with(probes: Vec<MockProbe>) -> ProbeRegistry {
        let mut registry = ProbeRegistry::new();
        for probe in probes {
            registry.register(Arc::new(probe)).unwrap();
        }
        registry
    }

    #[test]
    fn duplicate_name_in_same_category_fails() {
        let mut registry = ProbeRegistry::new();
        registry
            .register(Arc::new(MockProbe::passing("dns", Category::Network)))
            .unwrap();

        let err = registry
            .register(Arc::new(MockProbe::passing("dns", Category::Network)))
            .unwrap_err();

        assert!(matches!(err, AppError::DuplicateProbe { .. }));
    }

    #[test]
    fn same_name_across_categories_is_allowed() {
        let mut registry = ProbeRegistry::new();
        registry
            .register(Arc::new(MockProbe::passing("mysql", Category::Services)))
            .unwrap();
        registry
            .register(Arc::new(MockProbe::passing("mysql", Category::Database)))
            .unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn select_all_preserves_registration_order() {
        let registry = registry_with(vec![
            MockProbe::passing("internet", Category::Network),
            MockProbe::passing("disk", Category::Filesystem),
            MockProbe::passing("dns", Category::Network),
        ]);

        // Category order = first registration: the Network block first, then Filesystem
        let selected = registry.select(&Selection::All);
        let ordered: Vec<String> = selected.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(ordered, vec!["internet", "dns", "disk"]);
    }

    #[test]
    fn select_by_category() {
        let registry = registry_with(vec![
            MockProbe::passing("internet", Category::Network),
            MockProbe::passing("disk", Category::Filesystem),
        ]);

        let selected = registry.select(&Selection::Category(Category::Network));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "internet");
    }

    #[test]
    fn select_by_name() {
        let registry = registry_with(vec![
            MockProbe::passing("internet", Category::Network),
            MockProbe::passing("disk", Category::Filesystem),
        ]);

        let selected = registry.select(&Selection::Probe("disk".to_string()));
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn select_nothing_is_empty_not_error() {
        let registry = registry_with(vec![MockProbe::passing("internet", Category::Network)]);

        assert!(registry.select(&Selection::Probe("nope".to_string())).is_empty());
        assert!(registry
            .select(&Selection::Category(Category::Database))
            .is_empty());
    }
}

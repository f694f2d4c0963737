//! Immutable source catalogue with derived indices.
//!
//! Built once by the loader and read-only afterwards: every index is
//! computed before construction returns, so readers never observe a
//! partially-populated catalogue. Construction itself accepts whatever it
//! is given; the loader rejects duplicate names before building, and the
//! structural validation rules re-check them for catalogues assembled in
//! code.

use crate::catalogue::identity::Scope;
use crate::catalogue::model::DataProducer;
use std::collections::{BTreeMap, BTreeSet};

/// All loaded data producers, grouped by scope.
#[derive(Debug, Default)]
pub struct Catalogue {
    by_scope: BTreeMap<Scope, Vec<DataProducer>>,
    topic_names: BTreeSet<String>,
}

impl Catalogue {
    /// Build the catalogue and its derived indices.
    pub fn new(producers: Vec<DataProducer>) -> Self {
        let mut by_scope: BTreeMap<Scope, Vec<DataProducer>> = BTreeMap::new();
        let mut topic_names = BTreeSet::new();

        for producer in producers {
            topic_names.extend(producer.topic_names());
            by_scope.entry(producer.scope()).or_default().push(producer);
        }

        Self {
            by_scope,
            topic_names,
        }
    }

    /// Producers declared in `scope`, in definition-file order.
    pub fn list_sources(&self, scope: Scope) -> Vec<&DataProducer> {
        self.by_scope
            .get(&scope)
            .map(|sources| sources.iter().collect())
            .unwrap_or_default()
    }

    /// Look up one producer by scope and name.
    pub fn get(&self, scope: Scope, name: &str) -> Option<&DataProducer> {
        self.by_scope
            .get(&scope)?
            .iter()
            .find(|producer| producer.name() == name)
    }

    /// All producers, in scope order.
    pub fn sources(&self) -> impl Iterator<Item = &DataProducer> {
        self.by_scope.values().flatten()
    }

    /// Every topic name any producer implies, including aggregated outputs
    /// and state-store topics. Deduplicated and sorted.
    pub fn all_topic_names(&self) -> &BTreeSet<String> {
        &self.topic_names
    }

    /// Raw input topics declared by producers, before derivation.
    pub fn raw_topics(&self) -> BTreeSet<String> {
        self.sources()
            .flat_map(DataProducer::raw_topic_names)
            .collect()
    }

    /// Topics a downstream result cache subscribes to: aggregated topics
    /// contribute only their outputs, non-aggregated ones their raw topic.
    pub fn result_cache_topics(&self) -> BTreeSet<String> {
        self.sources()
            .flat_map(DataProducer::result_cache_names)
            .collect()
    }

    /// Producers whose derived topic set contains `topic`.
    pub fn sources_producing(&self, topic: &str) -> Vec<&DataProducer> {
        self.sources()
            .filter(|producer| producer.topic_names().iter().any(|name| name == topic))
            .collect()
    }
}

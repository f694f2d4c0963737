//! Source catalogue for a distributed sensing platform.
//!
//! The crate loads a directory tree of declarative source definitions into
//! an immutable [`Catalogue`], derives the concrete Kafka topic set every
//! source implies (raw topics, windowed aggregate outputs, state-store
//! changelogs), and validates naming and schema placement against the
//! platform conventions. Loading is strict and fatal on a broken
//! definition; validation collects every finding into a list so one run
//! reports every defect.
//!
//! Layout expected under a catalog root:
//!
//! ```text
//! <root>/specifications/<scope>/*.yml   source definitions
//! <root>/commons/<scope>/**/*.avsc      schema files
//! ```

pub mod catalogue;
pub mod config;
pub mod error;
pub mod registration;
pub mod schema;
#[cfg(feature = "service")]
pub mod service;
pub mod validation;

pub use catalogue::{
    ALL_SCOPES, Catalogue, DataProducer, DataTopic, SPECIFICATIONS_PATH, Scope, StreamDataTopic,
    TimeWindow, Topic, load_catalogue, out_topic, state_store_name, time_interval,
    timed_topic_names,
};
pub use config::CatalogConfig;
pub use error::{LoadError, RegistrationError};
pub use schema::{COMMONS_PATH, SchemaCatalogue, SchemaMetadata};
pub use validation::{ValidationException, format_violations};

use std::path::Path;

/// Load a catalog root and run every validation rule against it.
///
/// Structural rules always run; schema placement rules run when `full` is
/// set and a `commons` directory exists. Returns the collected findings;
/// an empty list means the catalog is fully valid.
pub fn validate_catalog_root(
    root: &Path,
    config: &CatalogConfig,
    full: bool,
    scope: Option<Scope>,
) -> Result<Vec<ValidationException>, LoadError> {
    let catalogue = load_catalogue(root, config)?;
    let mut violations = validation::catalogue::validate(&catalogue);

    if full {
        let commons = root.join(COMMONS_PATH);
        if commons.is_dir() {
            let schemas = SchemaCatalogue::load(&commons)?;
            let rules = validation::schema::SchemaPlacementRules::new(
                commons,
                config.project_group.clone(),
            );
            violations.extend(rules.validate_catalogue(&schemas, scope));
        }
    }

    Ok(violations)
}

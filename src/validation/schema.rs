//! Placement rules for schema files: namespace and record name must both
//! follow from where the file lives.
//!
//! The expected namespace is derived from the file's path relative to the
//! scope directory; the expected record name from its snake_case file
//! name. The two aspects are checked independently, so one file can yield
//! zero, one, or two violations. A rule never propagates an internal
//! failure: a path outside the schema root is itself reported as a
//! violation.

use crate::catalogue::identity::Scope;
use crate::schema::{SchemaCatalogue, SchemaMetadata, record_name};
use crate::validation::{Rule, ValidationException, run_rules};
use std::path::PathBuf;

/// Placement rules bound to a schema root and project group.
pub struct SchemaPlacementRules {
    commons_root: PathBuf,
    project_group: String,
}

impl SchemaPlacementRules {
    pub fn new(commons_root: impl Into<PathBuf>, project_group: impl Into<String>) -> Self {
        Self {
            commons_root: commons_root.into(),
            project_group: project_group.into(),
        }
    }

    /// Both placement rules, in reporting order.
    pub fn rules<'a>(&'a self) -> Vec<Rule<'a, SchemaMetadata>> {
        vec![
            Box::new(|metadata| self.namespace_rule(metadata)),
            Box::new(|metadata| self.record_name_rule(metadata)),
        ]
    }

    /// Run the placement rules against one schema.
    pub fn validate(&self, metadata: &SchemaMetadata) -> Vec<ValidationException> {
        run_rules(&self.rules(), std::slice::from_ref(metadata))
    }

    /// Run the placement rules against a whole schema catalogue, reporting
    /// unparseable files as violations too. A scope filter restricts which
    /// schemas are checked; unparseable files are always reported.
    pub fn validate_catalogue(
        &self,
        schemas: &SchemaCatalogue,
        scope: Option<Scope>,
    ) -> Vec<ValidationException> {
        let mut violations: Vec<ValidationException> = schemas
            .unmapped()
            .iter()
            .map(|unmapped| {
                ValidationException::new(
                    unmapped.path.display().to_string(),
                    format!("cannot parse schema: {}", unmapped.reason),
                )
            })
            .collect();
        let targets: Vec<SchemaMetadata> = schemas
            .schemas()
            .filter(|metadata| scope.is_none_or(|scope| metadata.scope == scope))
            .cloned()
            .collect();
        violations.extend(run_rules(&self.rules(), &targets));
        violations
    }

    /// Namespace expected for a schema at `path` in `scope`.
    ///
    /// The project group, the scope segment, and every directory between
    /// the scope directory and the file, joined with dots.
    fn expected_namespace(&self, metadata: &SchemaMetadata) -> Result<String, String> {
        let scope_dir = self.commons_root.join(metadata.scope.as_str());
        let relative = metadata.path.strip_prefix(&scope_dir).map_err(|_| {
            format!(
                "path {} is not part of schema root {}",
                metadata.path.display(),
                scope_dir.display()
            )
        })?;

        let mut namespace = format!("{}.{}", self.project_group, metadata.scope);
        for component in relative.iter().take(relative.iter().count().saturating_sub(1)) {
            namespace.push('.');
            namespace.push_str(&component.to_string_lossy());
        }
        Ok(namespace)
    }

    fn namespace_rule(&self, metadata: &SchemaMetadata) -> Vec<ValidationException> {
        let target = metadata.path.display().to_string();
        let expected = match self.expected_namespace(metadata) {
            Ok(expected) => expected,
            Err(message) => return vec![ValidationException::new(target, message)],
        };

        if !metadata.namespace.eq_ignore_ascii_case(&expected) {
            return vec![ValidationException::new(
                target,
                format!(
                    "namespace must be lowercase, dot-separated, and match the \
                     schema location; expected \"{expected}\", found \"{}\"",
                    metadata.namespace
                ),
            )];
        }

        if let Some(last) = metadata.namespace.rsplit('.').next() {
            if is_plural(last) {
                return vec![ValidationException::new(
                    target,
                    format!("namespace segment '{last}' must not be plural"),
                )];
            }
        }
        Vec::new()
    }

    fn record_name_rule(&self, metadata: &SchemaMetadata) -> Vec<ValidationException> {
        let expected = record_name(&metadata.path);
        if metadata.name.eq_ignore_ascii_case(&expected) {
            Vec::new()
        } else {
            vec![ValidationException::new(
                metadata.path.display().to_string(),
                format!(
                    "record name must match the file name; expected \"{expected}\", \
                     found \"{}\"",
                    metadata.name
                ),
            )]
        }
    }
}

/// Heuristic plural check for namespace segments.
fn is_plural(segment: &str) -> bool {
    segment.ends_with('s') && !segment.ends_with("ss")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::identity::Scope;
    use crate::validation::format_violations;
    use std::path::PathBuf;

    fn rules() -> SchemaPlacementRules {
        SchemaPlacementRules::new("/catalog/commons", "org.example")
    }

    fn metadata(namespace: &str, name: &str, scope: Scope, path: &str) -> SchemaMetadata {
        SchemaMetadata {
            namespace: namespace.to_string(),
            name: name.to_string(),
            scope,
            path: PathBuf::from(path),
        }
    }

    #[test]
    fn correct_placement_yields_no_violations() {
        let violations = rules().validate(&metadata(
            "org.example.passive.empatica",
            "EmpaticaE4Acceleration",
            Scope::Passive,
            "/catalog/commons/passive/empatica/empatica_e4_acceleration.avsc",
        ));
        assert_eq!(format_violations(&violations), "");
    }

    #[test]
    fn plural_scope_segment_yields_one_violation() {
        let violations = rules().validate(&metadata(
            "org.example.monitors.test",
            "RecordName",
            Scope::Monitor,
            "/catalog/commons/monitor/test/record_name.avsc",
        ));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("org.example.monitor.test"));
    }

    #[test]
    fn plural_last_segment_yields_one_violation() {
        let violations = rules().validate(&metadata(
            "org.example.monitor.tests",
            "RecordName",
            Scope::Monitor,
            "/catalog/commons/monitor/test/record_name.avsc",
        ));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn plural_directory_is_caught_by_the_plural_check() {
        // The namespace matches its (misnamed) directory, so only the
        // plural rule fires.
        let violations = rules().validate(&metadata(
            "org.example.monitor.connections",
            "RecordName",
            Scope::Monitor,
            "/catalog/commons/monitor/connections/record_name.avsc",
        ));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("must not be plural"));
    }

    #[test]
    fn misspelled_record_outside_root_yields_two_violations() {
        let violations = rules().validate(&metadata(
            "org.example.passive.empatica",
            "EmpaticaE4Aceleration",
            Scope::Passive,
            "/path/to/empatica_e4_acceleration.avsc",
        ));
        assert_eq!(violations.len(), 2);

        let corrected = rules().validate(&metadata(
            "org.example.passive.empatica",
            "EmpaticaE4Acceleration",
            Scope::Passive,
            "/catalog/commons/passive/empatica/empatica_e4_acceleration.avsc",
        ));
        assert_eq!(format_violations(&corrected), "");
    }

    #[test]
    fn record_name_comparison_ignores_case_only() {
        let violations = rules().validate(&metadata(
            "org.example.active.questionnaire",
            "QUESTIONNAIRE",
            Scope::Active,
            "/catalog/commons/active/questionnaire/questionnaire.avsc",
        ));
        assert_eq!(violations.len(), 0);
    }
}

//! Rule engine that collects every violation instead of failing fast.
//!
//! A rule is a plain function from a target to the violations it finds.
//! The engine composes rules by concatenation, so one failing rule never
//! suppresses another and a single run reports every defect. Violations
//! are data values; nothing in this module panics or returns `Err` for a
//! finding.

pub mod catalogue;
pub mod schema;

use std::fmt;

/// One reported rule violation: who is at fault, and why.
///
/// Never an error in the control-flow sense; rules return these and
/// callers collect them.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct ValidationException {
    /// Identity of the offending target: a file path or a source name.
    pub target: String,
    pub message: String,
}

impl ValidationException {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.message)
    }
}

/// A validation rule over targets of type `T`.
pub type Rule<'a, T> = Box<dyn Fn(&T) -> Vec<ValidationException> + 'a>;

/// Run every rule against every target.
///
/// Violations are concatenated in rule-then-target order; the order is
/// part of the contract so callers can snapshot the output.
pub fn run_rules<'a, T>(rules: &[Rule<'a, T>], targets: &[T]) -> Vec<ValidationException> {
    rules
        .iter()
        .flat_map(|rule| targets.iter().flat_map(move |target| rule(target)))
        .collect()
}

/// Render violations to text, one line per violation.
///
/// An empty collection renders to the empty string, which doubles as the
/// "fully valid" sentinel.
pub fn format_violations(violations: &[ValidationException]) -> String {
    violations
        .iter()
        .map(|violation| format!("{violation}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_rules_concatenates_in_rule_then_target_order() {
        let rules: Vec<Rule<&str>> = vec![
            Box::new(|target: &&str| vec![ValidationException::new(*target, "first")]),
            Box::new(|target: &&str| {
                if *target == "b" {
                    vec![ValidationException::new(*target, "second")]
                } else {
                    Vec::new()
                }
            }),
        ];

        let violations = run_rules(&rules, &["a", "b"]);
        let rendered = format_violations(&violations);
        assert_eq!(rendered, "a: first\nb: first\nb: second\n");
    }

    #[test]
    fn empty_violations_render_to_empty_string() {
        assert_eq!(format_violations(&[]), "");
    }
}

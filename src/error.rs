//! Typed failures for catalogue loading and schema registration.
//!
//! Load failures are fatal and abort the whole load: they mean the catalog
//! definition itself is broken, not that a rule was violated. Rule
//! violations are [`crate::validation::ValidationException`] values and
//! never appear here.

use crate::catalogue::identity::Scope;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal failure while loading a catalogue from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse definition {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("mandatory scope directory '{0}' is missing")]
    MissingScope(Scope),

    #[error("duplicate source '{name}' in scope '{scope}'")]
    DuplicateSource { scope: Scope, name: String },

    #[error("unknown source kind '{kind}' in {path}")]
    UnknownKind { path: PathBuf, kind: String },

    #[error("{path}: 'input_topic' and 'input_topics' are mutually exclusive")]
    ConflictingInputs { path: PathBuf },

    #[error("{path}: stream topic declares no input topic")]
    MissingInput { path: PathBuf },
}

/// Failure while mirroring schemas into a registry backup tree.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema root {0} is not a directory")]
    MissingRoot(PathBuf),
}

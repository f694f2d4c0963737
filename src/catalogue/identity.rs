use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Category of data source, mapped to a conventional directory name.
///
/// The set is fixed: definitions live under `<root>/<scope>` and schema
/// files under `commons/<scope>`, both using the lowercase name. Scope also
/// supplies the namespace segment that placement rules check against.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Scope {
    Active,
    Kafka,
    Catalogue,
    Monitor,
    Passive,
    Stream,
    Connector,
    Push,
}

/// All scopes, in the order they are conventionally listed.
pub const ALL_SCOPES: [Scope; 8] = [
    Scope::Active,
    Scope::Kafka,
    Scope::Catalogue,
    Scope::Monitor,
    Scope::Passive,
    Scope::Stream,
    Scope::Connector,
    Scope::Push,
];

impl Scope {
    /// Canonical lowercase name, used both as directory and namespace segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Active => "active",
            Scope::Kafka => "kafka",
            Scope::Catalogue => "catalogue",
            Scope::Monitor => "monitor",
            Scope::Passive => "passive",
            Scope::Stream => "stream",
            Scope::Connector => "connector",
            Scope::Push => "push",
        }
    }

    /// Resolve the scope directory under `root`.
    ///
    /// Returns `None` when the directory does not exist; an absent scope is
    /// not an error unless a deployment marks it mandatory.
    pub fn resolve(&self, root: &Path) -> Option<PathBuf> {
        let path = root.join(self.as_str());
        if path.is_dir() { Some(path) } else { None }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Ok(Scope::Active),
            "kafka" => Ok(Scope::Kafka),
            "catalogue" => Ok(Scope::Catalogue),
            "monitor" => Ok(Scope::Monitor),
            "passive" => Ok(Scope::Passive),
            "stream" => Ok(Scope::Stream),
            "connector" => Ok(Scope::Connector),
            "push" => Ok(Scope::Push),
            other => Err(format!("unknown scope '{other}'")),
        }
    }
}

impl Serialize for Scope {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scope_round_trips_through_serde() {
        let json = serde_json::to_string(&Scope::Passive).unwrap();
        assert_eq!(json, "\"passive\"");
        let back: Scope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Scope::Passive);

        let err = serde_json::from_str::<Scope>("\"sideways\"").unwrap_err();
        assert!(err.to_string().contains("unknown scope"));
    }

    #[test]
    fn resolve_returns_none_for_absent_directory() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::create_dir(temp.path().join("passive")).unwrap();

        assert_eq!(
            Scope::Passive.resolve(temp.path()),
            Some(temp.path().join("passive"))
        );
        assert_eq!(Scope::Monitor.resolve(temp.path()), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("STREAM".parse::<Scope>().unwrap(), Scope::Stream);
        assert!("".parse::<Scope>().is_err());
    }
}

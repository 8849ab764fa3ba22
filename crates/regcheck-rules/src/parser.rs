//! Shared YAML/JSON loading.
//!
//! Rulebooks, regulation documents and engine configuration all go
//! through these helpers so that a missing file or a syntax error is
//! reported the same way, with the offending path attached.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{ConfigResult, ConfigurationError};

/// Read a file to a string, mapping `NotFound` to [`ConfigurationError::FileNotFound`].
pub fn read_file(path: &Path) -> ConfigResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigurationError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigurationError::Io(e)
        }
    })
}

/// Load a YAML file into a strongly-typed struct.
pub fn load_yaml_typed<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = read_file(path)?;
    serde_yaml::from_str(&content).map_err(|e| ConfigurationError::YamlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a JSON file into a strongly-typed struct.
pub fn load_json_typed<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = read_file(path)?;
    serde_json::from_str(&content).map_err(|e| ConfigurationError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load a YAML or JSON file, choosing the parser from the extension.
pub fn load_typed<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    match extension(path).as_deref() {
        Some("yaml") | Some("yml") => load_yaml_typed(path),
        Some("json") => load_json_typed(path),
        _ => Err(ConfigurationError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Lower-cased file extension, if any.
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_is_file_not_found() {
        let err = load_yaml_typed::<BTreeMap<String, String>>(Path::new("/nonexistent/rules.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::FileNotFound { .. }));
    }

    #[test]
    fn yaml_syntax_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "name: [unclosed").unwrap();
        match load_yaml_typed::<BTreeMap<String, String>>(&path) {
            Err(ConfigurationError::YamlParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected YamlParse, got {other:?}"),
        }
    }

    #[test]
    fn json_syntax_error_carries_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"name\": ").unwrap();
        assert!(matches!(
            load_json_typed::<BTreeMap<String, String>>(&path),
            Err(ConfigurationError::JsonParse { .. })
        ));
    }

    #[test]
    fn dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("a.YML");
        std::fs::write(&yaml, "k: v\n").unwrap();
        let json = dir.path().join("b.json");
        std::fs::write(&json, "{\"k\": \"v\"}").unwrap();
        let txt = dir.path().join("c.txt");
        std::fs::write(&txt, "k: v").unwrap();

        let a: BTreeMap<String, String> = load_typed(&yaml).unwrap();
        let b: BTreeMap<String, String> = load_typed(&json).unwrap();
        assert_eq!(a, b);
        assert!(matches!(
            load_typed::<BTreeMap<String, String>>(&txt),
            Err(ConfigurationError::UnsupportedFormat { .. })
        ));
    }
}

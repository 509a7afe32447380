//! Schema document discovery and parsing.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::diagnostic::GeneratorError;

use super::ast::RawDocument;

/// A parsed document together with the path it came from, so duplicate
/// entity errors can point at both declaration sites.
#[derive(Debug)]
pub struct ParsedDocument {
    pub path: PathBuf,
    pub document: RawDocument,
}

/// Walks `dir` and parses every `.json` schema document, in path order.
///
/// Path order (not directory-entry order) keeps merged output stable across
/// file systems.
pub fn parse_directory(dir: &Path) -> Result<Vec<ParsedDocument>, GeneratorError> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(GeneratorError::NoSchemaDocuments {
            dir: dir.to_path_buf(),
        });
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| GeneratorError::io(&path, e.to_string()))?;
        let document: RawDocument =
            serde_json::from_str(&content).map_err(|e| GeneratorError::ParseFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        documents.push(ParsedDocument { path, document });
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn empty_directory_is_a_missing_upstream_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_directory(dir.path()).unwrap_err();
        assert!(matches!(err, GeneratorError::NoSchemaDocuments { .. }));
    }

    #[test]
    fn parses_documents_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.json", r#"{ "models": [{ "name": "B", "fields": [] }] }"#);
        write(dir.path(), "a.json", r#"{ "models": [{ "name": "A", "fields": [] }] }"#);

        let docs = parse_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].document.models[0].name, "A");
        assert_eq!(docs[1].document.models[0].name, "B");
    }

    #[test]
    fn malformed_json_fails_with_the_offending_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "schema.json", "{ not json");

        let err = parse_directory(dir.path()).unwrap_err();
        match err {
            GeneratorError::ParseFailed { path, .. } => {
                assert!(path.ends_with("schema.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_json_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.md", "# not a schema");
        write(dir.path(), "schema.json", r#"{ "models": [] }"#);

        let docs = parse_directory(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
    }
}

//! Loading of the persisted inputs: customer CSV, chat documents, and the
//! model artifact.
//!
//! Parsing lives in `churnwise-core`; this module only does the file I/O and
//! attaches path context to failures.

use anyhow::{Context, Result};
use std::path::Path;

use churnwise_core::classifier::ModelArtifact;
use churnwise_core::models::{Document, DocumentRecord};
use churnwise_core::table::Table;

/// Read a CSV file with a header row into a [`Table`].
///
/// With `drop_incomplete` set, rows holding any missing cell are removed.
pub fn load_table(path: &Path, drop_incomplete: bool) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Malformed row {} in {}", i + 1, path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let mut table = Table::new(headers, rows)?;
    if drop_incomplete {
        let dropped = table.drop_incomplete();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                path = %path.display(),
                "Missing values found in dataset; dropped incomplete rows"
            );
        }
    }
    Ok(table)
}

/// Read the chat corpus: a JSON list of document records.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents: {}", path.display()))?;
    let records: Vec<DocumentRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse documents: {}", path.display()))?;
    Ok(records.into_iter().map(DocumentRecord::into_document).collect())
}

/// Read and validate a model artifact.
pub fn load_model(path: &Path) -> Result<ModelArtifact> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model: {}", path.display()))?;
    let model = ModelArtifact::from_json(&content)
        .with_context(|| format!("Failed to load model: {}", path.display()))?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_table_keeps_file_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("customers.csv");
        fs::write(
            &path,
            "customerID,Churn,tenure,MonthlyCharges\nA,Yes,5,70\nB,No,10,50\nA,No,1,20\n",
        )
        .unwrap();

        let table = load_table(&path, true).unwrap();
        assert_eq!(table.len(), 3);
        let ids: Vec<&str> = table.column(0).collect();
        assert_eq!(ids, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_load_table_drops_incomplete_rows() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("customers.csv");
        fs::write(&path, "customerID,tenure\nA,5\nB,\nC,7\n").unwrap();

        assert_eq!(load_table(&path, true).unwrap().len(), 2);
        assert_eq!(load_table(&path, false).unwrap().len(), 3);
    }

    #[test]
    fn test_load_table_missing_file() {
        let err = load_table(Path::new("/nonexistent/customers.csv"), true).unwrap_err();
        assert!(err.to_string().contains("Failed to open dataset"));
    }

    #[test]
    fn test_load_documents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs.json");
        fs::write(
            &path,
            r#"[{"id": "1", "content": "churn risk high"}, {"content": "billing question", "meta": {"k": "v"}}]"#,
        )
        .unwrap();

        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "1");
        assert_eq!(docs[1].id.len(), 64);
        assert_eq!(docs[1].metadata["k"], "v");
    }

    #[test]
    fn test_load_model_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("model.json");
        fs::write(&path, r#"{"kind": "logistic", "feature_names": []}"#).unwrap();

        let err = load_model(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load model"));
    }
}

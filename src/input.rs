//! NDJSON source records for the command-line exporter.

use std::io::BufRead;

use crate::errors::{ExportError, Result};

/// Convert a JSON object into a `bson::Document`.
///
/// # Errors
/// Returns `Input` if the value is not an object or cannot be represented as BSON.
pub fn json_value_to_bson_document(val: serde_json::Value) -> Result<bson::Document> {
    let serde_json::Value::Object(obj) = val else {
        return Err(ExportError::Input("expected JSON object".to_string()));
    };
    bson::Document::try_from(obj).map_err(|e| ExportError::Input(e.to_string()))
}

/// Read one JSON object per line; blank lines are skipped.
///
/// # Errors
/// Returns `Input` naming the 1-based line that failed to parse, or `Io`.
pub fn read_ndjson<R: BufRead>(reader: R) -> Result<Vec<bson::Document>> {
    let mut docs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let val: serde_json::Value = serde_json::from_str(&line)
            .map_err(|e| ExportError::Input(format!("line {}: {e}", idx + 1)))?;
        let doc = json_value_to_bson_document(val).map_err(|e| match e {
            ExportError::Input(m) => ExportError::Input(format!("line {}: {m}", idx + 1)),
            other => other,
        })?;
        docs.push(doc);
    }
    log::debug!("input: read {} records", docs.len());
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_objects_and_skips_blank_lines() {
        let src = "{\"a\":1,\"b\":\"x\"}\n\n{\"a\":2}\n";
        let docs = read_ndjson(src.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get_str("b").unwrap(), "x");
    }

    #[test]
    fn rejects_non_objects_with_line_number() {
        let err = read_ndjson("{\"a\":1}\n[1,2,3]\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }
}

use std::io::{BufWriter, Write};

use crate::errors::{ExportError, Result};
use crate::value::Value;

use super::options::CsvOptions;

/// Row-at-a-time consumer of a dataset.
pub trait RowSink {
    fn write_headers(&mut self, headers: &[String]) -> Result<()>;
    fn write_row(&mut self, row: &[Value]) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

pub struct CsvSink<W: Write> {
    w: csv::Writer<BufWriter<W>>,
    write_headers: bool,
}
impl<W: Write> CsvSink<W> {
    pub fn new(inner: W, opts: &CsvOptions) -> Self {
        let w = csv::WriterBuilder::new().delimiter(opts.delimiter).from_writer(BufWriter::new(inner));
        Self { w, write_headers: opts.write_headers }
    }

    /// Flush and hand back the underlying writer.
    ///
    /// # Errors
    /// Returns `Io` if buffered output cannot be flushed.
    pub fn into_inner(self) -> Result<W> {
        let buffered = self.w.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
        buffered.into_inner().map_err(|e| ExportError::Io(e.into_error()))
    }
}
impl<W: Write> RowSink for CsvSink<W> {
    fn write_headers(&mut self, headers: &[String]) -> Result<()> {
        if self.write_headers {
            self.w.write_record(headers)?;
        }
        Ok(())
    }
    fn write_row(&mut self, row: &[Value]) -> Result<()> {
        let cells = row.iter().map(render_cell).collect::<Result<Vec<String>>>()?;
        self.w.write_record(&cells)?;
        Ok(())
    }
    fn finish(&mut self) -> Result<()> {
        self.w.flush()?;
        Ok(())
    }
}

/// Text for one CSV field.
///
/// Normalized values are already text or plain scalars; the temporal arms only
/// fire for rows that skipped normalization.
///
/// # Errors
/// Returns `Serialization` for bytes that are not UTF-8.
pub fn render_cell(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::DateTime(dt) => dt.to_rfc3339(),
        Value::NaiveDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::List(items) => {
            let parts = items.iter().map(render_cell).collect::<Result<Vec<String>>>()?;
            format!("[{}]", parts.join(", "))
        }
        Value::Bytes(b) => String::from_utf8(b.clone())
            .map_err(|e| ExportError::serialization(format!("cell is not valid UTF-8: {e}")))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_plainly() {
        assert_eq!(render_cell(&Value::Null).unwrap(), "");
        assert_eq!(render_cell(&Value::Int(-3)).unwrap(), "-3");
        assert_eq!(render_cell(&Value::Float(2.5)).unwrap(), "2.5");
        assert_eq!(render_cell(&Value::from("x")).unwrap(), "x");
    }

    #[test]
    fn lists_render_bracketed() {
        let v = Value::List(vec![Value::Int(1), Value::from("b"), Value::Null]);
        assert_eq!(render_cell(&v).unwrap(), "[1, b, ]");
    }

    #[test]
    fn non_utf8_bytes_fail() {
        let err = render_cell(&Value::Bytes(vec![0xff, 0xfe])).unwrap_err();
        assert!(matches!(err, ExportError::Serialization { .. }));
        assert_eq!(render_cell(&Value::Bytes(b"ok".to_vec())).unwrap(), "ok");
    }
}

mod options;
mod pipeline;
mod sinks;

pub use options::{CsvOptions, ExportReport};
pub use pipeline::{export_file, export_rows, stream_into, to_csv_string, write_dataset};
pub use sinks::{CsvSink, RowSink, render_cell};

#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub write_headers: bool,
}
impl Default for CsvOptions {
    fn default() -> Self { Self { delimiter: b',', write_headers: true } }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    /// Data rows written, not counting the header line.
    pub written: u64,
}

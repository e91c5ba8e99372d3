use bson::doc;
use csvview::export::{CsvOptions, export_file, export_rows, to_csv_string, write_dataset};
use csvview::{ColumnMapping, ExportError, FormatOptions, Value, build};
use std::fs;
use tempfile::tempdir;

fn contacts() -> Vec<bson::Document> {
    vec![
        doc! {"name": "alice", "note": "likes \"quotes\", commas", "active": true},
        doc! {"name": "bob", "note": "two\nlines", "active": false},
    ]
}

fn mapping() -> ColumnMapping {
    ColumnMapping::from_paths([("Name", "name"), ("Note", "note"), ("Active", "active")]).unwrap()
}

#[test]
fn test_csv_quoting_follows_rfc4180() {
    let ds = build(&mapping(), &contacts(), &FormatOptions::default()).unwrap();
    let s = to_csv_string(&ds, &CsvOptions::default()).unwrap();
    assert_eq!(
        s,
        "Name,Note,Active\nalice,\"likes \"\"quotes\"\", commas\",Yes\nbob,\"two\nlines\",No\n"
    );
}

#[test]
fn test_custom_delimiter_without_headers() {
    let ds = build(&mapping(), &contacts(), &FormatOptions { allow_newlines: false, ..Default::default() })
        .unwrap();
    let opts = CsvOptions { delimiter: b';', write_headers: false };
    let mut out = Vec::new();
    let rep = write_dataset(&mut out, &ds, &opts).unwrap();
    assert_eq!(rep.written, 2);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "alice;\"likes \"\"quotes\"\", commas\";Yes\nbob;two, lines;No\n"
    );
}

#[test]
fn test_streaming_export_matches_built_dataset() {
    let opts = FormatOptions::default();
    let ds = build(&mapping(), &contacts(), &opts).unwrap();
    let mut streamed = Vec::new();
    let rep = export_rows(&mut streamed, &mapping(), &contacts(), &opts, &CsvOptions::default()).unwrap();
    assert_eq!(rep.written, 2);
    assert_eq!(String::from_utf8(streamed).unwrap(), ds.to_csv().unwrap());
}

#[test]
fn test_export_csv_file() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("nested").join("contacts.csv");
    let rep = export_file(&out, &mapping(), &contacts(), &FormatOptions::default(), &CsvOptions::default())
        .unwrap();
    assert_eq!(rep.written, 2);
    let s = fs::read_to_string(out).unwrap();
    assert!(s.starts_with("Name,Note,Active\n"));
    assert!(s.contains("alice"));
}

#[test]
fn test_failed_export_leaves_existing_file_untouched() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("contacts.csv");
    fs::write(&out, "previous\n").unwrap();
    let mut docs = contacts();
    docs.push(doc! {"name": "carol"});
    let err = export_file(&out, &mapping(), &docs, &FormatOptions::default(), &CsvOptions::default())
        .unwrap_err();
    assert!(matches!(err, ExportError::MissingAttribute { .. }));
    assert_eq!(fs::read_to_string(&out).unwrap(), "previous\n");
    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn test_failed_persist_keeps_destination() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("contacts.csv");
    fs::create_dir(&out).unwrap();
    fs::write(out.join("keep.txt"), "keep").unwrap();
    let err = export_file(&out, &mapping(), &contacts(), &FormatOptions::default(), &CsvOptions::default())
        .unwrap_err();
    assert!(matches!(err, ExportError::Io(_)));
    assert_eq!(fs::read_to_string(out.join("keep.txt")).unwrap(), "keep");
    let leftovers = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[test]
fn test_export_overwrites_previous_output() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("contacts.csv");
    let opts = FormatOptions::default();
    export_file(&out, &mapping(), &contacts()[..1], &opts, &CsvOptions::default()).unwrap();
    let rep = export_file(&out, &mapping(), &contacts(), &opts, &CsvOptions::default()).unwrap();
    assert_eq!(rep.written, 2);
    let s = fs::read_to_string(&out).unwrap();
    assert!(s.contains("alice") && s.contains("bob"));
}

#[test]
fn test_unrenderable_cell_is_a_serialization_error() {
    let m = ColumnMapping::new()
        .computed("Blob", |_obj, _label| Ok(Value::Bytes(vec![0xff])))
        .unwrap();
    let ds = build(&m, &contacts(), &FormatOptions::default()).unwrap();
    let err = to_csv_string(&ds, &CsvOptions::default()).unwrap_err();
    assert!(matches!(err, ExportError::Serialization { .. }));
}

#[test]
fn test_empty_collection_writes_header_only() {
    let ds = build(&mapping(), Vec::<bson::Document>::new(), &FormatOptions::default()).unwrap();
    assert_eq!(ds.to_csv().unwrap(), "Name,Note,Active\n");
}

use crate::column::{Column, ColumnSpec, FieldPath};
use crate::errors::{ExportError, Result};
use crate::record::{Attr, Record};
use crate::value::Value;

/// Extract the raw value for `column` from `obj`.
///
/// Computed columns are called with the record and the column label; their
/// errors come back as [`ExportError::Computation`] holding the original error.
///
/// # Errors
/// `MissingAttribute` when a path segment is absent and the column has no
/// default, or the computed column's own error.
pub fn resolve(obj: &dyn Record, column: &Column) -> Result<Value> {
    match column.spec() {
        ColumnSpec::Computed(f) => f(obj, column.label()).map_err(ExportError::Computation),
        ColumnSpec::Path(path) => resolve_path(obj, path, column.default()),
    }
}

/// Walk `path` from `obj`, returning `default` as soon as a segment is missing.
///
/// A scalar or accessor in the middle of the path has no attributes, so the
/// segment after it counts as missing. An accessor at the end is invoked.
///
/// # Errors
/// `MissingAttribute` naming the failing segment and the path up to it, when
/// `default` is `None`.
pub fn resolve_path(obj: &dyn Record, path: &FieldPath, default: Option<&Value>) -> Result<Value> {
    let segments = path.segments();
    let missing = |idx: usize| -> Result<Value> {
        match default {
            Some(d) => Ok(d.clone()),
            None => Err(ExportError::MissingAttribute {
                path: segments[..=idx].join("."),
                segment: segments[idx].clone(),
            }),
        }
    };
    let Some((last, parents)) = segments.split_last() else {
        return Err(ExportError::InvalidPath(String::new()));
    };

    let mut current = obj;
    for (idx, segment) in parents.iter().enumerate() {
        match current.attr(segment) {
            Some(Attr::Record(next)) => current = next,
            Some(_) => return missing(idx + 1),
            None => return missing(idx),
        }
    }
    match current.attr(last) {
        Some(attr) => Ok(attr.into_value()),
        None => missing(parents.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnMapping;
    use std::cell::Cell;

    struct Counter {
        calls: Cell<u32>,
    }

    impl Record for Counter {
        fn attr(&self, name: &str) -> Option<Attr<'_>> {
            match name {
                "next" => Some(Attr::accessor(|| {
                    self.calls.set(self.calls.get() + 1);
                    Value::from(self.calls.get())
                })),
                "plain" => Some(Attr::Value(Value::Int(5))),
                _ => None,
            }
        }
    }

    fn column(mapping: &ColumnMapping, label: &str) -> Column {
        mapping.get(label).cloned().unwrap()
    }

    #[test]
    fn nested_path_returns_leaf_unchanged() {
        let doc = bson::doc! {"a": {"b": {"c": "deep"}}};
        let m = ColumnMapping::new().path("C", "a.b.c").unwrap();
        assert_eq!(resolve(&doc, &column(&m, "C")).unwrap(), Value::from("deep"));
    }

    #[test]
    fn missing_segment_names_segment_and_path_so_far() {
        let doc = bson::doc! {"a": {"b": 1}};
        let m = ColumnMapping::new().path("X", "a.x.c").unwrap();
        let err = resolve(&doc, &column(&m, "X")).unwrap_err();
        match err {
            ExportError::MissingAttribute { path, segment } => {
                assert_eq!(path, "a.x");
                assert_eq!(segment, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_string_default_is_honoured() {
        let doc = bson::doc! {};
        let m = ColumnMapping::new().path_or("Zip", "contact.zip", "").unwrap();
        assert_eq!(resolve(&doc, &column(&m, "Zip")).unwrap(), Value::from(""));
    }

    #[test]
    fn falsy_defaults_are_still_defaults() {
        let doc = bson::doc! {};
        let m = ColumnMapping::new().path_or("N", "n", 0).unwrap();
        assert_eq!(resolve(&doc, &column(&m, "N")).unwrap(), Value::Int(0));
    }

    #[test]
    fn scalar_in_the_middle_is_missing_next_segment() {
        let doc = bson::doc! {"a": 3};
        let m = ColumnMapping::new().path("X", "a.b").unwrap();
        let err = resolve(&doc, &column(&m, "X")).unwrap_err();
        assert!(matches!(err, ExportError::MissingAttribute { ref segment, .. } if segment == "b"));
    }

    #[test]
    fn final_accessor_is_invoked_once() {
        let c = Counter { calls: Cell::new(0) };
        let m = ColumnMapping::new().path("Next", "next").unwrap().path("Plain", "plain").unwrap();
        assert_eq!(resolve(&c, &column(&m, "Next")).unwrap(), Value::Int(1));
        assert_eq!(resolve(&c, &column(&m, "Plain")).unwrap(), Value::Int(5));
        assert_eq!(c.calls.get(), 1);
    }

    #[test]
    fn computed_column_ignores_record_shape() {
        let doc = bson::doc! {"name": "ignored"};
        let m = ColumnMapping::new()
            .computed("Fixed", |_obj, label| Ok(Value::from(format!("{label}:X"))))
            .unwrap();
        assert_eq!(resolve(&doc, &column(&m, "Fixed")).unwrap(), Value::from("Fixed:X"));
    }

    #[test]
    fn computed_errors_pass_through() {
        let doc = bson::doc! {};
        let m = ColumnMapping::new()
            .computed("Boom", |_obj, _label| Err("boom".into()))
            .unwrap();
        let err = resolve(&doc, &column(&m, "Boom")).unwrap_err();
        assert!(matches!(err, ExportError::Computation(_)));
        assert_eq!(err.to_string(), "boom");
    }
}

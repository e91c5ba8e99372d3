//! Declarative CSV export of arbitrary records.
//!
//! A [`ColumnMapping`] names each output column and says how to derive it:
//! a dotted attribute path (`contact.address.zip`) or a computed function.
//! [`build`] walks a source collection once, resolving and normalizing every
//! cell, and returns a [`Dataset`] ready for [`export::write_dataset`].
//!
//! ```
//! use csvview::{ColumnMapping, FormatOptions, build};
//!
//! let mapping = ColumnMapping::new()
//!     .path("Name", "profile.name")?
//!     .path("Active", "profile.is_active")?;
//! let people = vec![
//!     bson::doc! {"profile": {"name": "Ada", "is_active": true}},
//!     bson::doc! {"profile": {"name": "Brian", "is_active": false}},
//! ];
//! let dataset = build(&mapping, &people, &FormatOptions::default())?;
//! assert_eq!(dataset.to_csv()?, "Name,Active\nAda,Yes\nBrian,No\n");
//! # Ok::<(), csvview::ExportError>(())
//! ```

pub mod column;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod export;
pub mod filename;
pub mod input;
pub mod logger;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod value;

pub use column::{Column, ColumnMapping, ColumnSpec, FieldPath};
pub use dataset::{Dataset, Row, Rows, build, materialize_row, rows};
pub use errors::{BoxError, ExportError, Result};
pub use normalize::{DisplayTimezone, FormatOptions, NullPolicy, normalize};
pub use record::{Attr, Record};
pub use resolve::{resolve, resolve_path};
pub use value::Value;

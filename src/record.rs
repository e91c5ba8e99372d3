//! Named-attribute access over source objects.
//!
//! Rust has no runtime reflection, so anything exported through a column mapping
//! implements [`Record`]: a lookup from attribute name to an [`Attr`], which is
//! either a plain value, a nested record to keep walking, or a zero-argument
//! accessor that is invoked when it is the last step of a path.
//!
//! ```
//! use csvview::{Attr, Record, Value};
//!
//! struct Profile { first: String, last: String, active: bool }
//!
//! impl Record for Profile {
//!     fn attr(&self, name: &str) -> Option<Attr<'_>> {
//!         match name {
//!             "active" => Some(Attr::Value(self.active.into())),
//!             "full_name" => Some(Attr::accessor(|| format!("{} {}", self.first, self.last).into())),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

use crate::value::Value;

pub trait Record {
    /// Look up attribute `name`; `None` when the record has no such attribute.
    fn attr(&self, name: &str) -> Option<Attr<'_>>;

    /// Value used when a path ends on the record itself.
    fn to_value(&self) -> Value {
        Value::Null
    }
}

/// The result of a single attribute lookup.
pub enum Attr<'a> {
    Value(Value),
    Record(&'a dyn Record),
    Accessor(Box<dyn Fn() -> Value + 'a>),
}

impl<'a> Attr<'a> {
    pub fn accessor(f: impl Fn() -> Value + 'a) -> Self {
        Self::Accessor(Box::new(f))
    }

    /// Collapse into a value, invoking an accessor.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(v) => v,
            Self::Record(r) => r.to_value(),
            Self::Accessor(f) => f(),
        }
    }
}

impl std::fmt::Debug for Attr<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Record(_) => f.write_str("Record(..)"),
            Self::Accessor(_) => f.write_str("Accessor(..)"),
        }
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        (**self).attr(name)
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        (**self).attr(name)
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl Record for bson::Document {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        self.get(name).map(|v| match v {
            bson::Bson::Document(d) => Attr::Record(d),
            other => Attr::Value(Value::from_bson(other)),
        })
    }

    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl Record for serde_json::Map<String, serde_json::Value> {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        self.get(name).map(|v| match v {
            serde_json::Value::Object(m) => Attr::Record(m),
            other => Attr::Value(Value::from_json(other)),
        })
    }

    fn to_value(&self) -> Value {
        serde_json::to_string(self).map_or(Value::Null, Value::Text)
    }
}

impl Record for serde_json::Value {
    fn attr(&self, name: &str) -> Option<Attr<'_>> {
        match self {
            serde_json::Value::Object(m) => m.attr(name),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::from_json(self)
    }
}

//! State inspection for debuggers and dumps.
//!
//! Queries never affect emulation state.

use std::fmt;

/// A dynamically-typed value returned by state queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U64(u64),
    /// No value (e.g. an empty interrupt cell).
    None,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", u8::from(*v)),
            Value::U8(v) => write!(f, "{v:02X}"),
            Value::U16(v) => write!(f, "{v:04X}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::None => write!(f, "-"),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

/// A component whose state can be inspected by path.
pub trait Observable {
    /// Query a property by dotted path, e.g. `pc`, `hl` or `flags.z`.
    ///
    /// Returns `None` if the path is not recognised.
    fn query(&self, path: &str) -> Option<Value>;

    /// All paths `query()` understands.
    fn query_paths(&self) -> &'static [&'static str];

    /// Every path paired with its current value, in `query_paths()` order.
    fn dump(&self) -> Vec<(&'static str, Value)> {
        self.query_paths()
            .iter()
            .filter_map(|&path| self.query(path).map(|v| (path, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(u8);

    impl Observable for Latch {
        fn query(&self, path: &str) -> Option<Value> {
            match path {
                "value" => Some(self.0.into()),
                "zero" => Some((self.0 == 0).into()),
                _ => None,
            }
        }

        fn query_paths(&self) -> &'static [&'static str] {
            &["value", "zero", "missing"]
        }
    }

    #[test]
    fn display_is_hex_for_registers() {
        assert_eq!(Value::U8(0x0A).to_string(), "0A");
        assert_eq!(Value::U16(0x2400).to_string(), "2400");
        assert_eq!(Value::U64(33_333).to_string(), "33333");
        assert_eq!(Value::Bool(true).to_string(), "1");
        assert_eq!(Value::from(None::<u8>).to_string(), "-");
    }

    #[test]
    fn dump_skips_unknown_paths() {
        let dump = Latch(0).dump();
        assert_eq!(dump, vec![("value", Value::U8(0)), ("zero", Value::Bool(true))]);
    }
}

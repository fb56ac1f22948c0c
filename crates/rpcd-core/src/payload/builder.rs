//! Per-request response builder.
//!
//! Handlers append fields in order and may open nested arrays and tables.
//! Containers close in LIFO order; [`ResponseBuilder::finish`] refuses to
//! produce a payload while anything is still open.
//!
//! ```
//! use rpcd_core::payload::ResponseBuilder;
//!
//! let mut b = ResponseBuilder::new();
//! b.open_array("keys").unwrap();
//! b.push_string("ssh-ed25519 AAAA... root@host").unwrap();
//! b.close().unwrap();
//! let payload = b.finish().unwrap();
//! assert_eq!(payload["keys"][0], "ssh-ed25519 AAAA... root@host");
//! ```

use rpcd_common::Error;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Builder misuse.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("unnamed value added to a table")]
    NameRequired,

    #[error("named field `{0}` added to an array")]
    NameInArray(String),

    #[error("close() with no open container")]
    NothingOpen,

    #[error("{0} container(s) still open at finish")]
    Unbalanced(usize),

    #[error("record did not serialize to a table")]
    NotATable,

    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<BuilderError> for Error {
    fn from(err: BuilderError) -> Self {
        Error::Unknown(err.to_string())
    }
}

#[derive(Debug)]
enum Frame {
    Array {
        name: Option<String>,
        items: Vec<Value>,
    },
    Table {
        name: Option<String>,
        fields: Map<String, Value>,
    },
}

/// Incrementally built response payload.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    root: Map<String, Value>,
    stack: Vec<Frame>,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn add_u32(&mut self, name: &str, value: u32) -> Result<(), BuilderError> {
        self.insert(name, Value::from(value))
    }

    pub fn add_u64(&mut self, name: &str, value: u64) -> Result<(), BuilderError> {
        self.insert(name, Value::from(value))
    }

    pub fn add_i64(&mut self, name: &str, value: i64) -> Result<(), BuilderError> {
        self.insert(name, Value::from(value))
    }

    pub fn add_bool(&mut self, name: &str, value: bool) -> Result<(), BuilderError> {
        self.insert(name, Value::Bool(value))
    }

    pub fn add_string(&mut self, name: &str, value: impl Into<String>) -> Result<(), BuilderError> {
        self.insert(name, Value::String(value.into()))
    }

    /// Add a typed record as a named table.
    pub fn add_record<T: Serialize>(&mut self, name: &str, record: &T) -> Result<(), BuilderError> {
        let table = to_table(record)?;
        self.insert(name, table)
    }

    /// Append a string element to the open array.
    pub fn push_string(&mut self, value: impl Into<String>) -> Result<(), BuilderError> {
        self.push(Value::String(value.into()))
    }

    /// Append a typed record to the open array as a table element.
    pub fn push_record<T: Serialize>(&mut self, record: &T) -> Result<(), BuilderError> {
        let table = to_table(record)?;
        self.push(table)
    }

    /// Emit `records` as a named array of tables.
    pub fn add_records<'r, T, I>(&mut self, name: &str, records: I) -> Result<(), BuilderError>
    where
        T: Serialize + 'r,
        I: IntoIterator<Item = &'r T>,
    {
        self.open_array(name)?;
        for record in records {
            self.push_record(record)?;
        }
        self.close()
    }

    pub fn open_array(&mut self, name: &str) -> Result<(), BuilderError> {
        self.check_named(name)?;
        self.stack.push(Frame::Array {
            name: Some(name.to_string()),
            items: Vec::new(),
        });
        Ok(())
    }

    pub fn open_table(&mut self, name: &str) -> Result<(), BuilderError> {
        self.check_named(name)?;
        self.stack.push(Frame::Table {
            name: Some(name.to_string()),
            fields: Map::new(),
        });
        Ok(())
    }

    /// Open an unnamed table as the next element of the open array.
    pub fn push_table(&mut self) -> Result<(), BuilderError> {
        self.check_unnamed()?;
        self.stack.push(Frame::Table {
            name: None,
            fields: Map::new(),
        });
        Ok(())
    }

    /// Close the innermost open container.
    pub fn close(&mut self) -> Result<(), BuilderError> {
        let (name, value) = match self.stack.pop().ok_or(BuilderError::NothingOpen)? {
            Frame::Array { name, items } => (name, Value::Array(items)),
            Frame::Table { name, fields } => (name, Value::Object(fields)),
        };

        match name {
            Some(name) => self.insert(&name, value),
            None => self.push(value),
        }
    }

    /// Finish the payload. Fails if any container is still open.
    pub fn finish(self) -> Result<Value, BuilderError> {
        if !self.stack.is_empty() {
            return Err(BuilderError::Unbalanced(self.stack.len()));
        }
        Ok(Value::Object(self.root))
    }

    fn check_named(&self, name: &str) -> Result<(), BuilderError> {
        match self.stack.last() {
            Some(Frame::Array { .. }) => Err(BuilderError::NameInArray(name.to_string())),
            _ => Ok(()),
        }
    }

    fn check_unnamed(&self) -> Result<(), BuilderError> {
        match self.stack.last() {
            Some(Frame::Array { .. }) => Ok(()),
            _ => Err(BuilderError::NameRequired),
        }
    }

    fn insert(&mut self, name: &str, value: Value) -> Result<(), BuilderError> {
        match self.stack.last_mut() {
            None => {
                self.root.insert(name.to_string(), value);
                Ok(())
            }
            Some(Frame::Table { fields, .. }) => {
                fields.insert(name.to_string(), value);
                Ok(())
            }
            Some(Frame::Array { .. }) => Err(BuilderError::NameInArray(name.to_string())),
        }
    }

    fn push(&mut self, value: Value) -> Result<(), BuilderError> {
        match self.stack.last_mut() {
            Some(Frame::Array { items, .. }) => {
                items.push(value);
                Ok(())
            }
            _ => Err(BuilderError::NameRequired),
        }
    }
}

fn to_table<T: Serialize>(record: &T) -> Result<Value, BuilderError> {
    match serde_json::to_value(record)? {
        table @ Value::Object(_) => Ok(table),
        _ => Err(BuilderError::NotATable),
    }
}

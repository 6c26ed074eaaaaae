//! The serialization protocol: a double-dispatch read/write of typed
//! fields, with the `ObjectWriter`/`ObjectReader` pair as the single point
//! of truth for an entity's shape.
//!
//! Every managed entity walks its own fields, in a stable order, against a
//! [`ObjectWriter`] (serialize) or a [`ObjectReader`] (deserialize). The same
//! walk order is what lets the statement creator define column order for
//! `CREATE`/`INSERT` and bind parameters positionally.

use object_store_types::{ContainerKind, Identity, TypeName};

use crate::error::FieldError;

/// One typed value as carried by the serialization protocol.
///
/// This is the concrete shape a [`crate::record::Record`] stores per field;
/// it is also what [`ObjectWriter`]/[`ObjectReader`] implementations
/// ultimately produce or consume.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `char`
    Char(i8),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `unsigned char`
    UChar(u8),
    /// `unsigned short`
    UShort(u16),
    /// `unsigned int`
    UInt(u32),
    /// `unsigned long`
    ULong(u64),
    /// `bool`
    Bool(bool),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// Fixed-width byte buffer, e.g. `CHAR(N)`.
    Bytes {
        /// Buffer contents.
        bytes: Vec<u8>,
        /// Declared fixed width `N`.
        len: usize,
    },
    /// Bounded-length string, e.g. `VARCHAR(N)`.
    Varchar {
        /// String contents.
        value: String,
        /// Declared maximum length `N`.
        max_len: usize,
    },
    /// Variable, unbounded string (`TEXT`).
    Text(String),
    /// Strong object pointer: the referenced prototype and, if bound, its
    /// identity.
    ObjectRef {
        /// Target prototype's type name.
        prototype: TypeName,
        /// Target identity, or `None` for a null reference.
        identity: Option<Identity>,
    },
    /// An owned container of object pointers.
    Container {
        /// Target prototype's type name (the container's element type).
        prototype: TypeName,
        /// Set vs. list ordering semantics.
        kind: ContainerKind,
        /// Member identities, in container order.
        items: Vec<Identity>,
    },
}

impl FieldValue {
    /// A short, human-readable type tag, used in [`FieldError::TypeMismatch`].
    pub fn type_tag(&self) -> &'static str {
        match self {
            FieldValue::Char(_) => "char",
            FieldValue::Short(_) => "short",
            FieldValue::Int(_) => "int",
            FieldValue::Long(_) => "long",
            FieldValue::UChar(_) => "uchar",
            FieldValue::UShort(_) => "ushort",
            FieldValue::UInt(_) => "uint",
            FieldValue::ULong(_) => "ulong",
            FieldValue::Bool(_) => "bool",
            FieldValue::Float(_) => "float",
            FieldValue::Double(_) => "double",
            FieldValue::Bytes { .. } => "bytes",
            FieldValue::Varchar { .. } => "varchar",
            FieldValue::Text(_) => "text",
            FieldValue::ObjectRef { .. } => "object_ref",
            FieldValue::Container { .. } => "container",
        }
    }
}

/// Writer role of the serialization protocol: entity fields flow out to the
/// implementer (a column collector, a record builder, a parameter binder…).
///
/// Implementers never fail on the writer side in this engine (there is
/// nothing to resolve), but the signature returns `Result` for symmetry with
/// [`ObjectReader`] and so that future writers backed by fallible sinks (a
/// bounded buffer, say) can report failure without changing the trait.
pub trait ObjectWriter {
    /// Write a `char` field.
    fn write_char(&mut self, id: &'static str, value: i8) -> Result<(), FieldError>;
    /// Write a `short` field.
    fn write_short(&mut self, id: &'static str, value: i16) -> Result<(), FieldError>;
    /// Write an `int` field.
    fn write_int(&mut self, id: &'static str, value: i32) -> Result<(), FieldError>;
    /// Write a `long` field.
    fn write_long(&mut self, id: &'static str, value: i64) -> Result<(), FieldError>;
    /// Write an `unsigned char` field.
    fn write_uchar(&mut self, id: &'static str, value: u8) -> Result<(), FieldError>;
    /// Write an `unsigned short` field.
    fn write_ushort(&mut self, id: &'static str, value: u16) -> Result<(), FieldError>;
    /// Write an `unsigned int` field.
    fn write_uint(&mut self, id: &'static str, value: u32) -> Result<(), FieldError>;
    /// Write an `unsigned long` field.
    fn write_ulong(&mut self, id: &'static str, value: u64) -> Result<(), FieldError>;
    /// Write a `bool` field.
    fn write_bool(&mut self, id: &'static str, value: bool) -> Result<(), FieldError>;
    /// Write a `float` field.
    fn write_float(&mut self, id: &'static str, value: f32) -> Result<(), FieldError>;
    /// Write a `double` field.
    fn write_double(&mut self, id: &'static str, value: f64) -> Result<(), FieldError>;
    /// Write a fixed-width byte buffer field.
    fn write_bytes(&mut self, id: &'static str, value: &[u8], len: usize) -> Result<(), FieldError>;
    /// Write a bounded-length string field.
    fn write_varchar(&mut self, id: &'static str, value: &str, max_len: usize) -> Result<(), FieldError>;
    /// Write a variable, unbounded string field.
    fn write_string(&mut self, id: &'static str, value: &str) -> Result<(), FieldError>;
    /// Write a strong object pointer field.
    fn write_object_ref(
        &mut self,
        id: &'static str,
        prototype: &str,
        identity: Option<Identity>,
    ) -> Result<(), FieldError>;
    /// Write an owned container field.
    fn write_container(
        &mut self,
        id: &'static str,
        prototype: &str,
        kind: ContainerKind,
        items: &[Identity],
    ) -> Result<(), FieldError>;
}

/// Reader role of the serialization protocol: the implementer resolves a
/// requested field identifier and hands back a typed value.
///
/// A reader that cannot resolve the requested field identifier must fail
/// with [`FieldError::MissingField`]; a reader that resolves it to a value of
/// the wrong shape must fail with [`FieldError::TypeMismatch`].
pub trait ObjectReader {
    /// Read a `char` field.
    fn read_char(&mut self, id: &'static str) -> Result<i8, FieldError>;
    /// Read a `short` field.
    fn read_short(&mut self, id: &'static str) -> Result<i16, FieldError>;
    /// Read an `int` field.
    fn read_int(&mut self, id: &'static str) -> Result<i32, FieldError>;
    /// Read a `long` field.
    fn read_long(&mut self, id: &'static str) -> Result<i64, FieldError>;
    /// Read an `unsigned char` field.
    fn read_uchar(&mut self, id: &'static str) -> Result<u8, FieldError>;
    /// Read an `unsigned short` field.
    fn read_ushort(&mut self, id: &'static str) -> Result<u16, FieldError>;
    /// Read an `unsigned int` field.
    fn read_uint(&mut self, id: &'static str) -> Result<u32, FieldError>;
    /// Read an `unsigned long` field.
    fn read_ulong(&mut self, id: &'static str) -> Result<u64, FieldError>;
    /// Read a `bool` field.
    fn read_bool(&mut self, id: &'static str) -> Result<bool, FieldError>;
    /// Read a `float` field.
    fn read_float(&mut self, id: &'static str) -> Result<f32, FieldError>;
    /// Read a `double` field.
    fn read_double(&mut self, id: &'static str) -> Result<f64, FieldError>;
    /// Read a fixed-width byte buffer field.
    fn read_bytes(&mut self, id: &'static str) -> Result<Vec<u8>, FieldError>;
    /// Read a bounded-length string field.
    fn read_varchar(&mut self, id: &'static str) -> Result<String, FieldError>;
    /// Read a variable, unbounded string field.
    fn read_string(&mut self, id: &'static str) -> Result<String, FieldError>;
    /// Read a strong object pointer field, as `(prototype, identity)`.
    fn read_object_ref(&mut self, id: &'static str) -> Result<(TypeName, Option<Identity>), FieldError>;
    /// Read an owned container field, as `(prototype, kind, items)`.
    fn read_container(
        &mut self,
        id: &'static str,
    ) -> Result<(TypeName, ContainerKind, Vec<Identity>), FieldError>;
}

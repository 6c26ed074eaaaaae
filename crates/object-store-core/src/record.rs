//! A concrete, ordered field list realizing the serialization protocol.
//!
//! [`Record`] is what [`crate::action::Action::Update`]'s pre-image and
//! [`crate::action::Action::Delete`]'s full serialization carry, and it is
//! the shape the SQL statement creator walks to discover columns in
//! serialization order.

use object_store_types::{ContainerKind, FieldId, Identity, TypeName};

use crate::error::FieldError;
use crate::field::{FieldValue, ObjectReader, ObjectWriter};
use crate::entity::ManagedEntity;

/// An ordered `(field id, value)` list capturing one entity's complete
/// serialized shape at a point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record(pub Vec<(FieldId, FieldValue)>);

impl Record {
    /// Serializes `entity` into a fresh [`Record`] by walking its fields in
    /// declaration order.
    pub fn capture(entity: &dyn ManagedEntity) -> Result<Record, FieldError> {
        let mut writer = RecordingWriter::default();
        entity.serialize(&mut writer)?;
        Ok(writer.into_record())
    }

    /// Replays this record's fields back onto `entity` via its
    /// `deserialize` walk.
    pub fn apply(&self, entity: &mut dyn ManagedEntity) -> Result<(), FieldError> {
        let mut reader = RecordingReader::new(self);
        entity.deserialize(&mut reader)
    }

    /// Looks up a field by id, in O(n) (entity field counts are small).
    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| *k == id).map(|(_, v)| v)
    }

    /// Iterates fields in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = &(FieldId, FieldValue)> {
        self.0.iter()
    }
}

/// An [`ObjectWriter`] that records every write into an ordered [`Record`].
#[derive(Debug, Default)]
pub struct RecordingWriter {
    fields: Vec<(FieldId, FieldValue)>,
}

impl RecordingWriter {
    /// Consumes the writer, yielding the [`Record`] built so far.
    pub fn into_record(self) -> Record {
        Record(self.fields)
    }
}

macro_rules! record_write {
    ($name:ident, $ty:ty, $variant:ident) => {
        fn $name(&mut self, id: &'static str, value: $ty) -> Result<(), FieldError> {
            self.fields.push((id, FieldValue::$variant(value)));
            Ok(())
        }
    };
}

impl ObjectWriter for RecordingWriter {
    record_write!(write_char, i8, Char);
    record_write!(write_short, i16, Short);
    record_write!(write_int, i32, Int);
    record_write!(write_long, i64, Long);
    record_write!(write_uchar, u8, UChar);
    record_write!(write_ushort, u16, UShort);
    record_write!(write_uint, u32, UInt);
    record_write!(write_ulong, u64, ULong);
    record_write!(write_bool, bool, Bool);
    record_write!(write_float, f32, Float);
    record_write!(write_double, f64, Double);

    fn write_bytes(&mut self, id: &'static str, value: &[u8], len: usize) -> Result<(), FieldError> {
        self.fields.push((
            id,
            FieldValue::Bytes {
                bytes: value.to_vec(),
                len,
            },
        ));
        Ok(())
    }

    fn write_varchar(&mut self, id: &'static str, value: &str, max_len: usize) -> Result<(), FieldError> {
        self.fields.push((
            id,
            FieldValue::Varchar {
                value: value.to_string(),
                max_len,
            },
        ));
        Ok(())
    }

    fn write_string(&mut self, id: &'static str, value: &str) -> Result<(), FieldError> {
        self.fields.push((id, FieldValue::Text(value.to_string())));
        Ok(())
    }

    fn write_object_ref(
        &mut self,
        id: &'static str,
        prototype: &str,
        identity: Option<Identity>,
    ) -> Result<(), FieldError> {
        self.fields.push((
            id,
            FieldValue::ObjectRef {
                prototype: prototype.to_string(),
                identity,
            },
        ));
        Ok(())
    }

    fn write_container(
        &mut self,
        id: &'static str,
        prototype: &str,
        kind: ContainerKind,
        items: &[Identity],
    ) -> Result<(), FieldError> {
        self.fields.push((
            id,
            FieldValue::Container {
                prototype: prototype.to_string(),
                kind,
                items: items.to_vec(),
            },
        ));
        Ok(())
    }
}

/// An [`ObjectReader`] that replays a previously captured [`Record`].
pub struct RecordingReader<'r> {
    record: &'r Record,
}

impl<'r> RecordingReader<'r> {
    /// Creates a reader that will resolve fields against `record`.
    pub fn new(record: &'r Record) -> Self {
        Self { record }
    }

    fn get(&self, id: &'static str) -> Result<&FieldValue, FieldError> {
        self.record
            .get(id)
            .ok_or(FieldError::MissingField { field: id })
    }
}

macro_rules! record_read {
    ($name:ident, $ty:ty, $variant:ident, $tag:literal) => {
        fn $name(&mut self, id: &'static str) -> Result<$ty, FieldError> {
            match self.get(id)? {
                FieldValue::$variant(v) => Ok(*v),
                other => Err(FieldError::TypeMismatch {
                    field: id,
                    expected: $tag,
                    found: other.type_tag(),
                }),
            }
        }
    };
}

impl<'r> ObjectReader for RecordingReader<'r> {
    record_read!(read_char, i8, Char, "char");
    record_read!(read_short, i16, Short, "short");
    record_read!(read_int, i32, Int, "int");
    record_read!(read_long, i64, Long, "long");
    record_read!(read_uchar, u8, UChar, "uchar");
    record_read!(read_ushort, u16, UShort, "ushort");
    record_read!(read_uint, u32, UInt, "uint");
    record_read!(read_ulong, u64, ULong, "ulong");
    record_read!(read_bool, bool, Bool, "bool");
    record_read!(read_float, f32, Float, "float");
    record_read!(read_double, f64, Double, "double");

    fn read_bytes(&mut self, id: &'static str) -> Result<Vec<u8>, FieldError> {
        match self.get(id)? {
            FieldValue::Bytes { bytes, .. } => Ok(bytes.clone()),
            other => Err(FieldError::TypeMismatch {
                field: id,
                expected: "bytes",
                found: other.type_tag(),
            }),
        }
    }

    fn read_varchar(&mut self, id: &'static str) -> Result<String, FieldError> {
        match self.get(id)? {
            FieldValue::Varchar { value, .. } => Ok(value.clone()),
            other => Err(FieldError::TypeMismatch {
                field: id,
                expected: "varchar",
                found: other.type_tag(),
            }),
        }
    }

    fn read_string(&mut self, id: &'static str) -> Result<String, FieldError> {
        match self.get(id)? {
            FieldValue::Text(value) => Ok(value.clone()),
            other => Err(FieldError::TypeMismatch {
                field: id,
                expected: "text",
                found: other.type_tag(),
            }),
        }
    }

    fn read_object_ref(&mut self, id: &'static str) -> Result<(TypeName, Option<Identity>), FieldError> {
        match self.get(id)? {
            FieldValue::ObjectRef { prototype, identity } => Ok((prototype.clone(), *identity)),
            other => Err(FieldError::TypeMismatch {
                field: id,
                expected: "object_ref",
                found: other.type_tag(),
            }),
        }
    }

    fn read_container(
        &mut self,
        id: &'static str,
    ) -> Result<(TypeName, ContainerKind, Vec<Identity>), FieldError> {
        match self.get(id)? {
            FieldValue::Container { prototype, kind, items } => {
                Ok((prototype.clone(), *kind, items.clone()))
            }
            other => Err(FieldError::TypeMismatch {
                field: id,
                expected: "container",
                found: other.type_tag(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::Person;

    #[test]
    fn round_trip_is_field_wise_identical() {
        let person = Person::new(1, "ada", 36);
        let record = Record::capture(&person).unwrap();

        let mut restored = Person::new(0, "", 0);
        record.apply(&mut restored).unwrap();

        assert_eq!(person, restored);
    }

    #[test]
    fn missing_field_surfaces() {
        let record = Record(vec![("name", FieldValue::Text("ada".into()))]);
        let mut reader = RecordingReader::new(&record);
        let err = reader.read_int("age").unwrap_err();
        assert_eq!(err, FieldError::MissingField { field: "age" });
    }

    #[test]
    fn type_mismatch_surfaces() {
        let record = Record(vec![("age", FieldValue::Text("not a number".into()))]);
        let mut reader = RecordingReader::new(&record);
        let err = reader.read_int("age").unwrap_err();
        assert_eq!(
            err,
            FieldError::TypeMismatch {
                field: "age",
                expected: "int",
                found: "text",
            }
        );
    }
}

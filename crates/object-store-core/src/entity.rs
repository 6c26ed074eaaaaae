//! The managed-entity capability set.
//!
//! Concrete entity types implement a small capability set instead of
//! extending a common base class.
//!
//! Concrete entities are plain records implementing [`ManagedEntity`], not
//! extenders of a root `serializable` class. Identity, prototype, and
//! version live in [`crate::store::ManagedRecord`], owned by the store —
//! never on the entity itself.

use std::any::Any;

use crate::error::FieldError;
use crate::field::{ObjectReader, ObjectWriter};

/// The minimum contract a type must satisfy to be stored, journaled, and
/// projected to SQL: it can serialize itself out, rebuild itself from a
/// serialized form, and names the prototype it belongs to.
pub trait ManagedEntity: Any + std::fmt::Debug {
    /// The registered prototype type name this entity is an instance of.
    fn prototype_name(&self) -> &str;

    /// Serializes this entity's fields, in a stable order, to `writer`.
    fn serialize(&self, writer: &mut dyn ObjectWriter) -> Result<(), FieldError>;

    /// Rebuilds this entity's fields, in the same order used by
    /// [`ManagedEntity::serialize`], from `reader`.
    fn deserialize(&mut self, reader: &mut dyn ObjectReader) -> Result<(), FieldError>;

    /// Narrows to `&dyn Any` for downcasting through a [`crate::pointer::StrongPtr`].
    fn as_any(&self) -> &dyn Any;

    /// Narrows to `&mut dyn Any` for downcasting through a [`crate::pointer::StrongPtr`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A couple of toy [`ManagedEntity`] implementations shared by this crate's
/// own tests and by `object-store-session`'s integration tests (enabled via
/// the `test-support` feature).
#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use object_store_types::{ContainerKind, Identity};

    /// `person{id:int, name:varchar(32), age:int}`.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Person {
        pub name: String,
        pub age: i32,
    }

    impl Person {
        /// Builds a person. The leading `_unused_id` parameter mirrors the
        /// scenario's literal field list; identity is assigned by the store,
        /// never by the entity.
        pub fn new(_unused_id: i64, name: &str, age: i32) -> Self {
            Self { name: name.to_string(), age }
        }
    }

    impl ManagedEntity for Person {
        fn prototype_name(&self) -> &str {
            "person"
        }

        fn serialize(&self, writer: &mut dyn ObjectWriter) -> Result<(), FieldError> {
            writer.write_varchar("name", &self.name, 32)?;
            writer.write_int("age", self.age)?;
            Ok(())
        }

        fn deserialize(&mut self, reader: &mut dyn ObjectReader) -> Result<(), FieldError> {
            self.name = reader.read_varchar("name")?;
            self.age = reader.read_int("age")?;
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// `employee{name:varchar(32)}` — owned element of [`Department`]'s container.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Employee {
        pub name: String,
    }

    impl Employee {
        pub fn new(name: &str) -> Self {
            Self { name: name.to_string() }
        }
    }

    impl ManagedEntity for Employee {
        fn prototype_name(&self) -> &str {
            "employee"
        }

        fn serialize(&self, writer: &mut dyn ObjectWriter) -> Result<(), FieldError> {
            writer.write_varchar("name", &self.name, 32)
        }

        fn deserialize(&mut self, reader: &mut dyn ObjectReader) -> Result<(), FieldError> {
            self.name = reader.read_varchar("name")?;
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// `department{name:varchar(64), employees:container<employee>}` —
    /// Owns a container of employees, exercising cascade delete.
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Department {
        pub name: String,
        pub employees: Vec<Identity>,
    }

    impl Department {
        pub fn new(name: &str) -> Self {
            Self { name: name.to_string(), employees: Vec::new() }
        }
    }

    impl ManagedEntity for Department {
        fn prototype_name(&self) -> &str {
            "department"
        }

        fn serialize(&self, writer: &mut dyn ObjectWriter) -> Result<(), FieldError> {
            writer.write_varchar("name", &self.name, 64)?;
            writer.write_container("employees", "employee", ContainerKind::Set, &self.employees)?;
            Ok(())
        }

        fn deserialize(&mut self, reader: &mut dyn ObjectReader) -> Result<(), FieldError> {
            self.name = reader.read_varchar("name")?;
            let (_, _, items) = reader.read_container("employees")?;
            self.employees = items;
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }
}

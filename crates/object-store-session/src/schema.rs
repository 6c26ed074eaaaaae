//! Per-prototype schema metadata derived once, at
//! [`crate::session::Session::attach`] time, from a zero-valued dummy entity.

use object_store_core::field::FieldValue;
use object_store_core::record::Record;
use object_store_types::{ContainerKind, FieldId, TypeName};

/// One container-kind field discovered on a prototype's dummy record.
#[derive(Debug, Clone)]
pub struct ContainerField {
    /// The field identifier (and join-table name suffix).
    pub field: FieldId,
    /// Set vs. list ordering, controlling whether the join table gets a
    /// `position` column.
    pub kind: ContainerKind,
    /// The contained element's prototype type name.
    pub child_prototype: TypeName,
}

/// A prototype's discovered shape: its dummy record (for column discovery)
/// and the container fields singled out of it.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    /// A zero-valued instance's serialized shape, in declaration order.
    pub dummy: Record,
    /// Every `Container`-kind field on this prototype, in declaration order.
    pub containers: Vec<ContainerField>,
}

impl TypeSchema {
    /// Derives a [`TypeSchema`] from `dummy`, a freshly produced zero-valued
    /// entity's captured record.
    pub fn from_dummy(dummy: Record) -> Self {
        let containers = dummy
            .iter()
            .filter_map(|(field, value)| match value {
                FieldValue::Container { prototype, kind, .. } => {
                    Some(ContainerField { field, kind: *kind, child_prototype: prototype.clone() })
                }
                _ => None,
            })
            .collect();
        Self { dummy, containers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store_core::entity::test_support::{Department, Person};

    #[test]
    fn scalar_only_entity_has_no_container_fields() {
        let dummy = Record::capture(&Person::default()).unwrap();
        let schema = TypeSchema::from_dummy(dummy);
        assert!(schema.containers.is_empty());
    }

    #[test]
    fn container_field_is_discovered_with_its_kind_and_child_prototype() {
        let dummy = Record::capture(&Department::default()).unwrap();
        let schema = TypeSchema::from_dummy(dummy);
        assert_eq!(schema.containers.len(), 1);
        assert_eq!(schema.containers[0].field, "employees");
        assert_eq!(schema.containers[0].child_prototype, "employee");
        assert_eq!(schema.containers[0].kind, ContainerKind::Set);
    }
}

//! Type → producer/metadata map and hierarchy.

use std::rc::Rc;

use indexmap::IndexMap;
use object_store_types::TypeName;

use crate::entity::ManagedEntity;
use crate::error::RegistryError;

/// Creates a zero-valued entity of one registered type.
pub type Producer = Rc<dyn Fn() -> Box<dyn ManagedEntity>>;

/// Metadata node describing one registered, managed type.
pub struct Prototype {
    name: TypeName,
    parent: Option<TypeName>,
    children: Vec<TypeName>,
    producer: Producer,
}

impl std::fmt::Debug for Prototype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prototype")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

impl Prototype {
    /// The registered type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parent type name, if this prototype was attached with one.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Direct children, in attachment order.
    pub fn children(&self) -> &[TypeName] {
        &self.children
    }

    /// Produces a fresh, zero-valued entity of this type.
    pub fn produce(&self) -> Box<dyn ManagedEntity> {
        (self.producer)()
    }
}

/// Type name → producer/metadata map, with a parent/child hierarchy.
///
/// The prototype graph is a forest: every prototype is either a root (no
/// parent) or reachable from exactly one root via `parent` links. Type names
/// are globally unique.
#[derive(Debug, Default)]
pub struct PrototypeRegistry {
    by_name: IndexMap<TypeName, Rc<Prototype>>,
    roots: Vec<TypeName>,
}

impl PrototypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new prototype node.
    ///
    /// Fails with [`RegistryError::DuplicateType`] if `type_name` is already
    /// registered, or [`RegistryError::UnknownParent`] if `parent_type_name`
    /// is given and not registered.
    pub fn attach(
        &mut self,
        type_name: impl Into<TypeName>,
        producer: Producer,
        parent_type_name: Option<&str>,
    ) -> Result<Rc<Prototype>, RegistryError> {
        let type_name = type_name.into();
        if self.by_name.contains_key(&type_name) {
            return Err(RegistryError::DuplicateType(type_name));
        }

        if let Some(parent) = parent_type_name {
            if !self.by_name.contains_key(parent) {
                return Err(RegistryError::UnknownParent(parent.to_string()));
            }
        }

        let node = Rc::new(Prototype {
            name: type_name.clone(),
            parent: parent_type_name.map(|p| p.to_string()),
            children: Vec::new(),
            producer,
        });

        self.by_name.insert(type_name.clone(), node.clone());

        match parent_type_name {
            Some(parent) => {
                // Parent already validated present above; rebuild its entry
                // with the new child appended (Prototype is immutable once
                // shared via Rc).
                let parent_node = self.by_name.get(parent).expect("validated above").clone();
                let mut children = parent_node.children.clone();
                children.push(type_name.clone());
                let replacement = Rc::new(Prototype {
                    name: parent_node.name.clone(),
                    parent: parent_node.parent.clone(),
                    children,
                    producer: parent_node.producer.clone(),
                });
                self.by_name.insert(parent.to_string(), replacement);
            }
            None => self.roots.push(type_name),
        }

        Ok(self.by_name.get(node.name.as_str()).expect("just inserted").clone())
    }

    /// O(1) expected lookup by type name.
    pub fn find(&self, type_name: &str) -> Option<Rc<Prototype>> {
        self.by_name.get(type_name).cloned()
    }

    /// Depth-first walk, restartable (each call takes a fresh snapshot) and
    /// finite. With `root` given, walks only that subtree; with `None`,
    /// walks the whole forest in registration order.
    pub fn walk(&self, root: Option<&str>) -> Vec<Rc<Prototype>> {
        let mut out = Vec::new();
        match root {
            Some(name) => {
                if let Some(node) = self.find(name) {
                    self.walk_from(&node, &mut out);
                }
            }
            None => {
                for root_name in &self.roots {
                    if let Some(node) = self.by_name.get(root_name) {
                        self.walk_from(node, &mut out);
                    }
                }
            }
        }
        out
    }

    fn walk_from(&self, node: &Rc<Prototype>, out: &mut Vec<Rc<Prototype>>) {
        out.push(node.clone());
        for child_name in &node.children {
            if let Some(child) = self.by_name.get(child_name) {
                self.walk_from(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::test_support::Person;

    fn person_producer() -> Producer {
        Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>)
    }

    #[test]
    fn attach_and_find() {
        let mut reg = PrototypeRegistry::new();
        reg.attach("person", person_producer(), None).unwrap();
        assert!(reg.find("person").is_some());
        assert!(reg.find("ghost").is_none());
    }

    #[test]
    fn duplicate_type_rejected() {
        let mut reg = PrototypeRegistry::new();
        reg.attach("person", person_producer(), None).unwrap();
        let err = reg.attach("person", person_producer(), None).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateType("person".to_string()));
    }

    #[test]
    fn unknown_parent_rejected() {
        let mut reg = PrototypeRegistry::new();
        let err = reg.attach("employee", person_producer(), Some("department")).unwrap_err();
        assert_eq!(err, RegistryError::UnknownParent("department".to_string()));
    }

    #[test]
    fn walk_is_depth_first_and_restartable() {
        let mut reg = PrototypeRegistry::new();
        reg.attach("entity", person_producer(), None).unwrap();
        reg.attach("person", person_producer(), Some("entity")).unwrap();
        reg.attach("employee", person_producer(), Some("person")).unwrap();
        reg.attach("asset", person_producer(), Some("entity")).unwrap();

        let names: Vec<_> = reg.walk(None).iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["entity", "person", "employee", "asset"]);

        // Restartable: walking again yields the same sequence.
        let names_again: Vec<_> = reg.walk(None).iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, names_again);
    }

    #[test]
    fn detached_subtree_is_invisible() {
        let mut reg = PrototypeRegistry::new();
        reg.attach("entity", person_producer(), None).unwrap();
        reg.attach("person", person_producer(), Some("entity")).unwrap();

        let names: Vec<_> = reg.walk(Some("person")).iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["person"]);
    }
}

//! A named-driver registry.
//!
//! Drivers are conceptually loaded by name from host configuration
//! (`backend` + `uri`), the way a `create_database`/`destroy_database`
//! C-ABI pair would be resolved through a dynamic-load path in a systems
//! language. This crate represents "resolve a named driver" as a plain
//! name → constructor-closure map instead, the idiomatic equivalent
//! without fabricating an FFI/`libloading` dependency.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::backend::Backend;

/// Constructs a fresh, unopened backend instance.
pub type DriverFactory = Rc<dyn Fn() -> Box<dyn Backend>>;

/// Driver name → constructor map, resolving a session's `backend`/`uri`
/// configuration pair to a concrete [`Backend`] instance.
#[derive(Default, Clone)]
pub struct DriverRegistry {
    factories: IndexMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a driver under `name`, overwriting any prior registration.
    pub fn register(&mut self, name: impl Into<String>, factory: DriverFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Constructs a fresh backend instance for the named driver, or `None`
    /// if no driver is registered under that name.
    pub fn create(&self, name: &str) -> Option<Box<dyn Backend>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Names of every registered driver, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry").field("names", &self.names().collect::<Vec<_>>()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;
    use crate::backend::{PreparedStatement, ResultSink, Step};
    use object_store_core::field::FieldValue;

    struct NoopBackend;
    impl Backend for NoopBackend {
        fn open(&mut self, _uri: &str) -> Result<(), DriverError> {
            Ok(())
        }
        fn close(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn execute(&mut self, _sql: &str, _sink: &mut dyn ResultSink) -> Result<(), DriverError> {
            Ok(())
        }
        fn prepare(&mut self, _sql: &str) -> Result<Box<dyn PreparedStatement>, DriverError> {
            struct Noop;
            impl PreparedStatement for Noop {
                fn bind(&mut self, _i: usize, _v: &FieldValue) -> Result<(), DriverError> {
                    Ok(())
                }
                fn step(&mut self) -> Result<Step, DriverError> {
                    Ok(Step::Done)
                }
                fn reset(&mut self) -> Result<(), DriverError> {
                    Ok(())
                }
                fn finalize(self: Box<Self>) -> Result<(), DriverError> {
                    Ok(())
                }
            }
            Ok(Box::new(Noop))
        }
        fn begin(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn commit(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
        fn rollback(&mut self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[test]
    fn unregistered_driver_yields_none() {
        let registry = DriverRegistry::new();
        assert!(registry.create("sqlite").is_none());
    }

    #[test]
    fn registered_driver_constructs() {
        let mut registry = DriverRegistry::new();
        registry.register("noop", Rc::new(|| Box::new(NoopBackend) as Box<dyn Backend>));
        assert!(registry.create("noop").is_some());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["noop"]);
    }
}

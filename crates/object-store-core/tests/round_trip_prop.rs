//! Property tests for two universal invariants: round-trip serialization and
//! identity monotonicity. Unit-level coverage of both already lives next to
//! the implementation; these exercise them over a wide input space instead
//! of a handful of fixed cases.

use std::rc::Rc;

use proptest::prelude::*;

use object_store_core::entity::test_support::Person;
use object_store_core::entity::ManagedEntity;
use object_store_core::journal::NullObserver;
use object_store_core::record::Record;
use object_store_core::store::ObjectStore;

fn person_store() -> ObjectStore {
    let mut store = ObjectStore::new();
    store
        .attach("person", Rc::new(|| Box::new(Person::default()) as Box<dyn ManagedEntity>), None)
        .unwrap();
    store
}

proptest! {
    /// `deserialize(serialize(E)) == E` field-wise, for any name/age pair a
    /// `person` can hold.
    #[test]
    fn round_trip_is_field_wise_identical(name in "[a-zA-Z ]{0,32}", age in any::<i32>()) {
        let person = Person::new(0, &name, age);
        let record = Record::capture(&person).unwrap();

        let mut restored = Person::default();
        record.apply(&mut restored).unwrap();

        prop_assert_eq!(person, restored);
    }

    /// For any two inserts `i < j` in session order, `identity(i) < identity(j)`.
    #[test]
    fn identities_are_assigned_in_strictly_increasing_order(names in prop::collection::vec("[a-z]{1,8}", 1..20)) {
        let mut store = person_store();
        let mut obs = NullObserver;
        store.begin(&mut obs).unwrap();

        let mut prior = None;
        for name in names {
            let ptr = store.insert(Person::new(0, &name, 0)).unwrap();
            if let Some(prior_identity) = prior {
                prop_assert!(ptr.identity() > prior_identity);
            }
            prior = Some(ptr.identity());
        }
        store.commit(&mut obs).unwrap();
    }
}

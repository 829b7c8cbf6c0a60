//! # Mutation Combinator
//!
//! Lets any number of independent features attach serialize/deserialize
//! behavior to one block without clobbering previously attached behavior.
//!
//! ## Chaining semantics
//!
//! - Serialize: the new hook first obtains a base record from the previous
//!   chain (or starts empty), then hands it to the feature. Attribute sets
//!   only grow or override along the chain, never vanish.
//! - Deserialize: the previous chain runs first, then the feature. Earlier
//!   features always restore before later ones, so later features may assume
//!   earlier state is already in place.

use blockkit_model::{Block, MutationHooks, MutationRecord};
use std::rc::Rc;

/// One feature's serialize/deserialize pair, privately closing over that
/// feature's in-memory state
pub struct ComposableMutation {
    /// Extend the record with this feature's attributes and return it
    pub serialize: Box<dyn Fn(MutationRecord) -> MutationRecord>,

    /// Restore this feature's state from the record
    pub deserialize: Box<dyn Fn(&MutationRecord)>,
}

/// Attach a feature's persistence behavior to a block, chained after any
/// already-registered behavior. Replaces the block's hook pair.
pub fn append_mutation(block: &Block, mutation: ComposableMutation) {
    let previous = block.hooks();
    let feature = Rc::new(mutation);

    let serialize = {
        let previous = previous.as_ref().map(|hooks| hooks.serialize.clone());
        let feature = feature.clone();
        Rc::new(move || {
            let base = match &previous {
                Some(chain) => chain(),
                None => MutationRecord::new(),
            };
            (feature.serialize)(base)
        }) as Rc<dyn Fn() -> MutationRecord>
    };

    let deserialize = {
        let previous = previous.map(|hooks| hooks.deserialize);
        Rc::new(move |record: &MutationRecord| {
            if let Some(chain) = &previous {
                chain(record);
            }
            (feature.deserialize)(record);
        }) as Rc<dyn Fn(&MutationRecord)>
    };

    block.set_hooks(MutationHooks {
        serialize,
        deserialize,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockkit_model::Workspace;
    use std::cell::Cell;

    fn block() -> Block {
        Workspace::new().new_block("test_block")
    }

    #[test]
    fn test_single_feature_round_trip() {
        let b = block();
        let state = Rc::new(Cell::new(0i64));

        let write = state.clone();
        let read = state.clone();
        append_mutation(
            &b,
            ComposableMutation {
                serialize: Box::new(move |mut record| {
                    record.set("count", write.get().to_string());
                    record
                }),
                deserialize: Box::new(move |record| {
                    read.set(record.get_int("count").unwrap_or(0));
                }),
            },
        );

        state.set(7);
        let record = b.serialize();
        assert_eq!(record.get("count"), Some("7"));

        state.set(0);
        b.restore(&record);
        assert_eq!(state.get(), 7);
    }

    #[test]
    fn test_serialize_chain_accumulates_attributes() {
        let b = block();

        append_mutation(
            &b,
            ComposableMutation {
                serialize: Box::new(|mut record| {
                    record.set("first", "1");
                    record
                }),
                deserialize: Box::new(|_| {}),
            },
        );
        append_mutation(
            &b,
            ComposableMutation {
                serialize: Box::new(|mut record| {
                    record.set("second", "2");
                    record
                }),
                deserialize: Box::new(|_| {}),
            },
        );

        let record = b.serialize();
        assert_eq!(record.get("first"), Some("1"));
        assert_eq!(record.get("second"), Some("2"));

        // Earlier-attached attributes come first
        let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn test_deserializers_run_in_registration_order() {
        let b = block();
        let shared = Rc::new(Cell::new(0i64));

        // First feature restores x from the record
        let first = shared.clone();
        append_mutation(
            &b,
            ComposableMutation {
                serialize: Box::new(|record| record),
                deserialize: Box::new(move |record| {
                    first.set(record.get_int("x").unwrap_or(0));
                }),
            },
        );

        // Second feature observes the already-restored value and bumps it
        let second = shared.clone();
        append_mutation(
            &b,
            ComposableMutation {
                serialize: Box::new(|record| record),
                deserialize: Box::new(move |_| {
                    second.set(second.get() + 1);
                }),
            },
        );

        let mut record = MutationRecord::new();
        record.set("x", "1");
        b.restore(&record);

        assert_eq!(shared.get(), 2);
    }

    #[test]
    fn test_later_serializer_sees_prior_attributes() {
        let b = block();

        append_mutation(
            &b,
            ComposableMutation {
                serialize: Box::new(|mut record| {
                    record.set("x", "1");
                    record
                }),
                deserialize: Box::new(|_| {}),
            },
        );
        append_mutation(
            &b,
            ComposableMutation {
                serialize: Box::new(|mut record| {
                    let x = record.get_int("x").unwrap_or(0);
                    record.set("x", (x + 1).to_string());
                    record
                }),
                deserialize: Box::new(|_| {}),
            },
        );

        assert_eq!(b.serialize().get("x"), Some("2"));
    }
}

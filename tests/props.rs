mod common;

use common::{document, request};
use proptest::prelude::*;
use secfold::{
    create, Advisory, Document, Event, EventKind, Index, MemStore, Package, SCHEMA_VERSION,
};
use std::collections::BTreeSet;

fn arb_event_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Detection),
        Just(EventKind::TruePositiveDetermination { note: None }),
        Just(EventKind::FalsePositiveDetermination {
            note: Some("manual review".to_string())
        }),
        Just(EventKind::NotAffected { note: None }),
        Just(EventKind::PendingUpstreamFix { note: None }),
        Just(EventKind::FixNotPlanned { note: None }),
        "[0-9]\\.[0-9]\\.[0-9]".prop_map(|v| EventKind::Fixed { fixed_version: v }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    (1u64..1000, arb_event_kind()).prop_map(|(ts, kind)| Event::new(ts, kind))
}

fn arb_advisory_id() -> impl Strategy<Value = String> {
    "CVE-2024-[0-9]{4}"
}

fn arb_document() -> impl Strategy<Value = Document> {
    (
        "[a-z][a-z0-9-]{0,12}",
        proptest::collection::btree_set(arb_advisory_id(), 0..5),
        proptest::collection::vec(proptest::collection::vec(arb_event(), 1..6), 5),
    )
        .prop_map(|(name, ids, event_lists)| {
            // BTreeSet gives unique, sorted IDs — pair each with a
            // non-empty event list to satisfy the document invariants.
            let advisories = ids
                .into_iter()
                .zip(event_lists)
                .map(|(id, events)| Advisory {
                    id,
                    aliases: vec![],
                    events,
                })
                .collect();
            Document {
                schema_version: SCHEMA_VERSION.to_string(),
                package: Package { name },
                advisories,
            }
        })
}

// Folding the same history twice yields the same status.
proptest! {
    #[test]
    fn prop_fold_is_idempotent(events in proptest::collection::vec(arb_event(), 0..20)) {
        let advisory = Advisory {
            id: "CVE-2024-0001".to_string(),
            aliases: vec![],
            events,
        };
        prop_assert_eq!(advisory.resolved_status(), advisory.resolved_status());
    }
}

// The folded status is the status of the last event in stable timestamp
// order, and an empty history folds to no status at all.
proptest! {
    #[test]
    fn prop_fold_is_last_event_in_stable_order(events in proptest::collection::vec(arb_event(), 0..20)) {
        let advisory = Advisory {
            id: "CVE-2024-0001".to_string(),
            aliases: vec![],
            events,
        };

        let sorted = advisory.sorted_events();
        let expected = sorted.last().map(|e| e.kind.status());
        prop_assert_eq!(advisory.resolved_status(), expected);
    }
}

// sorted_events is stable: sorting an already-sorted history changes
// nothing, and same-timestamp events keep their insertion order.
proptest! {
    #[test]
    fn prop_sorted_events_is_stable(events in proptest::collection::vec(arb_event(), 0..20)) {
        let advisory = Advisory {
            id: "CVE-2024-0001".to_string(),
            aliases: vec![],
            events,
        };

        let once = advisory.sorted_events();
        let again = Advisory {
            id: advisory.id.clone(),
            aliases: vec![],
            events: once.clone(),
        }
        .sorted_events();
        prop_assert_eq!(once, again);
    }
}

// Serializing a valid document and reloading it yields the identical
// value, field for field.
proptest! {
    #[test]
    fn prop_document_round_trips_through_yaml(doc in arb_document()) {
        let yaml = serde_yaml::to_string(&doc).unwrap();
        let reloaded: Document = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(doc, reloaded);
    }
}

// Any sequence of successful create operations leaves every document
// with a sorted, duplicate-free advisory list at the current schema
// version.
proptest! {
    #[test]
    fn prop_creates_keep_advisories_sorted_and_unique(
        ops in proptest::collection::vec(
            ("[ab]", "CVE-2024-000[0-5]", arb_event()),
            1..20,
        )
    ) {
        let mut index = Index::load(MemStore::new()).unwrap();
        for (package, vulnerability_id, event) in ops {
            // Duplicate advisories are rejected; everything else lands.
            let _ = create(&request(&package, &vulnerability_id, event), &mut index);
        }

        let selection = index.select();
        for doc in selection.documents() {
            prop_assert_eq!(doc.schema_version.as_str(), SCHEMA_VERSION);
            let ids: Vec<&String> = doc.advisories.iter().map(|a| &a.id).collect();
            let unique: BTreeSet<&String> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), ids.len());
            let mut sorted = ids.clone();
            sorted.sort();
            prop_assert_eq!(ids, sorted);
        }
    }
}

// Ties on timestamp resolve to the most recently appended event.
#[test]
fn test_fold_tie_breaks_by_insertion_order() {
    let advisory = Advisory {
        id: "CVE-2024-0001".to_string(),
        aliases: vec![],
        events: vec![
            Event::new(100, EventKind::Fixed {
                fixed_version: "8.4.0".to_string(),
            }),
            Event::new(100, EventKind::FalsePositiveDetermination { note: None }),
        ],
    };
    assert_eq!(
        advisory.resolved_status(),
        Some(secfold::Status::FalsePositive)
    );

    let sorted = advisory.sorted_events();
    assert_eq!(sorted[0].kind, EventKind::Fixed {
        fixed_version: "8.4.0".to_string(),
    });
}

// A write bumps the schema version; reloading sees the upgraded value.
#[test]
fn test_round_trip_after_write_bumps_schema_version() {
    let store = MemStore::new();
    let mut index = Index::load(store.clone()).unwrap();
    let mut doc = document("curl", vec![]);
    doc.schema_version = "1".to_string();
    index.create("curl.advisories.yaml", doc).unwrap();

    // create persists the document as given...
    let mut reloaded = Index::load(store).unwrap();
    let selection = reloaded.select();
    assert_eq!(selection.documents().next().unwrap().schema_version, "1");

    // ...and the first update transaction upgrades it.
    let selection = reloaded.select().where_name("curl");
    reloaded
        .update(&selection, |d| Ok(d.advisories.clone()))
        .unwrap();
    let selection = reloaded.select();
    assert_eq!(
        selection.documents().next().unwrap().schema_version,
        SCHEMA_VERSION
    );
}

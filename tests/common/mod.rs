#![allow(dead_code)]

use secfold::{
    advisory_file_name, Advisory, Document, Event, EventKind, Finding, FindingPackage,
    FindingVulnerability, Index, MemStore, Package, Request, SCHEMA_VERSION,
};

pub fn detection(ts: u64) -> Event {
    Event::new(ts, EventKind::Detection)
}

pub fn fixed(ts: u64, version: &str) -> Event {
    Event::new(
        ts,
        EventKind::Fixed {
            fixed_version: version.to_string(),
        },
    )
}

pub fn false_positive(ts: u64) -> Event {
    Event::new(ts, EventKind::FalsePositiveDetermination { note: None })
}

pub fn advisory(id: &str, events: Vec<Event>) -> Advisory {
    Advisory {
        id: id.to_string(),
        aliases: vec![],
        events,
    }
}

pub fn document(package: &str, advisories: Vec<Advisory>) -> Document {
    Document {
        schema_version: SCHEMA_VERSION.to_string(),
        package: Package {
            name: package.to_string(),
        },
        advisories,
    }
}

pub fn request(package: &str, vulnerability_id: &str, event: Event) -> Request {
    Request {
        package: package.to_string(),
        vulnerability_id: vulnerability_id.to_string(),
        aliases: vec![],
        event,
    }
}

/// An index over an in-memory store seeded with the given documents.
pub fn seeded_index(documents: Vec<Document>) -> Index {
    let mut index = Index::load(MemStore::new()).unwrap();
    for doc in documents {
        let file_name = advisory_file_name(&doc.package.name);
        index.create(&file_name, doc).unwrap();
    }
    index
}

pub fn finding(package: &str, vulnerability_id: &str, aliases: Vec<&str>) -> Finding {
    Finding {
        package: FindingPackage {
            id: format!("{package}-1"),
            name: package.to_string(),
            version: "1.0.0".to_string(),
            kind: "apk".to_string(),
            location: format!("/lib/apk/db/{package}"),
        },
        vulnerability: FindingVulnerability {
            id: vulnerability_id.to_string(),
            aliases: aliases.into_iter().map(str::to_string).collect(),
            severity: "High".to_string(),
            fixed_version: None,
        },
    }
}

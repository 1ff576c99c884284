use crate::event::Event;
use crate::status::Status;
use serde::{Deserialize, Serialize};

/// The current document format version. Every write upgrades a document's
/// `schema_version` to this value; it is never downgraded.
pub const SCHEMA_VERSION: &str = "2";

const SCHEMA_VERSION_NUM: u32 = 2;

/// File name suffix shared by every advisory document in a storage root.
pub const DOCUMENT_SUFFIX: &str = ".advisories.yaml";

/// Derive the deterministic document file name for a package.
///
/// # Examples
///
/// ```
/// assert_eq!(secfold::advisory_file_name("curl"), "curl.advisories.yaml");
/// ```
pub fn advisory_file_name(package: &str) -> String {
    format!("{package}{DOCUMENT_SUFFIX}")
}

/// One package's advisory document — the persisted unit of storage.
///
/// At most one document exists per package within a store. The document
/// holds the package's full advisory history; nothing in it is ever
/// deleted, only appended to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Document {
    /// Document format version. Upgraded to [`SCHEMA_VERSION`] on every
    /// write.
    pub schema_version: String,

    pub package: Package,

    /// Kept sorted by advisory ID after every write; IDs are unique
    /// within a document.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
}

/// Identity of the package a document describes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    /// Unique key used for file naming and index lookup.
    pub name: String,
}

impl Document {
    /// Look up an advisory by its vulnerability ID.
    pub fn advisory(&self, id: &str) -> Option<&Advisory> {
        self.advisories.iter().find(|a| a.id == id)
    }

    /// Check the document's referential invariants.
    ///
    /// Returns a human-readable reason on failure; callers wrap it with
    /// file context. Enforced on every load and after every update
    /// transform: parseable schema version no newer than the current one,
    /// non-empty package name, advisory IDs unique and sorted, and no
    /// advisory with an empty event history.
    pub fn validate(&self) -> Result<(), String> {
        let version: u32 = self
            .schema_version
            .parse()
            .map_err(|_| format!("unparseable schema version {:?}", self.schema_version))?;
        if version == 0 || version > SCHEMA_VERSION_NUM {
            return Err(format!(
                "unsupported schema version {:?} (current is {SCHEMA_VERSION:?})",
                self.schema_version
            ));
        }

        if self.package.name.is_empty() {
            return Err("package name is empty".to_string());
        }

        for advisory in &self.advisories {
            if advisory.id.is_empty() {
                return Err("advisory with empty ID".to_string());
            }
            if advisory.events.is_empty() {
                return Err(format!("advisory {:?} has no events", advisory.id));
            }
        }

        for pair in self.advisories.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(format!("duplicate advisory {:?}", pair[0].id));
            }
            if pair[0].id > pair[1].id {
                return Err(format!(
                    "advisories are not sorted by ID ({:?} before {:?})",
                    pair[0].id, pair[1].id
                ));
            }
        }

        Ok(())
    }
}

/// The tracked history for one (package, vulnerability) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Advisory {
    /// Vulnerability identifier, e.g. a CVE- or GHSA-style string.
    pub id: String,

    /// Equivalent identifiers for the same vulnerability. Insertion order
    /// is irrelevant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Append-only event history. Never empty once the advisory exists.
    pub events: Vec<Event>,
}

impl Advisory {
    /// The event history sorted by timestamp.
    ///
    /// The sort is stable: events sharing a timestamp keep the order in
    /// which they were appended. The full history is retained for audit
    /// display; only the last event contributes to status.
    pub fn sorted_events(&self) -> Vec<Event> {
        let mut events = self.events.clone();
        events.sort_by_key(|e| e.ts);
        events
    }

    /// Fold the event history into the advisory's current status.
    ///
    /// The status is entirely determined by the latest event in stable
    /// timestamp order. Returns `None` for an empty history ("no
    /// information"), which every consumer must exclude rather than
    /// defaulting.
    ///
    /// # Examples
    ///
    /// ```
    /// use secfold::{Advisory, Event, EventKind, Status};
    ///
    /// let advisory = Advisory {
    ///     id: "CVE-2024-0001".to_string(),
    ///     aliases: vec![],
    ///     events: vec![
    ///         Event::new(100, EventKind::Fixed { fixed_version: "8.4.0".to_string() }),
    ///         Event::new(200, EventKind::FalsePositiveDetermination { note: None }),
    ///     ],
    /// };
    /// // The later event wins.
    /// assert_eq!(advisory.resolved_status(), Some(Status::FalsePositive));
    /// ```
    pub fn resolved_status(&self) -> Option<Status> {
        // max_by_key returns the last maximal element, so ties on `ts`
        // resolve to the most recently appended event, the same event
        // sorted_events() puts last.
        self.events
            .iter()
            .max_by_key(|e| e.ts)
            .map(|e| e.kind.status())
    }
}

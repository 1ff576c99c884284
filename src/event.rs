use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One recorded state transition in an advisory's history.
///
/// Events are append-only: once written to a document they are never
/// edited or removed, only superseded by later events. The timestamp is
/// used exclusively for ordering — the event with the greatest `ts`
/// determines the advisory's current status, with insertion order breaking
/// ties.
///
/// # Examples
///
/// ```
/// use secfold::{Event, EventKind};
///
/// let event = Event::new(1712000000, EventKind::Fixed {
///     fixed_version: "8.4.0".to_string(),
/// });
/// assert_eq!(event.ts, 1712000000);
///
/// // Or stamped with the current time:
/// let event = Event::now(EventKind::Detection);
/// assert!(event.ts > 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Unix timestamp in seconds. Used only for ordering, never for
    /// display formatting.
    pub ts: u64,

    /// What happened. The tag and its payload are validated together at
    /// the parse boundary — a `fixed` event without a version, or an
    /// unrecognized tag, fails document parsing.
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    /// Create an event with an explicit timestamp.
    pub fn new(ts: u64, kind: EventKind) -> Self {
        Event { ts, kind }
    }

    /// Create an event stamped with the current time.
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set before the Unix epoch.
    pub fn now(kind: EventKind) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        Event { ts, kind }
    }
}

/// The closed set of event kinds an advisory history can record.
///
/// Serialized with a `type` tag (kebab-case) and the payload fields
/// inlined, so a fixed event looks like:
///
/// ```yaml
/// ts: 1712000000
/// type: fixed
/// fixed-version: 8.4.0
/// ```
///
/// Determination kinds carry an optional free-form `note` justifying the
/// determination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EventKind {
    /// The vulnerability was matched against this package and is awaiting
    /// triage.
    Detection,

    /// A human confirmed the package is genuinely affected.
    TruePositiveDetermination {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// A human determined the match is not a real vulnerability in this
    /// package.
    FalsePositiveDetermination {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// The vulnerable code is present but not reachable or not used.
    NotAffected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// A fix exists upstream but has not shipped in this distribution yet.
    PendingUpstreamFix {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// No fix is planned for this package.
    FixNotPlanned {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// A fix shipped in the named package version.
    Fixed {
        #[serde(rename = "fixed-version")]
        fixed_version: String,
    },
}

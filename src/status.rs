//! Folding an advisory's event history into its current status.

use crate::event::EventKind;

/// The current remediation status of an advisory, derived from its event
/// history.
///
/// Status is never stored. The security database exporter and the
/// scan-result filter both re-derive it by folding the event history on
/// every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// A fix shipped in the named package version. The package is affected
    /// until that version and fixed thereafter.
    Fixed { version: String },

    /// Not a real vulnerability in this package.
    FalsePositive,

    /// The vulnerable code is present but the package is not affected.
    NotAffected,

    /// Confirmed affected, no fix shipped yet.
    Affected,

    /// Detected and awaiting triage.
    UnderInvestigation,

    /// A fix exists upstream but has not shipped here yet.
    PendingUpstreamFix,

    /// No fix will ship for this package.
    FixNotPlanned,
}

impl Status {
    /// Whether this status belongs to the "not a real vulnerability"
    /// group, exported under the NAK marker rather than a version key.
    pub fn is_negated(&self) -> bool {
        matches!(self, Status::FalsePositive | Status::NotAffected)
    }
}

impl EventKind {
    /// The status an advisory has when this kind is its latest event.
    ///
    /// This is the single kind-to-status table: adding an event kind means
    /// adding one arm here, and the fold logic is untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use secfold::{EventKind, Status};
    ///
    /// let kind = EventKind::Fixed { fixed_version: "8.4.0".to_string() };
    /// assert_eq!(kind.status(), Status::Fixed { version: "8.4.0".to_string() });
    ///
    /// let kind = EventKind::FalsePositiveDetermination { note: None };
    /// assert_eq!(kind.status(), Status::FalsePositive);
    /// ```
    pub fn status(&self) -> Status {
        match self {
            EventKind::Detection => Status::UnderInvestigation,
            EventKind::TruePositiveDetermination { .. } => Status::Affected,
            EventKind::FalsePositiveDetermination { .. } => Status::FalsePositive,
            EventKind::NotAffected { .. } => Status::NotAffected,
            EventKind::PendingUpstreamFix { .. } => Status::PendingUpstreamFix,
            EventKind::FixNotPlanned { .. } => Status::FixNotPlanned,
            EventKind::Fixed { fixed_version } => Status::Fixed {
                version: fixed_version.clone(),
            },
        }
    }
}

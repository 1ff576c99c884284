use crate::document::Advisory;
use crate::error::{Error, Result};
use crate::event::Event;

/// A fully specified ask to record one event for one (package,
/// vulnerability) pair.
///
/// Requests arrive pre-assembled from an outer layer (an interactive
/// prompt, a CLI flag surface); this crate only validates and applies
/// them.
///
/// # Examples
///
/// ```
/// use secfold::{Event, EventKind, Request};
///
/// let req = Request {
///     package: "curl".to_string(),
///     vulnerability_id: "CVE-2024-0001".to_string(),
///     aliases: vec!["GHSA-q2f9-xxxx-xxxx".to_string()],
///     event: Event::new(1712000000, EventKind::Fixed {
///         fixed_version: "8.4.0".to_string(),
///     }),
/// };
/// assert!(req.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Name of the package the advisory concerns.
    pub package: String,

    /// Vulnerability identifier, e.g. a CVE- or GHSA-style string.
    pub vulnerability_id: String,

    /// Equivalent identifiers for the same vulnerability.
    pub aliases: Vec<String>,

    /// The event to record.
    pub event: Event,
}

impl Request {
    /// Validate the request, reporting every missing or invalid field.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRequest`] listing all failures at once, so an
    /// interactive caller can prompt for everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut reasons = Vec::new();

        if self.package.is_empty() {
            reasons.push("package name must not be empty".to_string());
        }
        if self.vulnerability_id.is_empty() {
            reasons.push("vulnerability ID must not be empty".to_string());
        }
        if self.aliases.iter().any(|a| a.is_empty()) {
            reasons.push("aliases must not contain empty strings".to_string());
        }
        if self.event.ts == 0 {
            reasons.push("event timestamp must be set".to_string());
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidRequest { reasons })
        }
    }

    /// Build the advisory this request describes: one advisory holding
    /// the request's event as its entire history.
    pub fn new_advisory(&self) -> Advisory {
        Advisory {
            id: self.vulnerability_id.clone(),
            aliases: self.aliases.clone(),
            events: vec![self.event.clone()],
        }
    }
}

//! Suppressing scan findings that advisories already account for.

use crate::document::Advisory;
use crate::error::Error;
use crate::index::Index;
use crate::status::Status;
use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A vulnerability finding as supplied by an external scan engine.
///
/// The crate never performs vulnerability matching itself — findings
/// arrive fully formed and are only filtered against advisory state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    pub package: FindingPackage,
    pub vulnerability: FindingVulnerability,
}

/// The scanned package a finding was matched in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindingPackage {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Where in the scanned artifact the package was found.
    pub location: String,
}

/// The vulnerability side of a finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindingVulnerability {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_version: Option<String>,
}

/// Which advisory statuses cause a matching finding to be excluded.
///
/// The set of policies is a closed whitelist; parse a caller-supplied
/// name with [`FromStr`] before filtering so an unrecognized name is a
/// configuration error, never a silent no-op.
///
/// # Examples
///
/// ```
/// use secfold::FilterSet;
///
/// let set: FilterSet = "fixed".parse().unwrap();
/// assert_eq!(set, FilterSet::Fixed);
///
/// assert!("nonsense".parse::<FilterSet>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSet {
    /// Exclude nothing; every finding is retained.
    None,
    /// Exclude findings whose advisory status is a shipped fix.
    Fixed,
    /// Exclude findings whose advisory status is a shipped fix, a false
    /// positive, or a not-affected determination.
    Resolved,
}

impl FilterSet {
    /// Every valid filter set, in the order their names are documented.
    pub const ALL: [FilterSet; 3] = [FilterSet::None, FilterSet::Fixed, FilterSet::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterSet::None => "none",
            FilterSet::Fixed => "fixed",
            FilterSet::Resolved => "resolved",
        }
    }

    fn excludes(&self, status: &Status) -> bool {
        match self {
            FilterSet::None => false,
            FilterSet::Fixed => matches!(status, Status::Fixed { .. }),
            FilterSet::Resolved => matches!(status, Status::Fixed { .. }) || status.is_negated(),
        }
    }
}

impl FromStr for FilterSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterSet::ALL
            .into_iter()
            .find(|set| set.as_str() == s)
            .ok_or_else(|| Error::UnknownFilterSet {
                name: s.to_string(),
            })
    }
}

/// Drop findings whose current advisory status falls in the excluded
/// `set`, keeping everything else in input order.
///
/// For each finding, every index is searched for a document matching the
/// finding's package name and an advisory whose ID or aliases intersect
/// the finding's vulnerability ID and aliases. Findings with no matching
/// advisory anywhere — or a matching advisory with an empty event
/// history — are always kept.
pub fn filter_findings(findings: Vec<Finding>, indices: &[Index], set: FilterSet) -> Vec<Finding> {
    findings
        .into_iter()
        .filter(|finding| {
            let Some(advisory) = advisory_for(finding, indices) else {
                return true;
            };
            let Some(status) = advisory.resolved_status() else {
                return true;
            };
            if set.excludes(&status) {
                debug!(
                    "excluding finding {} in package {:?} (status {status:?})",
                    finding.vulnerability.id, finding.package.name
                );
                return false;
            }
            true
        })
        .collect()
}

fn advisory_for<'a>(finding: &Finding, indices: &'a [Index]) -> Option<&'a Advisory> {
    indices
        .iter()
        .flat_map(|index| index.documents())
        .filter(|document| document.package.name == finding.package.name)
        .find_map(|document| {
            document
                .advisories
                .iter()
                .find(|advisory| matches_vulnerability(advisory, &finding.vulnerability))
        })
}

fn matches_vulnerability(advisory: &Advisory, vulnerability: &FindingVulnerability) -> bool {
    advisory.id == vulnerability.id
        || advisory.aliases.iter().any(|a| *a == vulnerability.id)
        || vulnerability.aliases.iter().any(|a| *a == advisory.id)
}

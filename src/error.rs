use std::io;

/// Alias for `Result` with the crate's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by advisory store operations.
///
/// Nothing here is retried internally — transient I/O failures propagate
/// as-is and retry policy belongs to the caller.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A caller-supplied request failed validation. Lists every missing or
    /// invalid field, not just the first.
    #[error("invalid advisory request: {}", .reasons.join("; "))]
    InvalidRequest { reasons: Vec<String> },

    /// No document matched where exactly one was expected.
    #[error("document not found: {0}")]
    NotFound(String),

    /// More than one document matched a package name. The store guarantees
    /// at most one document per package, so this indicates external
    /// corruption of the storage root.
    #[error("found {count} advisory documents for package {package:?}, expected exactly one")]
    AmbiguousPackage { package: String, count: usize },

    /// Attempted to create a document under a file name that is already
    /// addressable in the index.
    #[error("document {file_name:?} already exists")]
    AlreadyExists { file_name: String },

    /// Attempted to create an advisory that already exists for the package.
    #[error("advisory {vulnerability:?} already exists for package {package:?}")]
    DuplicateAdvisory {
        package: String,
        vulnerability: String,
    },

    /// Attempted to update an advisory that does not exist for the package.
    #[error("advisory {vulnerability:?} does not exist for package {package:?}")]
    AdvisoryNotFound {
        package: String,
        vulnerability: String,
    },

    /// On-disk content failed to parse or validate. Fatal for the named
    /// file; loading of other documents is unaffected.
    #[error("malformed advisory document {file_name:?}: {reason}")]
    MalformedDocument { file_name: String, reason: String },

    /// A document failed invariant validation after an update transform.
    /// The on-disk file is left untouched.
    #[error("document {file_name:?} failed validation after update: {reason}")]
    Conflict { file_name: String, reason: String },

    /// An advisory index contributed zero package entries to a security
    /// database build. Guards against exporting from an empty or
    /// misconfigured advisories root.
    #[error("no package security data found")]
    NoSecurityData,

    /// An advisory filter set name was not recognized.
    #[error("unknown advisory filter set {name:?}, must be one of [none, fixed, resolved]")]
    UnknownFilterSet { name: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    /// Document (de)serialization failed.
    #[error("document serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Security database serialization failed.
    #[error("security database serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

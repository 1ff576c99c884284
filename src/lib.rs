mod document;
mod edit;
mod error;
mod event;
mod filter;
mod index;
mod request;
mod secdb;
mod status;
mod store;

pub use document::{
    advisory_file_name, Advisory, Document, Package, DOCUMENT_SUFFIX, SCHEMA_VERSION,
};
pub use edit::{create, update};
pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use filter::{filter_findings, FilterSet, Finding, FindingPackage, FindingVulnerability};
pub use index::{Index, Selection};
pub use request::Request;
pub use secdb::{
    build_database, BuildOptions, Database, PackageEntry, PackageSecfixes, Secfixes, NAK,
};
pub use status::Status;
pub use store::{DirStore, DocumentStore, LockMode, MemStore};

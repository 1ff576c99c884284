//! The two mutation entry points layered on the index.
//!
//! Both operations re-validate their request cheaply, but neither is
//! idempotent at the storage layer: applying the same update twice
//! appends its event twice. Callers are responsible for not
//! double-submitting.

use crate::document::{advisory_file_name, Advisory, Document, Package, SCHEMA_VERSION};
use crate::error::{Error, Result};
use crate::index::Index;
use crate::request::Request;

/// Record a new advisory for a package.
///
/// If no document exists for the package yet, a new one is created under
/// the deterministic file name with the request's advisory as its only
/// entry. If exactly one document exists, the advisory is appended to it
/// in a single update transaction.
///
/// # Errors
///
/// [`Error::DuplicateAdvisory`] if an advisory with this vulnerability ID
/// already exists for the package; [`Error::AmbiguousPackage`] if more
/// than one document matches the package name.
///
/// # Examples
///
/// ```
/// use secfold::{create, Event, EventKind, Index, MemStore, Request};
///
/// let mut index = Index::load(MemStore::new()).unwrap();
/// let req = Request {
///     package: "curl".to_string(),
///     vulnerability_id: "CVE-2024-0001".to_string(),
///     aliases: vec![],
///     event: Event::new(1712000000, EventKind::Fixed {
///         fixed_version: "8.4.0".to_string(),
///     }),
/// };
/// create(&req, &mut index).unwrap();
/// assert_eq!(index.select().where_name("curl").len(), 1);
/// ```
pub fn create(req: &Request, index: &mut Index) -> Result<()> {
    req.validate()?;

    let selection = index.select().where_name(&req.package);
    match selection.len() {
        0 => {
            // No advisories file for this package yet.
            let document = Document {
                schema_version: SCHEMA_VERSION.to_string(),
                package: Package {
                    name: req.package.clone(),
                },
                advisories: vec![req.new_advisory()],
            };
            index.create(&advisory_file_name(&req.package), document)
        }
        1 => index.update(&selection, |doc| {
            if doc.advisory(&req.vulnerability_id).is_some() {
                return Err(Error::DuplicateAdvisory {
                    package: req.package.clone(),
                    vulnerability: req.vulnerability_id.clone(),
                });
            }

            let mut advisories = doc.advisories.clone();
            advisories.push(req.new_advisory());
            sort_by_id(&mut advisories);
            Ok(advisories)
        }),
        count => Err(Error::AmbiguousPackage {
            package: req.package.clone(),
            count,
        }),
    }
}

/// Append a new event to an existing advisory.
///
/// Requires exactly one document for the package and an existing advisory
/// named by the request's vulnerability ID. The event list is append-only:
/// existing events are untouched and keep their order.
///
/// # Errors
///
/// [`Error::NotFound`] if no document exists for the package;
/// [`Error::AmbiguousPackage`] on more than one;
/// [`Error::AdvisoryNotFound`] if the advisory does not exist.
pub fn update(req: &Request, index: &mut Index) -> Result<()> {
    req.validate()?;

    let selection = index.select().where_name(&req.package);
    match selection.len() {
        0 => Err(Error::NotFound(format!(
            "no advisory document for package {:?}",
            req.package
        ))),
        1 => index.update(&selection, |doc| {
            let Some(advisory) = doc.advisory(&req.vulnerability_id) else {
                return Err(Error::AdvisoryNotFound {
                    package: req.package.clone(),
                    vulnerability: req.vulnerability_id.clone(),
                });
            };

            let mut advisory = advisory.clone();
            advisory.events.push(req.event.clone());

            let mut advisories: Vec<Advisory> = doc
                .advisories
                .iter()
                .filter(|a| a.id != req.vulnerability_id)
                .cloned()
                .collect();
            advisories.push(advisory);
            sort_by_id(&mut advisories);
            Ok(advisories)
        }),
        count => Err(Error::AmbiguousPackage {
            package: req.package.clone(),
            count,
        }),
    }
}

fn sort_by_id(advisories: &mut [Advisory]) {
    advisories.sort_by(|a, b| a.id.cmp(&b.id));
}

//! Building an Alpine-style security database from advisory indices.

use crate::error::{Error, Result};
use crate::index::Index;
use crate::status::Status;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// Secfixes marker for vulnerabilities that are not real vulnerabilities
/// in the package ("NAK"): false positives and not-affected
/// determinations group under this key instead of a version.
pub const NAK: &str = "0";

const APK_URL: &str = "{{urlprefix}}/{{reponame}}/{{arch}}/{{pkg.name}}-{{pkg.ver}}.apk";

/// Map of fixed version (or [`NAK`]) to the vulnerability IDs resolved at
/// that version. `BTreeMap` keeps key order stable across builds.
pub type Secfixes = BTreeMap<String, Vec<String>>;

/// Options for [`build_database`].
pub struct BuildOptions<'a> {
    /// The advisory document indices to export, in order. Entries from
    /// all indices are concatenated into one database.
    pub indices: &'a [Index],

    /// URL prefix substituted into the APK URL template.
    pub url_prefix: String,

    /// Package architectures the repository publishes.
    pub archs: Vec<String>,

    /// Repository name.
    pub repo: String,
}

/// The exported security database artifact.
#[derive(Debug, Serialize)]
pub struct Database {
    #[serde(rename = "apkurl")]
    pub apk_url: String,
    pub archs: Vec<String>,
    #[serde(rename = "reponame")]
    pub repo: String,
    #[serde(rename = "urlprefix")]
    pub url_prefix: String,
    pub packages: Vec<PackageEntry>,
}

#[derive(Debug, Serialize)]
pub struct PackageEntry {
    pub pkg: PackageSecfixes,
}

#[derive(Debug, Serialize)]
pub struct PackageSecfixes {
    pub name: String,
    pub secfixes: Secfixes,
}

/// Build a security database from the given indices, serialized as
/// pretty-printed JSON with stable key order.
///
/// Every advisory is folded to its current status: `fixed` statuses group
/// the vulnerability ID under the fixed version, false-positive-category
/// statuses group it under [`NAK`], and anything still unresolved
/// contributes nothing. Advisories with no events are skipped, as are
/// documents contributing an empty secfixes map.
///
/// # Errors
///
/// [`Error::NoSecurityData`] if any index contributes zero package
/// entries — a safety check against exporting from an empty or
/// misconfigured advisories root.
pub fn build_database(opts: &BuildOptions) -> Result<Vec<u8>> {
    let mut packages = Vec::new();

    for index in opts.indices {
        let mut index_packages = Vec::new();

        for document in index.documents() {
            if document.advisories.is_empty() {
                continue;
            }

            let mut secfixes = Secfixes::new();
            for advisory in &document.advisories {
                if advisory.events.is_empty() {
                    warn!(
                        "advisory {:?} for package {:?} has no events, skipping",
                        advisory.id, document.package.name
                    );
                    continue;
                }

                match advisory.resolved_status() {
                    Some(Status::Fixed { version }) => {
                        secfixes.entry(version).or_default().push(advisory.id.clone());
                    }
                    Some(status) if status.is_negated() => {
                        secfixes
                            .entry(NAK.to_string())
                            .or_default()
                            .push(advisory.id.clone());
                    }
                    _ => {}
                }
            }

            if secfixes.is_empty() {
                continue;
            }

            for ids in secfixes.values_mut() {
                ids.sort();
                ids.dedup();
            }

            index_packages.push(PackageEntry {
                pkg: PackageSecfixes {
                    name: document.package.name.clone(),
                    secfixes,
                },
            });
        }

        if index_packages.is_empty() {
            // Catch the unexpected case where an advisories root contains
            // no security data at all.
            return Err(Error::NoSecurityData);
        }

        packages.extend(index_packages);
    }

    let database = Database {
        apk_url: APK_URL.to_string(),
        archs: opts.archs.clone(),
        repo: opts.repo.clone(),
        url_prefix: opts.url_prefix.clone(),
        packages,
    };

    Ok(serde_json::to_vec_pretty(&database)?)
}

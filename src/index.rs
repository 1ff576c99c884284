use crate::document::{Advisory, Document, DOCUMENT_SUFFIX, SCHEMA_VERSION};
use crate::error::{Error, Result};
use crate::store::DocumentStore;
use log::debug;

/// The addressable, queryable collection of all advisory documents under
/// a storage root.
///
/// The index mediates every read and write so document invariants hold:
/// queries go through an immutable [`Selection`] snapshot, and mutations
/// go through [`create`](Index::create) or the transactional
/// [`update`](Index::update), which re-reads the authoritative on-disk
/// content before rewriting it.
///
/// # Examples
///
/// ```
/// use secfold::{Index, MemStore};
///
/// let index = Index::load(MemStore::new()).unwrap();
/// assert!(index.select().is_empty());
/// ```
pub struct Index {
    store: Box<dyn DocumentStore>,
    entries: Vec<Entry>,
}

struct Entry {
    file_name: String,
    document: Document,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field(
                "files",
                &self.entries.iter().map(|e| &e.file_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Index {
    /// Scan the store for advisory documents and parse each one.
    ///
    /// Only files ending in `.advisories.yaml` are considered. A file
    /// that fails to parse or validate fails the load with
    /// [`Error::MalformedDocument`] naming it.
    pub fn load(store: impl DocumentStore + 'static) -> Result<Self> {
        let store: Box<dyn DocumentStore> = Box::new(store);

        let mut entries = Vec::new();
        for file_name in store.list()? {
            if !file_name.ends_with(DOCUMENT_SUFFIX) {
                continue;
            }
            let document = parse_document(&store.read(&file_name)?, &file_name)?;
            entries.push(Entry {
                file_name,
                document,
            });
        }
        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!("indexed {} advisory documents", entries.len());

        Ok(Index { store, entries })
    }

    /// An immutable snapshot of every document in the index.
    pub fn select(&self) -> Selection {
        Selection {
            items: self
                .entries
                .iter()
                .map(|e| SelectedDocument {
                    file_name: e.file_name.clone(),
                    document: e.document.clone(),
                })
                .collect(),
        }
    }

    /// Iterate the indexed documents without snapshotting.
    ///
    /// Read-only consumers (export, filtering) use this to fold over
    /// every advisory without cloning the collection.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().map(|e| &e.document)
    }

    /// Persist a new document and add it to the index.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyExists`] if a document is already addressable by
    /// `file_name`; [`Error::Conflict`] if the document fails invariant
    /// validation.
    pub fn create(&mut self, file_name: &str, document: Document) -> Result<()> {
        if self.entries.iter().any(|e| e.file_name == file_name) || self.store.exists(file_name) {
            return Err(Error::AlreadyExists {
                file_name: file_name.to_string(),
            });
        }

        document.validate().map_err(|reason| Error::Conflict {
            file_name: file_name.to_string(),
            reason,
        })?;

        self.store
            .write_atomic(file_name, &serde_yaml::to_string(&document)?)?;
        debug!("created advisory document {file_name:?}");

        let entry = Entry {
            file_name: file_name.to_string(),
            document,
        };
        let at = self
            .entries
            .partition_point(|e| e.file_name.as_str() < file_name);
        self.entries.insert(at, entry);
        Ok(())
    }

    /// Rewrite the advisories section of every document in `selection`
    /// through `transform`, as one transaction per document.
    ///
    /// For each selected file the authoritative on-disk content is
    /// re-read, `transform` produces the new advisories section, the
    /// schema version is upgraded to the current version, invariants are
    /// re-validated, and the file is replaced atomically — either the
    /// full new document lands or the old one is untouched.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the selection is empty; [`Error::Conflict`]
    /// if validation fails after the transform; any error returned by
    /// `transform` propagates unchanged.
    pub fn update<F>(&mut self, selection: &Selection, transform: F) -> Result<()>
    where
        F: Fn(&Document) -> Result<Vec<Advisory>>,
    {
        if selection.is_empty() {
            return Err(Error::NotFound(
                "selection is empty, nothing to update".to_string(),
            ));
        }

        for selected in &selection.items {
            let file_name = selected.file_name.as_str();
            let mut document = parse_document(&self.store.read(file_name)?, file_name)?;

            document.advisories = transform(&document)?;
            document.schema_version = SCHEMA_VERSION.to_string();

            document.validate().map_err(|reason| Error::Conflict {
                file_name: file_name.to_string(),
                reason,
            })?;

            self.store
                .write_atomic(file_name, &serde_yaml::to_string(&document)?)?;
            debug!("updated advisory document {file_name:?}");

            if let Some(entry) = self.entries.iter_mut().find(|e| e.file_name == file_name) {
                entry.document = document;
            }
        }

        Ok(())
    }
}

fn parse_document(contents: &str, file_name: &str) -> Result<Document> {
    let document: Document =
        serde_yaml::from_str(contents).map_err(|e| Error::MalformedDocument {
            file_name: file_name.to_string(),
            reason: e.to_string(),
        })?;
    document.validate().map_err(|reason| Error::MalformedDocument {
        file_name: file_name.to_string(),
        reason,
    })?;
    Ok(document)
}

/// A filtered, read-only snapshot over an index's documents.
///
/// Selections are cheap to query repeatedly and hold no reference to the
/// index, so a selection taken before an update names the same files the
/// update will re-read from disk.
#[derive(Debug, Clone)]
pub struct Selection {
    items: Vec<SelectedDocument>,
}

#[derive(Debug, Clone)]
struct SelectedDocument {
    file_name: String,
    document: Document,
}

impl Selection {
    /// Narrow the selection to documents whose package name matches
    /// exactly.
    pub fn where_name(self, name: &str) -> Selection {
        Selection {
            items: self
                .items
                .into_iter()
                .filter(|s| s.document.package.name == name)
                .collect(),
        }
    }

    /// Number of documents in the selection.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The selected documents, in file-name order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.items.iter().map(|s| &s.document)
    }
}

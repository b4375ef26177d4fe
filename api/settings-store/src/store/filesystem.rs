//! This implementation of the DocumentStore trait relies on the filesystem for storage.
//!
//! Each collection is a directory under the base path, and each document is a file in it holding
//! one pretty-printed JSON object, e.g. BASE/settings/s%23mysql.json for document "s#mysql" in
//! collection "settings".  Document ids are percent-encoded so that any id maps to a single,
//! safe filename.
//!
//! Documents are written to a temporary file and renamed into place, so readers never see a
//! partial document.  Inserts rename without clobbering, so two writers can't both create the
//! same document.  Guarded read-modify-write sequences hold an exclusive flock on the
//! collection's lock file, so they're serialized across store instances and processes.

use lazy_static::lazy_static;
use nix::fcntl::{flock, FlockArg};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use snafu::{ensure, OptionExt, ResultExt};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

use super::{
    effect_of, error, Assert, DocumentStore, Effect, Fields, Result, TxnOp, TxnOutcome, Value,
};

/// Characters left alone when turning a document id into a filename; everything else, including
/// dots and path separators, is percent-encoded.
const ID_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

const DOCUMENT_EXTENSION: &str = ".json";

/// Held exclusively while a guarded operation runs.  Encoded document filenames can't start
/// with a dot, so this never collides with a document.
const LOCK_FILENAME: &str = ".lock";

/// Maximum filename length on the filesystems we care about.
const MAX_FILENAME_LENGTH: usize = 255;

lazy_static! {
    /// Pattern to validate a collection name, which becomes a directory name.
    static ref COLLECTION_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

#[derive(Debug)]
pub struct FilesystemDocumentStore {
    base_path: PathBuf,
    txn_lock: Mutex<()>,
}

impl FilesystemDocumentStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> FilesystemDocumentStore {
        FilesystemDocumentStore {
            base_path: base_path.as_ref().to_path_buf(),
            txn_lock: Mutex::new(()),
        }
    }

    /// Returns the directory holding the documents of the given collection.
    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        ensure!(
            COLLECTION_NAME.is_match(collection),
            error::InvalidCollection { name: collection }
        );
        Ok(self.base_path.join(collection))
    }

    /// Returns the path of the file holding the given document.
    fn document_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        let filename = utf8_percent_encode(id, ID_ENCODE_SET).to_string() + DOCUMENT_EXTENSION;
        ensure!(
            !id.is_empty() && filename.len() <= MAX_FILENAME_LENGTH,
            error::InvalidDocumentId {
                id,
                max: MAX_FILENAME_LENGTH,
            }
        );
        Ok(self.collection_path(collection)?.join(filename))
    }
}

// Filesystem read/write helpers

/// Takes an exclusive lock on the given collection directory, creating it if needed.  The lock
/// is released when the returned File is dropped.
fn lock_collection(dir: &Path) -> Result<File> {
    fs::create_dir_all(dir).context(error::Io { path: dir })?;
    let lock_path = dir.join(LOCK_FILENAME);
    let lock_file = OpenOptions::new()
        .create(true)
        .write(true)
        .open(&lock_path)
        .context(error::Io { path: &lock_path })?;
    flock(lock_file.as_raw_fd(), FlockArg::LockExclusive)
        .context(error::Lock { path: &lock_path })?;
    Ok(lock_file)
}

/// Helper for reading a document from the filesystem.  Returns Ok(None) if the file doesn't
/// exist rather than erroring.
fn read_document(path: &Path) -> Result<Option<Fields>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            if e.kind() == io::ErrorKind::NotFound {
                return Ok(None);
            }
            return Err(e).context(error::Io { path });
        }
    };

    match serde_json::from_str::<Value>(&data).context(error::Json { path })? {
        Value::Object(map) => Ok(Some(map.into_iter().collect())),
        _ => error::NotAnObject { path }.fail(),
    }
}

/// Helper for atomically writing a document, making the collection directory beforehand if
/// necessary.  If `clobber` is false and the document already exists, nothing is written and
/// Ok(false) is returned.
fn write_document(path: &Path, doc: &Fields, clobber: bool) -> Result<bool> {
    let dirname = path.parent().context(error::Corruption {
        msg: "Document path has no parent directory",
        path,
    })?;
    fs::create_dir_all(dirname).context(error::Io { path: dirname })?;

    let mut writer = NamedTempFile::new_in(dirname).context(error::TempCreate { path: dirname })?;
    serde_json::to_writer_pretty(&mut writer, doc).context(error::Serialize { path })?;
    writer.write_all(b"\n").context(error::Io { path })?;

    let persisted = if clobber {
        writer.persist(path)
    } else {
        writer.persist_noclobber(path)
    };
    match persisted {
        Ok(_) => Ok(true),
        Err(e) if !clobber && e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e).context(error::Persist { path }),
    }
}

impl DocumentStore for FilesystemDocumentStore {
    fn fetch(&self, collection: &str, id: &str) -> Result<Option<Fields>> {
        let path = self.document_path(collection, id)?;
        trace!("Reading document from {}", path.display());
        read_document(&path)
    }

    fn run_guarded(&self, collection: &str, id: &str, op: &TxnOp) -> Result<TxnOutcome> {
        let path = self.document_path(collection, id)?;
        let _txn = self.txn_lock.lock().map_err(|_| error::Error::Poisoned {})?;
        let _collection_lock = lock_collection(&self.collection_path(collection)?)?;

        let current = read_document(&path)?;
        let outcome = match effect_of(id, current.as_ref(), op) {
            Effect::Aborted => TxnOutcome::Aborted,
            Effect::Put(doc) => {
                // Only an insert may find the file already there, if another process created it
                // since we looked.
                let clobber = op.assertion() == Assert::DocExists;
                if write_document(&path, &doc, clobber)? {
                    TxnOutcome::Applied
                } else {
                    TxnOutcome::Aborted
                }
            }
            Effect::Delete => match fs::remove_file(&path) {
                Ok(()) => TxnOutcome::Applied,
                Err(e) if e.kind() == io::ErrorKind::NotFound => TxnOutcome::Aborted,
                Err(e) => return Err(e).context(error::Io { path }),
            },
        };

        debug!(
            "Ran {} of '{}' in '{}': {:?}",
            op.name(),
            id,
            collection,
            outcome
        );
        Ok(outcome)
    }
}

//! Resolution of uploaded-file references to local paths

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::errors::ImportError;

const PUBLIC_PREFIX: &str = "/files/";
const PRIVATE_PREFIX: &str = "/private/files/";

/// Turns a file reference from the desk UI into a readable path
pub trait FileStore: Send + Sync {
    fn resolve(&self, file_url: &str) -> Result<PathBuf, ImportError>;
}

/// Site file storage: public uploads under `/files/...`, private uploads
/// under `/private/files/...`. Any other reference is taken as a plain path.
#[derive(Debug, Clone)]
pub struct SiteFileStore {
    public_dir: PathBuf,
    private_dir: PathBuf,
}

impl SiteFileStore {
    pub fn new(public_dir: impl Into<PathBuf>, private_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
            private_dir: private_dir.into(),
        }
    }

    fn locate(&self, file_url: &str) -> Result<PathBuf, ImportError> {
        let invalid = || ImportError::InvalidFileReference(file_url.to_string());

        let (base, relative) = if let Some(rest) = file_url.strip_prefix(PRIVATE_PREFIX) {
            (Some(&self.private_dir), rest)
        } else if let Some(rest) = file_url.strip_prefix(PUBLIC_PREFIX) {
            (Some(&self.public_dir), rest)
        } else {
            (None, file_url)
        };

        let relative = urlencoding::decode(relative).map_err(|_| invalid())?;
        if relative.is_empty() {
            return Err(invalid());
        }
        let relative = Path::new(relative.as_ref());
        if relative.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(invalid());
        }

        match base {
            // joining an absolute path would escape the storage directory
            Some(_) if relative.is_absolute() => Err(invalid()),
            Some(dir) => Ok(dir.join(relative)),
            None => Ok(relative.to_path_buf()),
        }
    }
}

impl FileStore for SiteFileStore {
    fn resolve(&self, file_url: &str) -> Result<PathBuf, ImportError> {
        let file_url = file_url.trim();
        if file_url.is_empty() {
            return Err(ImportError::InvalidFileReference(file_url.to_string()));
        }

        let path = self.locate(file_url)?;
        debug!("Resolved {} to {}", file_url, path.display());

        if !path.is_file() {
            return Err(ImportError::FileNotFound(file_url.to_string()));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_with_files() -> (TempDir, SiteFileStore) {
        let root = TempDir::new().unwrap();
        let public = root.path().join("public");
        let private = root.path().join("private");
        fs::create_dir_all(&public).unwrap();
        fs::create_dir_all(&private).unwrap();
        fs::write(public.join("gosi.xlsx"), b"x").unwrap();
        fs::write(public.join("my workers.xlsx"), b"x").unwrap();
        fs::write(private.join("workers.xlsx"), b"x").unwrap();
        let store = SiteFileStore::new(public, private);
        (root, store)
    }

    #[test]
    fn public_and_private_references_resolve() {
        let (root, store) = store_with_files();
        assert_eq!(
            store.resolve("/files/gosi.xlsx").unwrap(),
            root.path().join("public").join("gosi.xlsx")
        );
        assert_eq!(
            store.resolve("/private/files/workers.xlsx").unwrap(),
            root.path().join("private").join("workers.xlsx")
        );
    }

    #[test]
    fn percent_encoded_names_are_decoded() {
        let (_root, store) = store_with_files();
        assert!(store.resolve("/files/my%20workers.xlsx").is_ok());
    }

    #[test]
    fn plain_paths_are_used_as_is() {
        let (root, store) = store_with_files();
        let path = root.path().join("public").join("gosi.xlsx");
        assert_eq!(store.resolve(path.to_str().unwrap()).unwrap(), path);
    }

    #[test]
    fn missing_file_is_reported_with_its_reference() {
        let (_root, store) = store_with_files();
        let err = store.resolve("/files/absent.xlsx").unwrap_err();
        assert_eq!(err.to_string(), "File not found: /files/absent.xlsx");
    }

    #[test]
    fn private_file_is_not_found_under_public_prefix() {
        let (_root, store) = store_with_files();
        let err = store.resolve("/files/workers.xlsx").unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn traversal_and_empty_references_are_rejected() {
        let (_root, store) = store_with_files();
        for reference in ["", "   ", "/files/", "/files/../secret.xlsx", "/files/%2E%2E/secret.xlsx"] {
            let err = store.resolve(reference).unwrap_err();
            assert!(
                matches!(err, ImportError::InvalidFileReference(_)),
                "{:?} gave {:?}",
                reference,
                err
            );
        }
    }
}

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

/// A filter source file together with the last-modified timestamp observed for it.
///
/// Change detection compares timestamps only, so two edits within the same timestamp tick
/// of the underlying filesystem are indistinguishable from no edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFile {
    path: PathBuf,
    last_modified: SystemTime,
}

impl FilterFile {
    /// Describe a file whose timestamp is already known.
    pub fn new(path: impl Into<PathBuf>, last_modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            last_modified,
        }
    }

    /// Stat a file on disk, resolving its absolute path and modification time.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let last_modified = fs::metadata(&path)?.modified()?;
        Ok(Self {
            path,
            last_modified,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_modified(&self) -> SystemTime {
        self.last_modified
    }

    /// Final path component, or an empty string for paths without one.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension, used to resolve natively registered filters.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Store identity of the filter defined by this file: the path followed by the file name.
    pub fn identity(&self) -> String {
        format!("{}{}", self.path.display(), self.file_name())
    }

    /// Read the file contents.
    pub fn read_source(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_identity_is_path_plus_name() {
        let file = FilterFile::new("/etc/zuul/pre/Auth.filter", SystemTime::UNIX_EPOCH);
        assert_eq!(file.file_name(), "Auth.filter");
        assert_eq!(file.file_stem(), "Auth");
        assert_eq!(file.identity(), "/etc/zuul/pre/Auth.filterAuth.filter");
    }

    #[test]
    fn test_open_reads_metadata() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "order = 1").unwrap();

        let file = FilterFile::open(temp_file.path()).unwrap();
        assert!(file.path().is_absolute());
        assert_eq!(file.read_source().unwrap(), "order = 1");
        assert_eq!(
            file.last_modified(),
            temp_file.as_file().metadata().unwrap().modified().unwrap()
        );
    }

    #[test]
    fn test_open_missing_file() {
        assert!(FilterFile::open("/definitely/not/here.filter").is_err());
    }
}

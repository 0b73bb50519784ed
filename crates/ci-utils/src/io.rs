use camino::{Utf8Path, Utf8PathBuf};
use std::{cell::RefCell, collections::HashMap, fs, io, rc::Rc};

/// Read access to source files.
///
/// The driver only ever goes through this trait, so tests can swap in a
/// [`MockFileSystem`] and observe exactly which paths were read.
pub trait FileSystem {
    /// Reads the whole file as raw bytes.
    fn read_bytes(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;
}

impl<F: FileSystem + ?Sized> FileSystem for Box<F> {
    fn read_bytes(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        (**self).read_bytes(path)
    }
}

impl<F: FileSystem + ?Sized> FileSystem for Rc<F> {
    fn read_bytes(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        (**self).read_bytes(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_bytes(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// In-memory file system.
///
/// Entries without content are directories; reading them fails like reading a
/// directory on disk would. Every `read_bytes` call is logged, successful or not.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: HashMap<Utf8PathBuf, Option<Vec<u8>>>,
    reads: RefCell<Vec<Utf8PathBuf>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<Utf8PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), Some(content.into()));
    }

    pub fn add_dir(&mut self, path: impl Into<Utf8PathBuf>) {
        self.files.insert(path.into(), None);
    }

    /// All paths passed to `read_bytes` so far, in call order.
    pub fn reads(&self) -> Vec<Utf8PathBuf> {
        self.reads.borrow().clone()
    }
}

impl FileSystem for MockFileSystem {
    fn read_bytes(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        self.reads.borrow_mut().push(path.to_owned());

        match self.files.get(path) {
            Some(Some(content)) => Ok(content.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                "Path is a directory",
            )),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "File not found")),
        }
    }
}

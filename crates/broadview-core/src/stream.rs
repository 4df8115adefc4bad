//! Stream handles
//!
//! A `StreamPipe` yields one single-use readable byte stream per
//! open/close cycle. Opening twice without an intervening close is an I/O
//! error in every selection branch.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// Scoped byte-stream source
///
/// Lifecycle: `obtain()` → `open()` → read → `close()` → `release()`.
/// A pipe may be reopened any number of times between obtain and release.
pub trait StreamPipe: Send {
    /// Acquire the underlying resource
    fn obtain(&mut self) -> io::Result<()>;
    /// Open a fresh reader over the resource
    ///
    /// Fails if called again before `close()`.
    fn open(&mut self) -> io::Result<Box<dyn Read + Send>>;
    /// Close the currently open stream, if any
    fn close(&mut self);
    /// Release the underlying resource
    fn release(&mut self);
}

fn already_open() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "stream is already open")
}

/// Pipe over a shared in-memory byte buffer
pub struct MemoryPipe {
    data: Arc<[u8]>,
    opened: bool,
}

impl MemoryPipe {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into(), opened: false }
    }
}

impl StreamPipe for MemoryPipe {
    fn obtain(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn open(&mut self) -> io::Result<Box<dyn Read + Send>> {
        if self.opened {
            return Err(already_open());
        }
        self.opened = true;
        Ok(Box::new(Cursor::new(Arc::clone(&self.data))))
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn release(&mut self) {
        self.opened = false;
    }
}

/// Pipe that reopens a file path per open/close cycle
pub struct FilePipe {
    path: PathBuf,
    opened: bool,
}

impl FilePipe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), opened: false }
    }
}

impl StreamPipe for FilePipe {
    fn obtain(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn open(&mut self) -> io::Result<Box<dyn Read + Send>> {
        if self.opened {
            return Err(already_open());
        }
        let file = File::open(&self.path)?;
        self.opened = true;
        Ok(Box::new(file))
    }

    fn close(&mut self) {
        self.opened = false;
    }

    fn release(&mut self) {
        self.opened = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_pipe_reads_data() {
        let mut pipe = MemoryPipe::new(vec![1u8, 2, 3]);
        pipe.obtain().unwrap();
        let mut reader = pipe.open().unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 2, 3]);
    }

    #[test]
    fn test_open_twice_without_close_fails() {
        let mut pipe = MemoryPipe::new(vec![0u8; 4]);
        pipe.obtain().unwrap();
        let _reader = pipe.open().unwrap();
        assert!(pipe.open().is_err());
    }

    #[test]
    fn test_reopen_after_close() {
        let mut pipe = MemoryPipe::new(vec![0u8; 4]);
        pipe.obtain().unwrap();
        let _reader = pipe.open().unwrap();
        pipe.close();
        assert!(pipe.open().is_ok());
        pipe.close();
        pipe.release();
    }

    #[test]
    fn test_file_pipe_open_twice_fails() {
        let path = std::env::temp_dir().join("broadview-stream-test.bin");
        std::fs::write(&path, [9u8, 8, 7]).unwrap();

        let mut pipe = FilePipe::new(&path);
        pipe.obtain().unwrap();
        let mut reader = pipe.open().unwrap();
        assert!(pipe.open().is_err());
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![9, 8, 7]);
        pipe.close();
        pipe.release();

        std::fs::remove_file(&path).unwrap();
    }
}

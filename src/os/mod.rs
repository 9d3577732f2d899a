// This module is the hub for the OS collaborator: the single capability
// interface both platform implementations conform to, the descriptor and flag
// constants callers need, and the OsError enumeration that normalizes both
// platforms' error codes into one kind set. This is the signaled/recoverable
// error tier of the runtime: every call returns an explicit Result and the
// caller decides how to react, in contrast to the fatal tier inside the
// allocator and containers. End of file is the conventional (count 0, no
// error) pairing on both platforms; the constrained platform's distinguished
// end-of-file error code is remapped by its implementation.

//! OS collaborator interface and error normalization.

use thiserror::Error;

use crate::fmt::FormatBuffer;

pub mod embedded;
pub mod host;

pub use embedded::{EmbeddedOs, RawSys, E_EOF};
pub use host::HostOs;

/// A platform file descriptor.
pub type Fd = i32;

pub const STDIN: Fd = 0;
pub const STDOUT: Fd = 1;
pub const STDERR: Fd = 2;

pub const O_RDONLY: u32 = 0;
pub const O_WRONLY: u32 = 1;
pub const O_RDWR: u32 = 2;

/// Normalized error kinds across both platforms. `errorCode == 0` never
/// reaches this type; success is `Ok`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OsError {
    #[error("file not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("bad file descriptor")]
    BadDescriptor,
    #[error("interrupted")]
    Interrupted,
    #[error("platform error {0}")]
    Platform(i32),
}

impl OsError {
    /// Normalize a conventional-host errno value.
    pub fn from_host_code(code: i32) -> OsError {
        match code {
            libc::ENOENT => OsError::NotFound,
            libc::EACCES | libc::EPERM => OsError::PermissionDenied,
            libc::EBADF => OsError::BadDescriptor,
            libc::EINTR => OsError::Interrupted,
            other => OsError::Platform(other),
        }
    }

    /// Normalize a constrained-platform error code. The end-of-file code is
    /// not an error and must be remapped before this point.
    pub fn from_embedded_code(code: i32) -> OsError {
        match code {
            embedded::E_PATH_NOT_FOUND => OsError::NotFound,
            embedded::E_NOT_ACCESSIBLE => OsError::PermissionDenied,
            embedded::E_BAD_PATH_NUMBER => OsError::BadDescriptor,
            other => OsError::Platform(other),
        }
    }

    /// A non-zero numeric code for process exit status.
    pub fn code(&self) -> i32 {
        match self {
            OsError::NotFound => libc::ENOENT,
            OsError::PermissionDenied => libc::EACCES,
            OsError::BadDescriptor => libc::EBADF,
            OsError::Interrupted => libc::EINTR,
            OsError::Platform(code) => *code,
        }
    }
}

/// The capability interface both platforms implement.
///
/// `read` returning `Ok(0)` is end of file.
pub trait Os {
    fn open(&mut self, path: &str, flags: u32, mode: u32) -> Result<Fd, OsError>;
    fn create(&mut self, path: &str, mode: u32) -> Result<Fd, OsError>;
    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, OsError>;
    fn write(&mut self, fd: Fd, buf: &[u8]) -> Result<usize, OsError>;
    fn close(&mut self, fd: Fd) -> Result<(), OsError>;

    /// Write a format buffer's pending bytes to `fd`. The default writes
    /// them unmodified; the constrained platform overrides this to apply its
    /// line convention first.
    fn flush_buffer(&mut self, fd: Fd, buffer: &mut FormatBuffer) -> Result<usize, OsError> {
        if buffer.is_empty() {
            return Ok(0);
        }
        self.write(fd, buffer.pending())
    }
}

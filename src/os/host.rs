// This module implements the Os capability interface for a conventional host,
// where the platform's C library provides the descriptor-level calls directly.
// Each operation shells out to libc, reads errno on failure, and normalizes it
// through OsError::from_host_code. No line-convention translation happens here;
// the host already uses line feeds. End of file is whatever read reports,
// which on this platform is already the conventional zero count.

//! Conventional-host OS collaborator.

use std::ffi::CString;

use super::{Fd, Os, OsError};

/// The conventional-host implementation of [`Os`].
#[derive(Debug, Default)]
pub struct HostOs;

impl HostOs {
    pub fn new() -> HostOs {
        HostOs
    }

    fn last_errno() -> OsError {
        let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        OsError::from_host_code(code)
    }

    fn c_path(path: &str) -> Result<CString, OsError> {
        CString::new(path).map_err(|_| OsError::Platform(libc::EINVAL))
    }
}

impl Os for HostOs {
    fn open(&mut self, path: &str, flags: u32, mode: u32) -> Result<Fd, OsError> {
        let path = Self::c_path(path)?;
        // SAFETY: the path is a valid NUL-terminated string.
        let fd = unsafe { libc::open(path.as_ptr(), flags as libc::c_int, mode as libc::c_uint) };
        if fd < 0 {
            return Err(Self::last_errno());
        }
        Ok(fd)
    }

    fn create(&mut self, path: &str, mode: u32) -> Result<Fd, OsError> {
        let path = Self::c_path(path)?;
        // SAFETY: the path is a valid NUL-terminated string.
        let fd = unsafe { libc::creat(path.as_ptr(), mode as libc::mode_t) };
        if fd < 0 {
            return Err(Self::last_errno());
        }
        Ok(fd)
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, OsError> {
        // SAFETY: the buffer is valid for writes of its full length.
        let count = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if count < 0 {
            return Err(Self::last_errno());
        }
        Ok(count as usize)
    }

    fn write(&mut self, fd: Fd, buf: &[u8]) -> Result<usize, OsError> {
        // SAFETY: the buffer is valid for reads of its full length.
        let count = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        if count < 0 {
            return Err(Self::last_errno());
        }
        Ok(count as usize)
    }

    fn close(&mut self, fd: Fd) -> Result<(), OsError> {
        // SAFETY: plain descriptor close; an invalid fd reports EBADF.
        if unsafe { libc::close(fd) } != 0 {
            return Err(Self::last_errno());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os::{O_RDONLY, O_WRONLY};

    #[test]
    fn test_open_missing_file_reports_not_found() {
        let mut os = HostOs::new();
        let err = os
            .open("/no/such/picort/file", O_RDONLY, 0)
            .expect_err("open must fail");
        assert_eq!(err, OsError::NotFound);
    }

    #[test]
    fn test_write_and_close_dev_null() {
        let mut os = HostOs::new();
        let fd = os.open("/dev/null", O_WRONLY, 0).expect("open /dev/null");
        let n = os.write(fd, b"discarded").expect("write");
        assert_eq!(n, 9);
        os.close(fd).expect("close");
    }

    #[test]
    fn test_read_reports_eof_as_zero_count() {
        let mut os = HostOs::new();
        let fd = os.open("/dev/null", O_RDONLY, 0).expect("open /dev/null");
        let mut buf = [0u8; 16];
        assert_eq!(os.read(fd, &mut buf), Ok(0));
        os.close(fd).expect("close");
    }

    #[test]
    fn test_close_bad_descriptor() {
        let mut os = HostOs::new();
        assert_eq!(os.close(-1), Err(OsError::BadDescriptor));
    }
}

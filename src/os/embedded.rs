// This module implements the Os capability interface for the constrained
// single-tasking target. The raw system-call bindings themselves are out of
// scope here and live behind the RawSys trait, which the target's startup code
// injects; every RawSys call returns a (value, errorCode) pair with zero
// meaning success, mirroring the platform calling convention. This wrapper
// supplies the two behaviors the platform needs on top of that: its
// distinguished end-of-file error code is remapped to the conventional
// (count 0, no error) pairing used everywhere else, and the buffer-flush path
// rewrites line feeds to carriage returns in place, the platform's line
// convention. All other error codes are normalized through
// OsError::from_embedded_code.

//! Constrained-target OS collaborator.

use crate::fmt::FormatBuffer;

use super::{Fd, Os, OsError};

/// The platform's distinguished end-of-file error code.
pub const E_EOF: i32 = 211;

/// Path not found.
pub const E_PATH_NOT_FOUND: i32 = 216;

/// File not accessible in the requested mode.
pub const E_NOT_ACCESSIBLE: i32 = 214;

/// Bad path number (descriptor).
pub const E_BAD_PATH_NUMBER: i32 = 201;

/// Raw system calls of the constrained platform, injected by startup code.
/// An error code of zero means success.
pub trait RawSys {
    fn open(&mut self, path: &str, flags: u32, mode: u32) -> (Fd, i32);
    fn create(&mut self, path: &str, mode: u32) -> (Fd, i32);
    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> (usize, i32);
    fn write(&mut self, fd: Fd, buf: &[u8]) -> (usize, i32);
    fn close(&mut self, fd: Fd) -> i32;
}

/// The constrained-target implementation of [`Os`] over injected syscalls.
#[derive(Debug)]
pub struct EmbeddedOs<S> {
    sys: S,
}

impl<S: RawSys> EmbeddedOs<S> {
    pub fn new(sys: S) -> EmbeddedOs<S> {
        EmbeddedOs { sys }
    }

    /// The injected syscall table, e.g. for platform calls outside the
    /// capability interface.
    pub fn sys_mut(&mut self) -> &mut S {
        &mut self.sys
    }

    fn check(code: i32) -> Result<(), OsError> {
        if code == 0 {
            Ok(())
        } else {
            Err(OsError::from_embedded_code(code))
        }
    }
}

impl<S: RawSys> Os for EmbeddedOs<S> {
    fn open(&mut self, path: &str, flags: u32, mode: u32) -> Result<Fd, OsError> {
        let (fd, code) = self.sys.open(path, flags, mode);
        Self::check(code)?;
        Ok(fd)
    }

    fn create(&mut self, path: &str, mode: u32) -> Result<Fd, OsError> {
        let (fd, code) = self.sys.create(path, mode);
        Self::check(code)?;
        Ok(fd)
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize, OsError> {
        let (count, code) = self.sys.read(fd, buf);
        if code == E_EOF {
            // The platform reports end of file as an error; everywhere else
            // it is the (count 0, no error) pairing.
            return Ok(0);
        }
        Self::check(code)?;
        Ok(count)
    }

    fn write(&mut self, fd: Fd, buf: &[u8]) -> Result<usize, OsError> {
        let (count, code) = self.sys.write(fd, buf);
        Self::check(code)?;
        Ok(count)
    }

    fn close(&mut self, fd: Fd) -> Result<(), OsError> {
        Self::check(self.sys.close(fd))
    }

    fn flush_buffer(&mut self, fd: Fd, buffer: &mut FormatBuffer) -> Result<usize, OsError> {
        // The platform's line convention wants carriage returns.
        for byte in buffer.pending_mut() {
            if *byte == b'\n' {
                *byte = b'\r';
            }
        }
        if buffer.is_empty() {
            return Ok(0);
        }
        self.write(fd, buffer.pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted syscall table: records writes, serves scripted reads.
    #[derive(Default)]
    struct FakeSys {
        written: Vec<u8>,
        read_results: Vec<(Vec<u8>, i32)>,
        write_error: i32,
    }

    impl RawSys for FakeSys {
        fn open(&mut self, path: &str, _flags: u32, _mode: u32) -> (Fd, i32) {
            if path == "/dd/missing" {
                (-1, E_PATH_NOT_FOUND)
            } else {
                (3, 0)
            }
        }

        fn create(&mut self, _path: &str, _mode: u32) -> (Fd, i32) {
            (4, 0)
        }

        fn read(&mut self, _fd: Fd, buf: &mut [u8]) -> (usize, i32) {
            match self.read_results.pop() {
                Some((bytes, code)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    (bytes.len(), code)
                }
                None => (0, E_EOF),
            }
        }

        fn write(&mut self, _fd: Fd, buf: &[u8]) -> (usize, i32) {
            if self.write_error != 0 {
                return (0, self.write_error);
            }
            self.written.extend_from_slice(buf);
            (buf.len(), 0)
        }

        fn close(&mut self, fd: Fd) -> i32 {
            if fd < 0 {
                E_BAD_PATH_NUMBER
            } else {
                0
            }
        }
    }

    #[test]
    fn test_eof_code_remaps_to_zero_count() {
        let mut os = EmbeddedOs::new(FakeSys::default());
        let mut buf = [0u8; 8];
        assert_eq!(os.read(3, &mut buf), Ok(0));
    }

    #[test]
    fn test_scripted_read_passes_through() {
        let mut os = EmbeddedOs::new(FakeSys {
            read_results: vec![(b"hi".to_vec(), 0)],
            ..FakeSys::default()
        });
        let mut buf = [0u8; 8];
        assert_eq!(os.read(3, &mut buf), Ok(2));
        assert_eq!(&buf[..2], b"hi");
    }

    #[test]
    fn test_open_error_is_normalized() {
        let mut os = EmbeddedOs::new(FakeSys::default());
        assert_eq!(os.open("/dd/missing", 0, 0), Err(OsError::NotFound));
        assert_eq!(os.open("/dd/data", 0, 0), Ok(3));
    }

    #[test]
    fn test_close_error_is_normalized() {
        let mut os = EmbeddedOs::new(FakeSys::default());
        assert_eq!(os.close(-1), Err(OsError::BadDescriptor));
        assert_eq!(os.close(3), Ok(()));
    }

    #[test]
    fn test_flush_translates_line_feeds() {
        let mut os = EmbeddedOs::new(FakeSys::default());
        let mut buffer = FormatBuffer::new();
        buffer.put_str("one\ntwo\n");
        assert_eq!(os.flush_buffer(1, &mut buffer), Ok(8));
        assert_eq!(os.sys_mut().written, b"one\rtwo\r");
    }

    #[test]
    fn test_flush_write_error_surfaces() {
        let mut os = EmbeddedOs::new(FakeSys {
            write_error: 246,
            ..FakeSys::default()
        });
        let mut buffer = FormatBuffer::new();
        buffer.put_str("x\n");
        assert_eq!(os.flush_buffer(1, &mut buffer), Err(OsError::Platform(246)));
    }
}

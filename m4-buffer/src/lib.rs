//! Growable byte buffer and pushback input stream.
//!
//! The buffer and stream here are the Rust analogue of `struct buf` and its
//! `ungetch`/`getch`/`grow_buf` family in the reference `m4` implementation:
//! a contiguous byte region with an explicit, checked growth path rather than
//! an intrusive linked "ungetch chain." Growth is geometric (delegated to
//! `Vec`'s own doubling), but every growth request is routed through
//! [`GrowBuf::reserve_checked`] so that a size computation that would
//! overflow `usize` is caught before it reaches the allocator.

use std::fmt;
use std::io::{self, Read, Write};
use std::path::Path;

mod platform;
pub use platform::set_stdio_binary_mode;

/// Errors produced while growing, reading, or loading into a buffer.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// A size computation (current length + requested slack) would not fit
    /// in `usize`, or the allocator itself refused the request.
    #[error("buffer size overflow")]
    Overflow,

    /// An I/O failure while draining to a sink or reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// `load_file` was asked to read something that is not a regular file
    /// (a directory, device, or other special path).
    #[error("not a regular file: {0}")]
    NotRegularFile(String),
}

/// A contiguous, growable byte buffer with a current fill index.
///
/// Bytes beyond the fill index are indeterminate; nothing outside this type
/// ever observes them, since every accessor is bounded by `len()`.
#[derive(Default, Clone)]
pub struct GrowBuf {
    data: Vec<u8>,
}

impl GrowBuf {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw bytes, in storage order (not read order — see [`InputStream`] for
    /// the stack reading convention).
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Empties the buffer without releasing its storage (mirrors
    /// `delete_buf` in the reference: `b->i = 0`, capacity untouched).
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Appends one byte, growing first if needed.
    pub fn push_byte(&mut self, b: u8) -> Result<(), BufferError> {
        self.reserve_checked(1)?;
        self.data.push(b);
        Ok(())
    }

    /// Appends a run of bytes in order, growing first if needed. Either all
    /// bytes are appended or none are: the capacity check happens before any
    /// mutation.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.reserve_checked(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends the bytes of a string slice. See [`GrowBuf::push_bytes`].
    pub fn push_str(&mut self, s: &str) -> Result<(), BufferError> {
        self.push_bytes(s.as_bytes())
    }

    /// Writes the full contents to `sink` and clears the buffer, but only if
    /// there is anything to write — matches the reference's `OUT_DIV`, which
    /// skips the `fwrite` call entirely on an empty diversion.
    pub fn drain_into<W: Write>(&mut self, sink: &mut W) -> io::Result<()> {
        if !self.data.is_empty() {
            sink.write_all(&self.data)?;
            self.data.clear();
        }
        Ok(())
    }

    /// Appends `other`'s contents to `self` and empties `other` — the
    /// reference's `buf_dump_buf`, used by `undivert` to fold one diversion
    /// into another.
    pub fn append_and_drain(&mut self, other: &mut GrowBuf) -> Result<(), BufferError> {
        self.push_bytes(&other.data)?;
        other.data.clear();
        Ok(())
    }

    /// Ensures room for `additional` more bytes without silently wrapping on
    /// a size computation. `Vec::reserve`'s own growth is geometric; this
    /// just guards the arithmetic ahead of it, the same role `AOF`/`MOF`
    /// play ahead of `realloc` in the reference.
    fn reserve_checked(&mut self, additional: usize) -> Result<(), BufferError> {
        self.data
            .len()
            .checked_add(additional)
            .ok_or(BufferError::Overflow)?;
        self.data
            .try_reserve(additional)
            .map_err(|_| BufferError::Overflow)
    }
}

impl fmt::Debug for GrowBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowBuf").field("len", &self.len()).finish()
    }
}

/// A read-anywhere input source: a [`GrowBuf`] used as a LIFO byte stack,
/// optionally backed by standard input once the stack runs dry.
///
/// Reading pops the last-pushed byte; pushing a string places its bytes so
/// that the *first* byte of the string is the *next* one read — this is what
/// lets a built-in push re-expanded text "in front of" whatever is left of
/// the current input.
pub struct InputStream {
    stack: GrowBuf,
    drain_stdin: bool,
}

impl InputStream {
    /// Creates an empty stream. `drain_stdin` controls whether reads fall
    /// through to the process's standard input once the stack is empty.
    pub fn new(drain_stdin: bool) -> Self {
        Self {
            stack: GrowBuf::new(),
            drain_stdin,
        }
    }

    /// Pushes one byte so it is the very next byte read.
    pub fn push_byte(&mut self, b: u8) -> Result<(), BufferError> {
        self.stack.push_byte(b)
    }

    /// Pushes `s`'s bytes so that `s`'s first byte is read first. Atomic:
    /// the underlying reservation is checked before any byte is written, so
    /// an overflow leaves the stream exactly as it was.
    pub fn push_str(&mut self, s: &str) -> Result<(), BufferError> {
        self.push_bytes(s.as_bytes())
    }

    /// Byte-level form of [`InputStream::push_str`].
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.stack.reserve_checked(bytes.len())?;
        for &b in bytes.iter().rev() {
            self.stack.data.push(b);
        }
        Ok(())
    }

    /// Reads the next byte, falling through to stdin if the stack is empty
    /// and draining is enabled. `Ok(None)` is end-of-input; an `Err` is a
    /// fatal I/O failure (reading stdin, per §4.1 of the specification).
    pub fn read_byte(&mut self) -> Result<Option<u8>, BufferError> {
        if let Some(b) = self.stack.data.pop() {
            return Ok(Some(b));
        }
        if self.drain_stdin {
            let mut one = [0u8; 1];
            match io::stdin().read(&mut one)? {
                0 => Ok(None),
                _ => Ok(Some(one[0])),
            }
        } else {
            Ok(None)
        }
    }

    /// Reads a regular file whole and pushes it so its first byte is read
    /// first. Rejects anything that isn't a regular file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), BufferError> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(BufferError::NotRegularFile(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        self.push_bytes(&bytes)
    }

    /// True if nothing is buffered and stdin is not (or can no longer be)
    /// drained — used by the engine to decide whether end-of-input has been
    /// reached without actually consuming a byte.
    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty() && !self.drain_stdin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== GrowBuf TESTS ====================

    #[test]
    fn push_and_read_back_bytes() {
        let mut b = GrowBuf::new();
        b.push_str("hello").unwrap();
        assert_eq!(b.as_bytes(), b"hello");
        assert_eq!(b.len(), 5);
    }

    #[test]
    fn clear_keeps_capacity_empties_contents() {
        let mut b = GrowBuf::new();
        b.push_str("goat").unwrap();
        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.as_bytes(), b"");
    }

    #[test]
    fn drain_into_writes_once_and_empties() {
        let mut b = GrowBuf::new();
        b.push_str("mice").unwrap();
        let mut out = Vec::new();
        b.drain_into(&mut out).unwrap();
        assert_eq!(out, b"mice");
        assert!(b.is_empty());
    }

    #[test]
    fn drain_into_empty_buffer_writes_nothing() {
        let mut b = GrowBuf::new();
        let mut out = Vec::new();
        b.drain_into(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn append_and_drain_moves_contents() {
        let mut dst = GrowBuf::new();
        let mut src = GrowBuf::new();
        dst.push_str("a").unwrap();
        src.push_str("b").unwrap();
        dst.append_and_drain(&mut src).unwrap();
        assert_eq!(dst.as_bytes(), b"ab");
        assert!(src.is_empty());
    }

    // ==================== InputStream TESTS ====================

    #[test]
    fn push_str_then_read_preserves_order() {
        let mut is = InputStream::new(false);
        is.push_str("abc").unwrap();
        assert_eq!(is.read_byte().unwrap(), Some(b'a'));
        assert_eq!(is.read_byte().unwrap(), Some(b'b'));
        assert_eq!(is.read_byte().unwrap(), Some(b'c'));
        assert_eq!(is.read_byte().unwrap(), None);
    }

    #[test]
    fn pushback_interleaves_like_macro_reexpansion() {
        let mut is = InputStream::new(false);
        is.push_str("world").unwrap();
        // simulate re-expanding "hello " in front of what's left
        is.push_str("hello ").unwrap();
        let mut out = String::new();
        while let Some(b) = is.read_byte().unwrap() {
            out.push(b as char);
        }
        assert_eq!(out, "hello world");
    }

    #[test]
    fn no_stdin_drain_is_exhausted_when_empty() {
        let is = InputStream::new(false);
        assert!(is.is_exhausted());
    }

    #[test]
    fn load_file_rejects_directory() {
        let mut is = InputStream::new(false);
        let err = is.load_file(Path::new(".")).unwrap_err();
        assert!(matches!(err, BufferError::NotRegularFile(_)));
    }

    #[test]
    fn load_file_pushes_first_byte_first() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("m4rs-test-{}.txt", std::process::id()));
        std::fs::write(&path, b"xyz").unwrap();
        let mut is = InputStream::new(false);
        is.load_file(&path).unwrap();
        assert_eq!(is.read_byte().unwrap(), Some(b'x'));
        assert_eq!(is.read_byte().unwrap(), Some(b'y'));
        assert_eq!(is.read_byte().unwrap(), Some(b'z'));
        std::fs::remove_file(&path).ok();
    }
}

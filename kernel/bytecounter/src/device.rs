//! The device's file operations.

use bytecounter_chrdev::{DevNum, FileOperations, FsError};
use bytecounter_core::{kdebug, ktrace};

use crate::counter::Counter;
use crate::gate::OpenGate;

/// Driver state: the byte total and the open gate.
///
/// Created once per module load and shared with the registry; every open
/// file reaches the same instance.
#[derive(Default)]
pub struct ByteCounter {
    counter: Counter,
    gate: OpenGate,
}

impl ByteCounter {
    /// Creates the device with a zero total and no open handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counter.get()
    }

    /// Whether a handle currently holds the device open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }

    /// Copies the rendered total, starting `*cursor` bytes in, into `buf`.
    ///
    /// The total is rendered afresh on every call, so a reader whose cursor
    /// was computed against an older, shorter rendering may see digits of
    /// the newer one.
    ///
    /// # Errors
    ///
    /// [`FsError::InvalidArgument`] for a negative cursor,
    /// [`FsError::OutOfMemory`] if rendering fails. The cursor is untouched
    /// on error. A [`File`](bytecounter_chrdev::File) has no seek and only
    /// moves its position forward, so reads through it never see a negative
    /// cursor; only direct callers of `read_at` can.
    #[expect(
        clippy::cast_possible_wrap,
        reason = "at most MAX_DIGITS bytes are copied"
    )]
    pub fn read_at(&self, buf: &mut [u8], cursor: &mut i64) -> Result<usize, FsError> {
        if buf.is_empty() {
            return Ok(0);
        }
        if *cursor < 0 {
            return Err(FsError::InvalidArgument);
        }
        let start = usize::try_from(*cursor).unwrap_or(usize::MAX);

        let digits = self.counter.render()?;
        let Some(rest) = digits.as_slice().get(start..) else {
            return Ok(0);
        };

        let n = rest.len().min(buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        *cursor += n as i64;
        Ok(n)
    }

    /// Adds `buf.len()` to the total without looking at the bytes.
    pub fn accumulate(&self, buf: &[u8]) -> usize {
        self.counter.add(buf.len());
        buf.len()
    }
}

impl FileOperations for ByteCounter {
    fn open(&self, dev: DevNum) -> Result<(), FsError> {
        self.gate
            .try_open()
            .inspect_err(|_| kdebug!("bytecounter: {dev} already open"))?;
        ktrace!("bytecounter: {dev} opened");
        Ok(())
    }

    fn release(&self, dev: DevNum) {
        self.gate.release();
        ktrace!("bytecounter: {dev} released");
    }

    fn read(&self, _dev: DevNum, buf: &mut [u8], pos: &mut i64) -> Result<usize, FsError> {
        self.read_at(buf, pos)
    }

    /// Writes never fail and never move the file position.
    fn write(&self, _dev: DevNum, buf: &[u8], _pos: &mut i64) -> Result<usize, FsError> {
        Ok(self.accumulate(buf))
    }
}

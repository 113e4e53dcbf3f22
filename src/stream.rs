//! In-memory message body with a cursor.
//!
//! A `Stream` starts attached. `detach` hands the underlying buffer to the
//! caller and leaves the stream unusable: every later operation fails with
//! [`Error::StreamDetached`].

use std::io::{self, SeekFrom};

use bytes::Bytes;

use crate::Result;
use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stream {
    buffer: Option<Vec<u8>>,
    position: usize,
    known_size: Option<usize>,
    readable: bool,
    writable: bool,
    seekable: bool,
}

impl Stream {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(content: Vec<u8>) -> Self {
        Self {
            known_size: Some(content.len()),
            buffer: Some(content),
            position: 0,
            readable: true,
            writable: true,
            seekable: true,
        }
    }

    /// A stream whose medium rejects writes.
    pub fn read_only(content: impl Into<Vec<u8>>) -> Self {
        Self {
            writable: false,
            ..Self::from_vec(content.into())
        }
    }

    pub fn is_attached(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn is_readable(&self) -> bool {
        self.is_attached() && self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.is_attached() && self.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.is_attached() && self.seekable
    }

    /// Total length in bytes, or `None` once detached.
    ///
    /// The length cached at construction is dropped by every write and
    /// recomputed from the buffer here.
    pub fn size(&self) -> Option<usize> {
        let buffer = self.buffer.as_ref()?;
        Some(self.known_size.unwrap_or(buffer.len()))
    }

    pub fn tell(&self) -> Result<usize> {
        self.attached()?;
        Ok(self.position)
    }

    /// A detached stream reports end-of-stream.
    pub fn eof(&self) -> bool {
        match &self.buffer {
            Some(buffer) => self.position >= buffer.len(),
            None => true,
        }
    }

    pub fn seek(&mut self, target: SeekFrom) -> Result<usize> {
        let length = self.attached()?.len();
        if !self.seekable {
            return Err(Error::invalid_argument("stream is not seekable"));
        }
        let (base, offset) = match target {
            SeekFrom::Start(offset) => (0_i128, i128::from(offset)),
            SeekFrom::Current(offset) => (self.position as i128, i128::from(offset)),
            SeekFrom::End(offset) => (length as i128, i128::from(offset)),
        };
        let position = usize::try_from(base + offset).map_err(|_| {
            Error::invalid_argument(format!(
                "unable to seek to stream position {offset} from {target:?}"
            ))
        })?;
        self.position = position;
        Ok(position)
    }

    pub fn rewind(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Writes at the cursor, overwriting existing bytes and growing the
    /// buffer as needed. A cursor past the end zero-fills the gap.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if !self.writable {
            self.attached()?;
            return Err(Error::invalid_argument(
                "cannot write to a non-writable stream",
            ));
        }
        let position = self.position;
        let buffer = self.attached_mut()?;
        let end = position.checked_add(data.len()).ok_or_else(|| {
            Error::invalid_argument(format!(
                "cannot write {} bytes at stream position {position}",
                data.len()
            ))
        })?;
        if buffer.len() < end {
            buffer.try_reserve(end - buffer.len()).map_err(|source| {
                Error::invalid_argument(format!(
                    "cannot grow stream to {end} bytes: {source}"
                ))
            })?;
            buffer.resize(end, 0);
        }
        buffer[position..end].copy_from_slice(data);
        self.position = end;
        self.known_size = None;
        Ok(data.len())
    }

    /// Reads up to `length` bytes from the cursor.
    pub fn read(&mut self, length: usize) -> Result<Vec<u8>> {
        if !self.readable {
            self.attached()?;
            return Err(Error::invalid_argument(
                "cannot read from a non-readable stream",
            ));
        }
        let position = self.position;
        let buffer = self.attached()?;
        let start = position.min(buffer.len());
        let end = start.saturating_add(length).min(buffer.len());
        let chunk = buffer[start..end].to_vec();
        self.position = position.max(end);
        Ok(chunk)
    }

    /// Remaining bytes from the cursor to the end; moves the cursor to the end.
    pub fn contents(&mut self) -> Result<Vec<u8>> {
        let remaining = self.attached()?.len().saturating_sub(self.position);
        self.read(remaining)
    }

    /// The whole buffer regardless of the cursor position.
    pub fn to_bytes(&self) -> Result<Bytes> {
        self.attached().map(|buffer| Bytes::copy_from_slice(buffer))
    }

    /// Releases the underlying buffer. A second call returns `None`.
    pub fn detach(&mut self) -> Option<Vec<u8>> {
        let buffer = self.buffer.take()?;
        self.position = 0;
        self.known_size = None;
        Some(buffer)
    }

    pub fn close(&mut self) {
        drop(self.detach());
    }

    fn attached(&self) -> Result<&Vec<u8>> {
        self.buffer.as_ref().ok_or(Error::StreamDetached)
    }

    fn attached_mut(&mut self) -> Result<&mut Vec<u8>> {
        self.buffer.as_mut().ok_or(Error::StreamDetached)
    }
}

impl Default for Stream {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for Stream {
    fn from(content: Vec<u8>) -> Self {
        Self::from_vec(content)
    }
}

impl From<&[u8]> for Stream {
    fn from(content: &[u8]) -> Self {
        Self::from_vec(content.to_vec())
    }
}

impl From<&str> for Stream {
    fn from(content: &str) -> Self {
        Self::from_vec(content.as_bytes().to_vec())
    }
}

impl From<String> for Stream {
    fn from(content: String) -> Self {
        Self::from_vec(content.into_bytes())
    }
}

impl From<Bytes> for Stream {
    fn from(content: Bytes) -> Self {
        Self::from_vec(content.to_vec())
    }
}

impl io::Read for Stream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let chunk = Stream::read(self, out.len()).map_err(into_io_error)?;
        out[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}

impl io::Write for Stream {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        Stream::write(self, data).map_err(into_io_error)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for Stream {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        Stream::seek(self, target)
            .map(|position| position as u64)
            .map_err(into_io_error)
    }
}

fn into_io_error(error: Error) -> io::Error {
    let kind = match error {
        Error::StreamDetached => io::ErrorKind::NotConnected,
        _ => io::ErrorKind::InvalidInput,
    };
    io::Error::new(kind, error)
}

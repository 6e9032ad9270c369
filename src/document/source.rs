use super::error::DocumentError;
use std::io::{self, Cursor, Read};
use tracing::debug;

/// Byte source feeding the document parser.
///
/// A source is owned by exactly one construction and closed exactly once,
/// through [`SourceGuard`].
#[cfg_attr(test, mockall::automock)]
pub trait InputSource {
    /// Reads into `buf` with [`Read::read`] semantics; `Ok(0)` means the end.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn close(&mut self) -> io::Result<()>;
}

/// Adapts any [`Read`] into an [`InputSource`]; closing drops the reader.
#[derive(Debug)]
pub struct ReaderSource<R: Read> {
    reader: Option<R>,
}

pub type ByteSource<'a> = ReaderSource<Cursor<&'a [u8]>>;

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }
}

impl<'a> ReaderSource<Cursor<&'a [u8]>> {
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read> InputSource for ReaderSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.as_mut() {
            Some(reader) => reader.read(buf),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "input source is already closed",
            )),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.reader.take();
        Ok(())
    }
}

/// Closes the wrapped source when dropped, on every exit path.
///
/// A failure while closing is logged and discarded so it can never replace the
/// outcome of the construction that owned the source.
pub struct SourceGuard<S: InputSource> {
    source: S,
}

impl<S: InputSource> SourceGuard<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Reads the whole source. At most `limit + 1` bytes are pulled, so an
    /// oversized input fails without being drained.
    pub fn read_all(&mut self, limit: usize) -> Result<Vec<u8>, DocumentError> {
        let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
        let mut buf = Vec::new();
        SourceReader(&mut self.source)
            .take(cap)
            .read_to_end(&mut buf)
            .map_err(DocumentError::Read)?;

        if buf.len() > limit {
            return Err(DocumentError::TooLarge { limit });
        }

        Ok(buf)
    }
}

struct SourceReader<'s, S: InputSource>(&'s mut S);

impl<S: InputSource> Read for SourceReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        InputSource::read(self.0, buf)
    }
}

impl<S: InputSource> Drop for SourceGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.source.close() {
            debug!(error = %e, "Ignoring failure while closing input source");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serving(content: &'static [u8]) -> MockInputSource {
        let mut source = MockInputSource::new();
        let mut offset = 0;
        source.expect_read().returning(move |buf| {
            let n = (content.len() - offset).min(buf.len());
            buf[..n].copy_from_slice(&content[offset..offset + n]);
            offset += n;
            Ok(n)
        });
        source
    }

    /// Endless input that records how many bytes were handed out.
    #[derive(Default)]
    struct CountingReader {
        served: usize,
    }

    impl Read for CountingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            buf.fill(b' ');
            self.served += buf.len();
            Ok(buf.len())
        }
    }

    #[test]
    fn test_reader_source_reads_then_closes() {
        let mut source = ByteSource::from_bytes(b"<a/>");
        let mut buf = [0u8; 16];

        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"<a/>");
        assert_eq!(source.read(&mut buf).unwrap(), 0);

        source.close().unwrap();
        assert!(source.is_closed());
        assert!(source.read(&mut buf).is_err());
    }

    #[test]
    fn test_guard_closes_once_on_drop() {
        let mut source = serving(b"<a/>");
        source.expect_close().times(1).returning(|| Ok(()));

        let mut guard = SourceGuard::new(source);
        assert_eq!(guard.read_all(1024).unwrap(), b"<a/>");
    }

    #[test]
    fn test_guard_swallows_close_failure() {
        let mut source = MockInputSource::new();
        source
            .expect_close()
            .times(1)
            .returning(|| Err(io::Error::new(io::ErrorKind::Other, "close failed")));

        drop(SourceGuard::new(source));
    }

    #[test]
    fn test_guard_enforces_size_limit() {
        let mut guard = SourceGuard::new(ByteSource::from_bytes(b"<root>payload</root>"));

        match guard.read_all(8) {
            Err(DocumentError::TooLarge { limit }) => assert_eq!(limit, 8),
            other => panic!("Expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_guard_accepts_input_at_limit() {
        let mut guard = SourceGuard::new(ByteSource::from_bytes(b"<a/>"));
        assert_eq!(guard.read_all(4).unwrap(), b"<a/>");
    }

    #[test]
    fn test_guard_stops_reading_past_limit() {
        let mut reader = CountingReader::default();
        {
            let mut guard = SourceGuard::new(ReaderSource::new(&mut reader));
            assert!(matches!(
                guard.read_all(64),
                Err(DocumentError::TooLarge { limit: 64 })
            ));
        }
        assert!(reader.served <= 65, "read {} bytes", reader.served);
    }

    #[test]
    fn test_guard_wraps_read_failure() {
        let mut source = MockInputSource::new();
        source
            .expect_read()
            .returning(|_| Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated")));
        source.expect_close().times(1).returning(|| Ok(()));

        let mut guard = SourceGuard::new(source);
        assert!(matches!(guard.read_all(1024), Err(DocumentError::Read(_))));
    }
}

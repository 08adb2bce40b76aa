//! Bounded, flow-controlled byte source
//!
//! Wraps a reader positioned at the start of the requested range and yields it as a stream of
//! chunks. The stream is only polled when the connection can take more data, so a slow client
//! pauses file reads instead of buffering the file in memory.

use futures::{ready, Stream, StreamExt};
use hyper::body::Bytes;
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, Take};
use tokio_util::io::ReaderStream;

/// Terminal-state tracking for a byte source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Streaming,
    /// Every byte of the range was yielded
    Complete,
    /// An I/O error or premature EOF ended the stream
    Aborted,
}

pub struct ByteSource<R> {
    inner: ReaderStream<Take<R>>,
    /// First chunk, read before the response head is released
    primed: Option<Bytes>,
    remaining: u64,
    delivered: u64,
    state: StreamState,
    label: String,
}

impl<R> ByteSource<R>
where
    R: AsyncRead + AsyncSeek + Unpin,
{
    /// Position `reader` at `start` and read the first chunk of `len` bytes
    ///
    /// Errors here happen before anything reached the client, so the caller can still
    /// answer with an error status.
    pub async fn open(
        mut reader: R,
        start: u64,
        len: u64,
        buffer_size: usize,
        label: impl Into<String>,
    ) -> io::Result<Self> {
        if start > 0 {
            reader.seek(SeekFrom::Start(start)).await?;
        }

        // `take` bounds reads to the range even if the file grows underneath us
        let mut inner = ReaderStream::with_capacity(reader.take(len), buffer_size);

        let primed = if len == 0 {
            None
        } else {
            match inner.next().await {
                Some(Ok(chunk)) => Some(chunk),
                Some(Err(e)) => return Err(e),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "resource ended before the first byte",
                    ))
                }
            }
        };

        Ok(Self {
            inner,
            primed,
            remaining: len,
            delivered: 0,
            state: if len == 0 {
                StreamState::Complete
            } else {
                StreamState::Streaming
            },
            label: label.into(),
        })
    }
}

impl<R> ByteSource<R> {
    #[cfg(test)]
    pub const fn state(&self) -> StreamState {
        self.state
    }

    #[cfg(test)]
    pub const fn delivered(&self) -> u64 {
        self.delivered
    }

    fn yield_chunk(&mut self, chunk: Bytes) -> Bytes {
        let len = chunk.len() as u64;
        self.remaining = self.remaining.saturating_sub(len);
        self.delivered += len;
        if self.remaining == 0 {
            self.state = StreamState::Complete;
        }
        chunk
    }

    fn abort(&mut self, err: io::Error) -> io::Error {
        self.state = StreamState::Aborted;
        crate::logger::log_stream_aborted(&self.label, self.delivered, &err);
        err
    }
}

impl<R> Stream for ByteSource<R>
where
    R: AsyncRead + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(chunk) = this.primed.take() {
            return Poll::Ready(Some(Ok(this.yield_chunk(chunk))));
        }
        if this.state != StreamState::Streaming {
            return Poll::Ready(None);
        }

        match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
            Some(Ok(chunk)) => Poll::Ready(Some(Ok(this.yield_chunk(chunk)))),
            Some(Err(e)) => Poll::Ready(Some(Err(this.abort(e)))),
            None => {
                // Content-Length was promised; a short file cannot end the body cleanly
                let err = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("resource truncated with {} bytes outstanding", this.remaining),
                );
                Poll::Ready(Some(Err(this.abort(err))))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (0, Some(remaining))
    }
}

impl<R> Drop for ByteSource<R> {
    fn drop(&mut self) {
        if self.state == StreamState::Streaming {
            crate::logger::log_client_gone(&self.label, self.delivered, self.remaining);
        }
    }
}

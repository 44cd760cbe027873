//! Line framing for the dump1090 raw output port
//!
//! Each line is `*<hex>;`, optionally surrounded by whitespace.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::decode::DecodeError;

/// Longest accepted line, excluding the newline
pub const MAX_LINE_LEN: usize = 112 * 8;

#[derive(Debug, PartialEq)]
pub enum Frame {
    Line(String),
    /// A line over [`MAX_LINE_LEN`] was discarded; carries the discarded length
    Oversized(usize),
}

/// Reads newline-delimited frames with a bounded buffer
pub struct FrameReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(MAX_LINE_LEN + 1),
        }
    }

    /// Next frame, or `None` once the stream is exhausted
    pub async fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        self.buf.clear();
        let limit = (MAX_LINE_LEN + 1) as u64;
        let n = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .await?;

        if n == 0 {
            return Ok(None);
        }

        if self.buf.last() == Some(&b'\n') || self.buf.len() <= MAX_LINE_LEN {
            return Ok(Some(Frame::Line(
                String::from_utf8_lossy(&self.buf).into_owned(),
            )));
        }

        // Discard the rest of the oversized line
        let mut discarded = self.buf.len();
        loop {
            self.buf.clear();
            let n = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut self.buf)
                .await?;
            discarded += n;
            if n == 0 || self.buf.last() == Some(&b'\n') {
                break;
            }
        }

        Ok(Some(Frame::Oversized(discarded)))
    }
}

/// Strip `*`/`;` framing and whitespace, then hex-decode
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_frame(line: &str) -> Result<Option<Vec<u8>>, DecodeError> {
    let payload = line.trim();
    let payload = payload.strip_prefix('*').unwrap_or(payload);
    let payload = payload.strip_suffix(';').unwrap_or(payload);

    if payload.is_empty() {
        return Ok(None);
    }

    Ok(Some(hex::decode(payload)?))
}

//! Fixed-width line wrapping for encoded output streams.

use std::io::{self, Write};

/// Inserts an end-of-line token after every `width` output bytes. The
/// wrapped stream is treated as opaque; callers that must not split tokens
/// (EPS statements) wrap at whitespace themselves before writing.
pub struct LineWrapWriter<W: Write> {
    out: W,
    width: usize,
    eol: &'static [u8],
    written: usize,
}

impl<W: Write> LineWrapWriter<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self::with_eol(out, width, b"\n")
    }

    pub fn with_eol(out: W, width: usize, eol: &'static [u8]) -> Self {
        assert!(width > 0, "line width must be positive");
        Self {
            out,
            width,
            eol,
            written: 0,
        }
    }

    pub fn finish(self) -> W {
        self.out
    }
}

impl<W: Write> Write for LineWrapWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if self.written == self.width {
                self.out.write_all(self.eol)?;
                self.written = 0;
            }
            self.out.write_all(&[byte])?;
            self.written += 1;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests;

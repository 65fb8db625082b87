//! Streaming ASCII85 encoder.
//!
//! Batches input into 4-byte groups and emits 5 base-85 symbols per group,
//! with the `z` shorthand for an all-zero group. A partial final group of
//! `n` bytes is zero-padded and truncated to `n + 1` symbols on
//! [`Ascii85Writer::finish`]. The suffix defaults to the `~>` terminator
//! PostScript's `ASCII85Decode` filter stops at.

use std::io::{self, Write};

const BASE: u32 = 85;

pub struct Ascii85Writer<W: Write> {
    out: W,
    prefix: Vec<u8>,
    suffix: Vec<u8>,
    prefix_written: bool,
    data: [u8; 4],
    len: usize,
}

impl<W: Write> Ascii85Writer<W> {
    pub fn new(out: W) -> Self {
        Self::with_affixes(out, "", "~>")
    }

    pub fn with_affixes(out: W, prefix: &str, suffix: &str) -> Self {
        Self {
            out,
            prefix: prefix.as_bytes().to_vec(),
            suffix: suffix.as_bytes().to_vec(),
            prefix_written: false,
            data: [0; 4],
            len: 0,
        }
    }

    fn push(&mut self, byte: u8) -> io::Result<()> {
        if !self.prefix_written {
            self.out.write_all(&self.prefix)?;
            self.prefix_written = true;
        }
        if self.len == self.data.len() {
            self.write_group()?;
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    fn write_group(&mut self) -> io::Result<()> {
        if self.len == 0 {
            return Ok(());
        }
        let mut word = [0u8; 4];
        word[..self.len].copy_from_slice(&self.data[..self.len]);
        let value = u32::from_be_bytes(word);

        if value == 0 && self.len == self.data.len() {
            self.out.write_all(b"z")?;
        } else {
            let mut symbols = [0u8; 5];
            let mut rest = value;
            for symbol in symbols.iter_mut().rev() {
                *symbol = 0x21 + (rest % BASE) as u8;
                rest /= BASE;
            }
            self.out.write_all(&symbols[..self.len + 1])?;
        }
        self.len = 0;
        Ok(())
    }

    /// Flushes the final (possibly padded) group, writes the suffix, and
    /// returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_group()?;
        self.out.write_all(&self.suffix)?;
        Ok(self.out)
    }
}

impl<W: Write> Write for Ascii85Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.push(byte)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

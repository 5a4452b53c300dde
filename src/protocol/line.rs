//! Newline-delimited scanning shared by request bodies and backing files

use std::io::{BufRead, Read};

use crate::error::{Error, Result};

/// Longest accepted line, excluding the terminator
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Reads `\n`-terminated lines, stripping the terminator and a trailing `\r`.
///
/// The last line does not need a terminator. A line longer than
/// [`MAX_LINE_LEN`] stops the scan with [`Error::LineTooLong`].
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// 1-based number of the line most recently returned
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Read the next line, or `None` at end of input
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        // room for the content plus a "\r\n" terminator
        let limit = (MAX_LINE_LEN + 2) as u64;
        let read = (&mut self.reader).take(limit).read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let terminated = self.buf.last() == Some(&b'\n');
        if !terminated && read as u64 == limit {
            return Err(self.too_long());
        }
        if terminated {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        if self.buf.len() > MAX_LINE_LEN {
            return Err(self.too_long());
        }

        let bytes = std::mem::take(&mut self.buf);
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| Error::InvalidUtf8 {
                line_no: self.line_no,
            })
    }

    fn too_long(&self) -> Error {
        Error::LineTooLong {
            line_no: self.line_no,
            max: MAX_LINE_LEN,
        }
    }
}

/// Split a trimmed map line into its first two space-separated fields.
///
/// Anything after the second field is dropped, so `"k v extra"` yields
/// `("k", "v")`. Returns `None` unless both fields are non-empty, since
/// `"k \n"` would not read back as a pair.
pub fn split_pair(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.split(' ');
    let key = fields.next()?;
    let value = fields.next()?;
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// First space-separated field of a trimmed line
pub fn first_field(line: &str) -> &str {
    line.split(' ').next().unwrap_or(line)
}

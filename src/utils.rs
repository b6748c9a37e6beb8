use std::io::{self, Read};

/// Read until `buf` is full or the reader is exhausted.
///
/// Returns the number of bytes read, which is smaller than `buf.len()` only at
/// end of stream. This is what distinguishes a clean end (0 bytes) from a
/// truncated read.
pub(crate) fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

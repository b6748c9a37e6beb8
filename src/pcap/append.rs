use log::debug;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::PcapError;
use crate::pcap::frame::{write_packet, CapturedPacket};
use crate::pcap::magic::{detect_magic, PcapFormat};

/// Minimal access needed to append a record to an existing capture
///
/// Appending only needs the magic number (to recover the byte order) and the end
/// of the stream: the rest of the file is never read nor rewritten.
pub trait AppendStream {
    /// Read the magic number at the start of the stream and return the format it selects
    fn peek_magic(&mut self) -> Result<PcapFormat, PcapError>;
    /// Move to the end of the stream, returning the new position
    fn seek_end(&mut self) -> Result<u64, PcapError>;
    /// Write one record at the current position, in the given format
    fn write_record(&mut self, packet: &CapturedPacket, format: PcapFormat)
        -> Result<(), PcapError>;
}

impl<S> AppendStream for S
where
    S: Read + Write + Seek,
{
    fn peek_magic(&mut self) -> Result<PcapFormat, PcapError> {
        self.seek(SeekFrom::Start(0))?;
        detect_magic(self)
    }

    fn seek_end(&mut self) -> Result<u64, PcapError> {
        Ok(self.seek(SeekFrom::End(0))?)
    }

    fn write_record(
        &mut self,
        packet: &CapturedPacket,
        format: PcapFormat,
    ) -> Result<(), PcapError> {
        write_packet(self, packet, format.byte_order)?;
        self.flush()?;
        Ok(())
    }
}

/// Append one packet to an existing capture stream, in the stream's byte order
///
/// Only the magic number is read. The packet is validated before anything is written.
pub fn append_packet<S: AppendStream + ?Sized>(
    stream: &mut S,
    packet: &CapturedPacket,
) -> Result<PcapFormat, PcapError> {
    packet.validate()?;
    let format = stream.peek_magic()?;
    let offset = stream.seek_end()?;
    stream.write_record(packet, format)?;
    debug!(
        "appended {} bytes record at offset {} ({:?})",
        packet.record_size(),
        offset,
        format
    );
    Ok(format)
}

use log::{debug, warn};
use std::io::Read;
use std::iter::FusedIterator;

use crate::error::PcapError;
use crate::pcap::frame::{read_packet, CapturedPacket};
use crate::pcap::header::{read_pcap_header, PcapHeader};
use crate::pcap::magic::{detect_magic, PcapFormat};

/// Parsing iterator over legacy pcap data (streaming version)
///
/// ## Pcap Reader
///
/// This reader pulls one record at a time from any input providing the `Read` trait.
/// Memory usage is bounded by the size of the largest packet, so it can be used to
/// parse huge files. The reader is single-pass: it never seeks, and offers no rewind.
///
/// The file header is decoded when the reader is created, and is available through
/// [`PcapPacketReader::header`]. Each call to `next` returns one packet.
///
/// Iteration ends with `None` when the stream ends exactly at a record boundary.
/// A stream ending inside a record yields one truncation error, after which the
/// iterator is exhausted.
///
/// ## Example
///
/// ```rust
/// use pcap_capture::*;
///
/// # let mut capture = PcapCapture::new();
/// # capture.push(CapturedPacket::new(1, 2, b"abc".to_vec()));
/// # let bytes = capture.to_vec().unwrap();
/// let reader = PcapPacketReader::new(&bytes[..]).expect("PcapPacketReader");
/// println!("linktype: {}", reader.header().network);
/// let mut num_packets = 0;
/// for packet in reader {
///     match packet {
///         Ok(packet) => {
///             println!("got new packet, {} bytes", packet.caplen);
///             num_packets += 1;
///         }
///         Err(e) => panic!("error while reading: {:?}", e),
///     }
/// }
/// println!("num_packets: {}", num_packets);
/// ```
pub struct PcapPacketReader<R>
where
    R: Read,
{
    header: PcapHeader,
    reader: R,
    finished: bool,
}

impl<R> PcapPacketReader<R>
where
    R: Read,
{
    /// Creates a new `PcapPacketReader<R>`, reading the magic number and file header.
    ///
    /// On success, the stream is positioned on the first record.
    pub fn new(mut reader: R) -> Result<PcapPacketReader<R>, PcapError> {
        let format = detect_magic(&mut reader)?;
        let header = read_pcap_header(&mut reader, format)?;
        debug!(
            "pcap header: {:?}, version {}.{}, snaplen {}, linktype {}",
            format, header.version_major, header.version_minor, header.snaplen, header.network
        );
        Ok(PcapPacketReader::resume(header, reader))
    }

    /// Creates a reader over a stream already positioned after the file header.
    ///
    /// This is used to iterate a capture again, after seeking back past the header.
    pub fn resume(header: PcapHeader, reader: R) -> PcapPacketReader<R> {
        PcapPacketReader {
            header,
            reader,
            finished: false,
        }
    }

    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    pub fn format(&self) -> PcapFormat {
        self.header.format()
    }

    /// Returns the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Returns the header and the underlying reader
    pub fn into_parts(self) -> (PcapHeader, R) {
        (self.header, self.reader)
    }
}

/// Iterator for PcapPacketReader. Returns a result so parsing errors are not
/// silently ignored
impl<R> Iterator for PcapPacketReader<R>
where
    R: Read,
{
    type Item = Result<CapturedPacket, PcapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match read_packet(&mut self.reader, self.header.format().byte_order) {
            Ok(Some(packet)) => {
                if packet.caplen > self.header.snaplen {
                    warn!(
                        "record caplen ({}) larger than snaplen ({})",
                        packet.caplen, self.header.snaplen
                    );
                }
                Some(Ok(packet))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R> FusedIterator for PcapPacketReader<R> where R: Read {}

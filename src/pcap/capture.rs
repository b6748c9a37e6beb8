use log::debug;
use std::fmt;
use std::io::{Read, Write};

use crate::capture::Capture;
use crate::error::PcapError;
use crate::linktype::Linktype;
use crate::pcap::frame::{packet_gen, CapturedPacket};
use crate::pcap::header::{pcap_header_gen, PcapHeader};
use crate::pcap::magic::PcapFormat;
use crate::pcap::reader::PcapPacketReader;
use cookie_factory::gen;

/// In-memory PCAP capture: file header and packets, in capture order
///
/// The file format (byte order and timestamp precision) is chosen when the
/// capture is created and never changes afterwards. Other header fields can be
/// edited with [`PcapCapture::header_mut`].
///
/// ```rust
/// use pcap_capture::*;
///
/// let mut capture = PcapCapture::with_format(PcapFormat::BE_MICRO);
/// capture.header_mut().network = Linktype::RAW;
/// capture.push(CapturedPacket::new(1_515_933_236, 562_913, vec![0x45, 0x00]));
///
/// let mut out = Vec::new();
/// capture.dump(&mut out).expect("dump");
/// let loaded = PcapCapture::load(&out[..]).expect("load");
/// assert_eq!(loaded, capture);
/// ```
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PcapCapture {
    header: PcapHeader,
    packets: Vec<CapturedPacket>,
}

impl PcapCapture {
    /// Create an empty capture with the default header (little-endian, microseconds)
    pub fn new() -> PcapCapture {
        PcapCapture::default()
    }

    pub fn with_header(header: PcapHeader) -> PcapCapture {
        PcapCapture {
            header,
            packets: Vec::new(),
        }
    }

    pub fn with_format(format: PcapFormat) -> PcapCapture {
        PcapCapture::with_header(PcapHeader::new(format))
    }

    /// Read an entire capture from a stream
    pub fn load<R: Read>(reader: R) -> Result<PcapCapture, PcapError> {
        let mut reader = PcapPacketReader::new(reader)?;
        let packets = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
        let header = reader.into_parts().0;
        debug!("loaded {} packets ({:?})", packets.len(), header.format());
        Ok(PcapCapture { header, packets })
    }

    /// Read an entire capture from memory
    pub fn from_bytes(i: &[u8]) -> Result<PcapCapture, PcapError> {
        PcapCapture::load(i)
    }

    /// Write the header and all packets to a stream, in the capture byte order
    ///
    /// All packets are validated before the first byte is written. A write error in the
    /// middle of the packets leaves a truncated output.
    pub fn dump<W: Write>(&self, w: &mut W) -> Result<(), PcapError> {
        for p in &self.packets {
            p.validate()?;
        }
        let order = self.header.format().byte_order;
        gen(pcap_header_gen(&self.header), &mut *w)?;
        for p in &self.packets {
            gen(packet_gen(p, order), &mut *w)?;
        }
        w.flush()?;
        debug!("dumped {} packets ({:?})", self.packets.len(), self.format());
        Ok(())
    }

    pub fn header(&self) -> &PcapHeader {
        &self.header
    }

    /// Mutable access to header fields. The format cannot be changed.
    pub fn header_mut(&mut self) -> &mut PcapHeader {
        &mut self.header
    }

    #[inline]
    pub fn format(&self) -> PcapFormat {
        self.header.format()
    }

    /// Add one packet at the end of the capture
    pub fn push(&mut self, packet: CapturedPacket) {
        self.packets.push(packet);
    }

    /// Move all packets of `other` at the end of this capture
    pub fn append(&mut self, other: PcapCapture) {
        self.packets.extend(other.packets);
    }

    /// Concatenate captures, in argument order.
    ///
    /// The result takes the header and format of the first source, and the largest
    /// snaplen of all sources. Sources must share the link type and timestamp precision
    /// of the first one. Without sources, an empty default capture is returned.
    pub fn merge<I>(sources: I) -> Result<PcapCapture, PcapError>
    where
        I: IntoIterator<Item = PcapCapture>,
    {
        let mut sources = sources.into_iter();
        let mut result = match sources.next() {
            Some(first) => first,
            None => return Ok(PcapCapture::new()),
        };
        let mut count = 1;
        for source in sources {
            if source.header.network != result.header.network {
                return Err(PcapError::IncompatibleCaptures("link type"));
            }
            if source.format().precision != result.format().precision {
                return Err(PcapError::IncompatibleCaptures("timestamp precision"));
            }
            result.header.snaplen = result.header.snaplen.max(source.header.snaplen);
            result.append(source);
            count += 1;
        }
        debug!("merged {} captures, {} packets", count, result.len());
        Ok(result)
    }

    /// Merge captures and write the result to `w`
    pub fn merge_into<W, I>(w: &mut W, sources: I) -> Result<PcapCapture, PcapError>
    where
        W: Write,
        I: IntoIterator<Item = PcapCapture>,
    {
        let merged = PcapCapture::merge(sources)?;
        merged.dump(w)?;
        Ok(merged)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn packets(&self) -> &[CapturedPacket] {
        &self.packets
    }

    pub fn into_packets(self) -> Vec<CapturedPacket> {
        self.packets
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CapturedPacket> {
        self.packets.iter()
    }
}

impl fmt::Debug for PcapCapture {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("PcapCapture")
            .field("header", &self.header)
            .field("packets", &self.packets.len())
            .finish()
    }
}

impl Extend<CapturedPacket> for PcapCapture {
    fn extend<T: IntoIterator<Item = CapturedPacket>>(&mut self, iter: T) {
        self.packets.extend(iter)
    }
}

impl IntoIterator for PcapCapture {
    type Item = CapturedPacket;
    type IntoIter = std::vec::IntoIter<CapturedPacket>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.into_iter()
    }
}

impl<'a> IntoIterator for &'a PcapCapture {
    type Item = &'a CapturedPacket;
    type IntoIter = std::slice::Iter<'a, CapturedPacket>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

impl Capture for PcapCapture {
    fn get_datalink(&self) -> Linktype {
        self.header.network
    }

    fn get_snaplen(&self) -> u32 {
        self.header.snaplen
    }

    fn get_format(&self) -> PcapFormat {
        self.header.format()
    }

    fn iter<'b>(&'b self) -> Box<dyn Iterator<Item = &'b CapturedPacket> + 'b> {
        Box::new(self.packets.iter())
    }
}

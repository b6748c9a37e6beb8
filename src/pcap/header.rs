use cookie_factory::sequence::tuple;
use cookie_factory::{combinator::slice, gen, SerializeFn};
use std::io::{Read, Write};

use crate::error::PcapError;
use crate::linktype::Linktype;
use crate::pcap::magic::{PcapFormat, MAGIC_SIZE};
use crate::utils::read_full;
use nom::IResult;

/// Size of the global header, magic number included
pub const PCAP_HEADER_SIZE: usize = 24;
const HEADER_BODY_SIZE: usize = PCAP_HEADER_SIZE - MAGIC_SIZE;

/// PCAP global header
///
/// The format (byte order and timestamp precision) is fixed when the header is
/// created or decoded, and is only exposed through [`PcapHeader::format`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PcapHeader {
    format: PcapFormat,
    /// Version major number (currently 2)
    pub version_major: u16,
    /// Version minor number (currently 4)
    pub version_minor: u16,
    /// The correction time in seconds between GMT (UTC) and the local timezone of the following packet header timestamps
    pub thiszone: i32,
    /// In theory, the accuracy of time stamps in the capture; in practice, all tools set it to 0
    pub sigfigs: u32,
    /// max len of captured packets, in octets
    pub snaplen: u32,
    /// Data link type
    pub network: Linktype,
}

impl PcapHeader {
    pub fn new(format: PcapFormat) -> PcapHeader {
        PcapHeader {
            format,
            version_major: 2,
            version_minor: 4,
            thiszone: 0,
            sigfigs: 0,
            snaplen: 65535,
            network: Linktype::ETHERNET,
        }
    }

    pub const fn size(&self) -> usize {
        PCAP_HEADER_SIZE
    }

    #[inline]
    pub fn format(&self) -> PcapFormat {
        self.format
    }

    #[inline]
    pub fn magic(&self) -> [u8; 4] {
        self.format.magic()
    }

    pub fn is_bigendian(&self) -> bool {
        self.format.is_bigendian()
    }

    pub fn is_nanosecond_precision(&self) -> bool {
        self.format.is_nanosecond_precision()
    }

    /// Serialize the 24 header bytes to `w`
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), PcapError> {
        gen(pcap_header_gen(self), w)?;
        Ok(())
    }
}

impl Default for PcapHeader {
    fn default() -> Self {
        PcapHeader::new(PcapFormat::default())
    }
}

/// Read the PCAP global header fields following the magic number
///
/// The magic number has already been consumed, and the format it selects is passed
/// explicitly.
pub fn parse_pcap_header_body(
    i: &[u8],
    format: PcapFormat,
) -> IResult<&[u8], PcapHeader, PcapError> {
    let order = format.byte_order;
    let (i, version_major) = order.parse_u16(i)?;
    let (i, version_minor) = order.parse_u16(i)?;
    let (i, thiszone) = order.parse_i32(i)?;
    let (i, sigfigs) = order.parse_u32(i)?;
    let (i, snaplen) = order.parse_u32(i)?;
    let (i, network) = order.parse_u32(i)?;
    let header = PcapHeader {
        format,
        version_major,
        version_minor,
        thiszone,
        sigfigs,
        snaplen,
        network: Linktype(network),
    };
    Ok((i, header))
}

/// Read the PCAP global header, magic number included
pub fn parse_pcap_header(i: &[u8]) -> IResult<&[u8], PcapHeader, PcapError> {
    if i.len() < MAGIC_SIZE {
        return Err(nom::Err::Error(PcapError::TruncatedHeader {
            expected: PCAP_HEADER_SIZE,
            actual: i.len(),
        }));
    }
    let magic = [i[0], i[1], i[2], i[3]];
    let format = PcapFormat::from_magic(magic).map_err(nom::Err::Error)?;
    parse_pcap_header_body(&i[MAGIC_SIZE..], format)
}

/// Read the 20 header bytes following the magic number from a stream
pub fn read_pcap_header<R: Read>(reader: &mut R, format: PcapFormat) -> Result<PcapHeader, PcapError> {
    let mut buf = [0u8; HEADER_BODY_SIZE];
    let sz = read_full(reader, &mut buf)?;
    if sz < HEADER_BODY_SIZE {
        return Err(PcapError::TruncatedHeader {
            expected: PCAP_HEADER_SIZE,
            actual: MAGIC_SIZE + sz,
        });
    }
    let (_, header) = parse_pcap_header_body(&buf, format)?;
    Ok(header)
}

pub(crate) fn pcap_header_gen<'a, W: Write + 'a>(h: &'a PcapHeader) -> impl SerializeFn<W> + 'a {
    let order = h.format.byte_order;
    tuple((
        slice(h.magic()),
        order.gen_u16(h.version_major),
        order.gen_u16(h.version_minor),
        order.gen_i32(h.thiszone),
        order.gen_u32(h.sigfigs),
        order.gen_u32(h.snaplen),
        order.gen_u32(h.network.0),
    ))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::endianness::ByteOrder;
    use crate::pcap::magic::TsPrecision;
    use crate::ToVec;
    use hex_literal::hex;

    // ntp.pcap header
    pub const PCAP_HDR: &[u8] = &hex!(
        "
D4 C3 B2 A1 02 00 04 00 00 00 00 00 00 00 00 00
00 00 04 00 01 00 00 00"
    );

    // pcap header with nanosecond-precision timestamping
    pub const PCAP_HDR_NSEC: &[u8] = &hex!(
        "
34 CD B2 A1 02 00 04 00 00 00 00 00 00 00 00 00
00 00 04 00 01 00 00 00"
    );

    // fields stored most significant byte first
    pub const PCAP_HDR_BE: &[u8] = &hex!(
        "
A1 B2 C3 D4 00 02 00 04 00 00 00 00 00 00 00 00
00 04 00 00 00 00 00 01"
    );

    #[test]
    fn test_parse_pcap_header() {
        let (rem, hdr) = parse_pcap_header(PCAP_HDR).expect("header parsing failed");
        assert!(rem.is_empty());
        assert_eq!(hdr.format(), PcapFormat::LE_MICRO);
        assert_eq!(hdr.version_major, 2);
        assert_eq!(hdr.version_minor, 4);
        assert_eq!(hdr.snaplen, 262_144);
        assert_eq!(hdr.network, Linktype::ETHERNET);
        assert!(!hdr.is_nanosecond_precision());
    }

    #[test]
    fn test_parse_nanosecond_precision_pcap_header() {
        let (rem, hdr) = parse_pcap_header(PCAP_HDR_NSEC).expect("header parsing failed");
        assert!(rem.is_empty());
        assert_eq!(hdr.format().precision, TsPrecision::Nanosecond);
        assert_eq!(hdr.snaplen, 262_144);
        assert!(hdr.is_nanosecond_precision());
    }

    #[test]
    fn test_parse_bigendian_pcap_header() {
        let (rem, hdr) = parse_pcap_header(PCAP_HDR_BE).expect("header parsing failed");
        assert!(rem.is_empty());
        assert_eq!(hdr.format().byte_order, ByteOrder::Big);
        assert_eq!(hdr.version_major, 2);
        assert_eq!(hdr.version_minor, 4);
        assert_eq!(hdr.snaplen, 262_144);
        assert_eq!(hdr.network, Linktype(1));
    }

    #[test]
    fn test_read_header_body_after_magic() {
        let mut input = &PCAP_HDR_BE[4..];
        let hdr = read_pcap_header(&mut input, PcapFormat::BE_MICRO).expect("read header");
        assert!(input.is_empty());
        assert_eq!(hdr.network, Linktype::ETHERNET);
    }

    #[test]
    fn test_read_header_truncated() {
        let mut input = &PCAP_HDR[4..20];
        match read_pcap_header(&mut input, PcapFormat::LE_MICRO) {
            Err(PcapError::TruncatedHeader { expected, actual }) => {
                assert_eq!(expected, 24);
                assert_eq!(actual, 20);
            }
            r => panic!("unexpected result {:?}", r),
        }
    }

    #[test]
    fn test_header_encode_decode() {
        for (bytes, format) in [
            (PCAP_HDR, PcapFormat::LE_MICRO),
            (PCAP_HDR_NSEC, PcapFormat::LE_NANO),
            (PCAP_HDR_BE, PcapFormat::BE_MICRO),
        ] {
            let (_, hdr) = parse_pcap_header(bytes).expect("header parsing failed");
            let v = hdr.to_vec().expect("serialize");
            assert_eq!(&v[..], bytes);
            let (_, hdr2) = parse_pcap_header(&v).expect("header parsing failed");
            assert_eq!(hdr2.format(), format);
            assert_eq!(hdr, hdr2);
        }
        let mut hdr = PcapHeader::new(PcapFormat::BE_NANO);
        hdr.thiszone = -3600;
        hdr.sigfigs = 7;
        hdr.network = Linktype::RAW;
        let v = hdr.to_vec().expect("serialize");
        assert_eq!(v.len(), PCAP_HEADER_SIZE);
        let (_, hdr2) = parse_pcap_header(&v).expect("header parsing failed");
        assert_eq!(hdr, hdr2);
    }
}

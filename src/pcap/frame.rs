use cookie_factory::combinator::slice;
use cookie_factory::sequence::tuple;
use cookie_factory::{gen, SerializeFn};
use log::{trace, warn};
use nom::IResult;
use std::io::{Read, Write};
use std::time::Duration;

use crate::endianness::ByteOrder;
use crate::error::PcapError;
use crate::pcap::magic::TsPrecision;
use crate::utils::read_full;

/// Size of a record header
pub const RECORD_HEADER_SIZE: usize = 16;

// initial payload allocation; the buffer grows with the bytes actually read
const PAYLOAD_PREALLOC: usize = 65536;

/// Fixed-size header preceding each packet in a pcap file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub ts_sec: u32,
    pub ts_frac: u32,
    pub caplen: u32,
    pub origlen: u32,
}

/// A captured packet, owning its payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedPacket {
    /// The date and time when this packet was captured (seconds since epoch)
    pub ts_sec: u32,
    /// Fractional part of the timestamp, in micro- or nanoseconds depending on the file format
    pub ts_frac: u32,
    /// The number of bytes of packet data actually captured and saved in the file
    pub caplen: u32,
    /// The length of the packet as it appeared on the network when it was
    /// captured.
    /// If `caplen` and `origlen` differ, the actually saved packet size was
    /// limited by `snaplen`.
    pub origlen: u32,
    /// Packet data, exactly `caplen` bytes
    pub data: Vec<u8>,
}

impl CapturedPacket {
    /// Create a packet whose captured and original lengths are the payload length
    ///
    /// Record lengths are 32 bits: a payload of 4 GiB or more gets `caplen` set to
    /// `u32::MAX`, and is rejected by [`CapturedPacket::validate`] before being written.
    pub fn new(ts_sec: u32, ts_frac: u32, data: Vec<u8>) -> CapturedPacket {
        let len = u32::try_from(data.len()).unwrap_or(u32::MAX);
        CapturedPacket {
            ts_sec,
            ts_frac,
            caplen: len,
            origlen: len,
            data,
        }
    }

    /// Create a packet truncated from a longer on-wire packet
    pub fn truncated(ts_sec: u32, ts_frac: u32, origlen: u32, data: Vec<u8>) -> CapturedPacket {
        CapturedPacket {
            origlen,
            ..CapturedPacket::new(ts_sec, ts_frac, data)
        }
    }

    pub fn record_header(&self) -> RecordHeader {
        RecordHeader {
            ts_sec: self.ts_sec,
            ts_frac: self.ts_frac,
            caplen: self.caplen,
            origlen: self.origlen,
        }
    }

    /// The date and time when this packet was captured (full resolution).
    /// Returns the seconds, fractional part value and unit (in number per second)
    pub fn ts(&self, precision: TsPrecision) -> (u32, u32, u64) {
        (self.ts_sec, self.ts_frac, precision.units_per_sec())
    }

    /// Capture time as a duration since the Unix epoch
    pub fn duration_since_epoch(&self, precision: TsPrecision) -> Duration {
        Duration::from_secs(u64::from(self.ts_sec)) + precision.to_duration(self.ts_frac)
    }

    /// Size of this packet once serialized
    #[inline]
    pub fn record_size(&self) -> usize {
        RECORD_HEADER_SIZE + self.data.len()
    }

    /// Check that the payload length matches the declared captured length
    pub fn validate(&self) -> Result<(), PcapError> {
        if self.data.len() != self.caplen as usize {
            return Err(PcapError::PreconditionViolation {
                caplen: self.caplen,
                payload_len: self.data.len(),
            });
        }
        Ok(())
    }
}

/// Read a PCAP record header
pub fn parse_record_header(i: &[u8], order: ByteOrder) -> IResult<&[u8], RecordHeader, PcapError> {
    let (i, ts_sec) = order.parse_u32(i)?;
    let (i, ts_frac) = order.parse_u32(i)?;
    let (i, caplen) = order.parse_u32(i)?;
    let (i, origlen) = order.parse_u32(i)?;
    let header = RecordHeader {
        ts_sec,
        ts_frac,
        caplen,
        origlen,
    };
    Ok((i, header))
}

/// Read one PCAP record (header and data) from a stream
///
/// Returns `Ok(None)` if the stream ends exactly where a record header would start.
/// A stream ending inside the header or the payload is an error.
pub fn read_packet<R: Read>(
    reader: &mut R,
    order: ByteOrder,
) -> Result<Option<CapturedPacket>, PcapError> {
    let mut buf = [0u8; RECORD_HEADER_SIZE];
    let sz = read_full(reader, &mut buf)?;
    if sz == 0 {
        return Ok(None);
    }
    if sz < RECORD_HEADER_SIZE {
        return Err(PcapError::TruncatedHeader {
            expected: RECORD_HEADER_SIZE,
            actual: sz,
        });
    }
    let (_, hdr) = parse_record_header(&buf, order)?;
    if hdr.caplen > hdr.origlen {
        warn!(
            "record caplen ({}) larger than origlen ({})",
            hdr.caplen, hdr.origlen
        );
    }
    let caplen = hdr.caplen as usize;
    let mut data = Vec::with_capacity(caplen.min(PAYLOAD_PREALLOC));
    reader.take(u64::from(hdr.caplen)).read_to_end(&mut data)?;
    if data.len() < caplen {
        return Err(PcapError::TruncatedPayload {
            expected: caplen,
            actual: data.len(),
        });
    }
    trace!("read record: ts={}.{} caplen={}", hdr.ts_sec, hdr.ts_frac, hdr.caplen);
    Ok(Some(CapturedPacket {
        ts_sec: hdr.ts_sec,
        ts_frac: hdr.ts_frac,
        caplen: hdr.caplen,
        origlen: hdr.origlen,
        data,
    }))
}

pub(crate) fn packet_gen<'a, W: Write + 'a>(
    p: &'a CapturedPacket,
    order: ByteOrder,
) -> impl SerializeFn<W> + 'a {
    tuple((
        order.gen_u32(p.ts_sec),
        order.gen_u32(p.ts_frac),
        order.gen_u32(p.caplen),
        order.gen_u32(p.origlen),
        // pcap records have no alignment constraints
        slice(&p.data),
    ))
}

/// Write one PCAP record (header and data)
///
/// The packet is validated first: nothing is written if the payload length does not
/// match `caplen`.
pub fn write_packet<W: Write>(
    w: &mut W,
    packet: &CapturedPacket,
    order: ByteOrder,
) -> Result<(), PcapError> {
    packet.validate()?;
    gen(packet_gen(packet, order), w)?;
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use hex_literal::hex;

    // tls12-23.pcap frame 0
    pub const FRAME_PCAP: &[u8] = &hex!(
        "
34 4E 5B 5A E1 96 08 00 4A 00 00 00 4A 00 00 00
72 4D 4A D1 13 0D 4E 9C AE DE CB 73 08 00 45 00
00 3C DF 08 40 00 40 06 47 9F 0A 09 00 01 0A 09
00 02 D1 F4 11 51 34 1B 5B 17 00 00 00 00 A0 02
72 10 14 43 00 00 02 04 05 B4 04 02 08 0A E4 DB
6B 7B 00 00 00 00 01 03 03 07"
    );

    // record with a 9 bytes payload, fields stored most significant byte first
    pub const FRAME_PCAP_BE: &[u8] = &hex!(
        "
55 0F 23 44 00 0B E2 F8 00 00 00 09 00 00 00 09
31 32 33 34 35 36 37 38 39"
    );

    #[test]
    fn test_parse_record_header() {
        let (rem, hdr) =
            parse_record_header(FRAME_PCAP, ByteOrder::Little).expect("header parsing failed");
        assert_eq!(rem.len(), 74);
        assert_eq!(hdr.origlen, 74);
        assert_eq!(hdr.caplen, 74);
        assert_eq!(hdr.ts_frac, 562_913);
        assert_eq!(hdr.ts_sec, 1_515_933_236);
    }

    #[test]
    fn test_read_packet() {
        let mut input = FRAME_PCAP;
        let pkt = read_packet(&mut input, ByteOrder::Little)
            .expect("packet parsing failed")
            .expect("one packet");
        assert!(input.is_empty());
        assert_eq!(pkt.origlen, 74);
        assert_eq!(pkt.data.len(), 74);
        assert_eq!(&pkt.data[..], &FRAME_PCAP[16..]);
        assert_eq!(
            pkt.duration_since_epoch(TsPrecision::Microsecond),
            Duration::new(1_515_933_236, 562_913_000)
        );
    }

    #[test]
    fn test_read_packet_be() {
        let mut input = FRAME_PCAP_BE;
        let pkt = read_packet(&mut input, ByteOrder::Big)
            .expect("packet parsing failed")
            .expect("one packet");
        assert_eq!(pkt.ts_sec, 0x550f_2344);
        assert_eq!(pkt.ts_frac, 779_000);
        assert_eq!(pkt.caplen, 9);
        assert_eq!(&pkt.data[..], b"123456789");
    }

    #[test]
    fn test_read_packet_eof() {
        let mut input: &[u8] = &[];
        assert!(read_packet(&mut input, ByteOrder::Little)
            .expect("clean eof")
            .is_none());
    }

    #[test]
    fn test_read_packet_truncated_header() {
        let mut input = &FRAME_PCAP[..10];
        match read_packet(&mut input, ByteOrder::Little) {
            Err(PcapError::TruncatedHeader { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 10);
            }
            r => panic!("unexpected result {:?}", r),
        }
    }

    #[test]
    fn test_read_packet_truncated_payload() {
        let mut input = &FRAME_PCAP[..FRAME_PCAP.len() - 3];
        match read_packet(&mut input, ByteOrder::Little) {
            Err(e @ PcapError::TruncatedPayload { .. }) => {
                assert!(e.is_truncated());
                assert!(matches!(
                    e,
                    PcapError::TruncatedPayload {
                        expected: 74,
                        actual: 71
                    }
                ));
            }
            r => panic!("unexpected result {:?}", r),
        }
    }

    #[test]
    fn test_huge_caplen_does_not_allocate() {
        // caplen = 0xffff_fff0, only 4 payload bytes present
        let input = hex!("00 00 00 00 00 00 00 00 F0 FF FF FF F0 FF FF FF 01 02 03 04");
        let r = read_packet(&mut &input[..], ByteOrder::Little);
        assert!(matches!(r, Err(PcapError::TruncatedPayload { actual: 4, .. })));
    }

    #[test]
    fn test_caplen_larger_than_origlen_is_surfaced() {
        let input = hex!("01 00 00 00 00 00 00 00 02 00 00 00 01 00 00 00 AA BB");
        let pkt = read_packet(&mut &input[..], ByteOrder::Little)
            .expect("parsing")
            .expect("one packet");
        assert_eq!(pkt.caplen, 2);
        assert_eq!(pkt.origlen, 1);
    }

    #[test]
    fn test_write_packet() {
        let mut input = FRAME_PCAP;
        let pkt = read_packet(&mut input, ByteOrder::Little).unwrap().unwrap();
        let mut v = Vec::new();
        write_packet(&mut v, &pkt, ByteOrder::Little).expect("serialize");
        assert_eq!(&v[..], FRAME_PCAP);
        assert_eq!(v.len(), pkt.record_size());

        let pkt = CapturedPacket::new(0x550f_2344, 779_000, b"123456789".to_vec());
        let mut v = Vec::new();
        write_packet(&mut v, &pkt, ByteOrder::Big).expect("serialize");
        assert_eq!(&v[..], FRAME_PCAP_BE);
    }

    #[test]
    fn test_write_packet_precondition() {
        let mut pkt = CapturedPacket::new(0, 0, vec![1, 2, 3]);
        pkt.caplen = 4;
        let mut v = Vec::new();
        let r = write_packet(&mut v, &pkt, ByteOrder::Little);
        assert!(matches!(
            r,
            Err(PcapError::PreconditionViolation {
                caplen: 4,
                payload_len: 3
            })
        ));
        assert!(v.is_empty());
    }

    #[test]
    fn test_new_packet_lengths() {
        let pkt = CapturedPacket::new(1, 2, vec![0; 300]);
        assert_eq!(pkt.caplen, 300);
        assert_eq!(pkt.origlen, 300);
        assert!(pkt.validate().is_ok());
        // saturated length, as set for payloads that do not fit a record
        let mut pkt = pkt;
        pkt.caplen = u32::MAX;
        assert!(matches!(
            pkt.validate(),
            Err(PcapError::PreconditionViolation {
                caplen: u32::MAX,
                payload_len: 300
            })
        ));
    }

    #[test]
    fn test_truncated_packet_constructor() {
        let pkt = CapturedPacket::truncated(1, 2, 1500, vec![0; 64]);
        assert_eq!(pkt.caplen, 64);
        assert_eq!(pkt.origlen, 1500);
        assert!(pkt.validate().is_ok());
    }
}

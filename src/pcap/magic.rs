use std::io::Read;
use std::time::Duration;

use crate::endianness::ByteOrder;
use crate::error::PcapError;
use crate::utils::read_full;

/// Size of the magic number at the start of a pcap file
pub const MAGIC_SIZE: usize = 4;

/// Precision of the fractional part of record timestamps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TsPrecision {
    Microsecond,
    Nanosecond,
}

impl TsPrecision {
    /// Number of fractional units per second
    pub const fn units_per_sec(self) -> u64 {
        match self {
            TsPrecision::Microsecond => 1_000_000,
            TsPrecision::Nanosecond => 1_000_000_000,
        }
    }

    /// Convert a fractional timestamp part to a `Duration`
    pub fn to_duration(self, frac: u32) -> Duration {
        match self {
            TsPrecision::Microsecond => Duration::from_micros(u64::from(frac)),
            TsPrecision::Nanosecond => Duration::from_nanos(u64::from(frac)),
        }
    }
}

/// Format descriptor selected by the magic number: byte order and timestamp precision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PcapFormat {
    pub byte_order: ByteOrder,
    pub precision: TsPrecision,
}

/// Known magic numbers, as stored on disk, and the format they select.
///
/// The first entry for a format is the magic written when encoding it. The libpcap
/// nanosecond values `a1b23c4d` (and swapped) are accepted when reading only.
const MAGIC_TABLE: [([u8; 4], PcapFormat); 6] = [
    ([0xa1, 0xb2, 0xc3, 0xd4], PcapFormat::BE_MICRO),
    ([0xd4, 0xc3, 0xb2, 0xa1], PcapFormat::LE_MICRO),
    ([0xa1, 0xb2, 0xcd, 0x34], PcapFormat::BE_NANO),
    ([0x34, 0xcd, 0xb2, 0xa1], PcapFormat::LE_NANO),
    ([0xa1, 0xb2, 0x3c, 0x4d], PcapFormat::BE_NANO),
    ([0x4d, 0x3c, 0xb2, 0xa1], PcapFormat::LE_NANO),
];

impl PcapFormat {
    pub const BE_MICRO: PcapFormat = PcapFormat::new(ByteOrder::Big, TsPrecision::Microsecond);
    pub const LE_MICRO: PcapFormat = PcapFormat::new(ByteOrder::Little, TsPrecision::Microsecond);
    pub const BE_NANO: PcapFormat = PcapFormat::new(ByteOrder::Big, TsPrecision::Nanosecond);
    pub const LE_NANO: PcapFormat = PcapFormat::new(ByteOrder::Little, TsPrecision::Nanosecond);

    pub const fn new(byte_order: ByteOrder, precision: TsPrecision) -> PcapFormat {
        PcapFormat {
            byte_order,
            precision,
        }
    }

    /// Classify a magic number
    pub fn from_magic(magic: [u8; 4]) -> Result<PcapFormat, PcapError> {
        MAGIC_TABLE
            .iter()
            .find(|(m, _)| *m == magic)
            .map(|(_, format)| *format)
            .ok_or(PcapError::UnrecognizedMagic(magic))
    }

    /// The magic number announcing this format, in file order
    pub fn magic(&self) -> [u8; 4] {
        // the table covers every combination of byte order and precision
        MAGIC_TABLE
            .iter()
            .find(|(_, format)| format == self)
            .map(|(m, _)| *m)
            .unwrap_or(MAGIC_TABLE[0].0)
    }

    #[inline]
    pub fn is_bigendian(&self) -> bool {
        self.byte_order == ByteOrder::Big
    }

    #[inline]
    pub fn is_nanosecond_precision(&self) -> bool {
        self.precision == TsPrecision::Nanosecond
    }
}

impl Default for PcapFormat {
    fn default() -> Self {
        PcapFormat::LE_MICRO
    }
}

/// Read the magic number from the start of a stream and return the format it selects.
///
/// Exactly 4 bytes are consumed. The returned format must be passed to the header
/// decoder, the magic bytes are not read again.
pub fn detect_magic<R: Read>(reader: &mut R) -> Result<PcapFormat, PcapError> {
    let mut magic = [0u8; MAGIC_SIZE];
    let sz = read_full(reader, &mut magic)?;
    if sz < MAGIC_SIZE {
        return Err(PcapError::TruncatedHeader {
            expected: MAGIC_SIZE,
            actual: sz,
        });
    }
    PcapFormat::from_magic(magic)
}

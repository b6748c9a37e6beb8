use crate::error::PcapError;
use crate::pcap::*;

/// Common trait for all serialization functions
pub trait ToVec {
    /// Serialize to bytes representation, in the byte order of the capture format.
    fn to_vec(&self) -> Result<Vec<u8>, PcapError>;
}

impl ToVec for PcapHeader {
    fn to_vec(&self) -> Result<Vec<u8>, PcapError> {
        let mut v = Vec::with_capacity(PCAP_HEADER_SIZE);
        self.write_to(&mut v)?;
        Ok(v)
    }
}

impl ToVec for PcapCapture {
    /// Serialize the whole capture (header and packets)
    fn to_vec(&self) -> Result<Vec<u8>, PcapError> {
        let len = PCAP_HEADER_SIZE + self.iter().map(|p| p.record_size()).sum::<usize>();
        let mut v = Vec::with_capacity(len);
        self.dump(&mut v)?;
        Ok(v)
    }
}

use crate::linktype::Linktype;
use crate::pcap::{CapturedPacket, PcapFormat};

/// Generic interface for PCAP file access
pub trait Capture {
    fn get_datalink(&self) -> Linktype;

    fn get_snaplen(&self) -> u32;

    fn get_format(&self) -> PcapFormat;

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = &'a CapturedPacket> + 'a>;
}

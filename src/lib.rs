//! # Legacy PCAP reader and writer
//!
//! This crate reads and writes capture files in the classic libpcap format: a
//! global header followed by packet records.
//!
//! It supports both byte orders and both timestamp precisions (microseconds and
//! nanoseconds), detected from the magic number. Packet data is not interpreted.
//!
//! # Example: streaming reader
//!
//! ```rust
//! use pcap_capture::*;
//!
//! # let mut capture = PcapCapture::with_format(PcapFormat::BE_MICRO);
//! # capture.push(CapturedPacket::new(1, 2, b"123456789".to_vec()));
//! # let bytes = capture.to_vec().unwrap();
//! let reader = PcapPacketReader::new(&bytes[..]).expect("PcapPacketReader");
//! let mut num_packets = 0;
//! for packet in reader {
//!     let packet = packet.expect("error while reading");
//!     println!("got packet of {} bytes", packet.caplen);
//!     num_packets += 1;
//! }
//! println!("num_packets: {}", num_packets);
//! ```
//!
//! # Example: load, modify and write
//!
//! ```rust
//! use pcap_capture::*;
//! use std::io::Cursor;
//!
//! # let mut capture = PcapCapture::new();
//! # capture.push(CapturedPacket::new(1, 2, b"abc".to_vec()));
//! # let bytes = capture.to_vec().unwrap();
//! let a = PcapCapture::load(&bytes[..]).expect("load");
//! let b = PcapCapture::load(&bytes[..]).expect("load");
//! let merged = PcapCapture::merge(vec![a, b]).expect("merge");
//!
//! let mut file = Cursor::new(Vec::new());
//! merged.dump(&mut file).expect("dump");
//! append_packet(&mut file, &CapturedPacket::new(3, 4, b"def".to_vec())).expect("append");
//!
//! let reloaded = PcapCapture::from_bytes(file.get_ref()).expect("load");
//! assert_eq!(reloaded.len(), 3);
//! ```

mod utils;

mod endianness;
mod error;
mod linktype;
pub use endianness::ByteOrder;
pub use error::*;
pub use linktype::*;

pub mod pcap;
pub use pcap::*;

mod capture;
pub use capture::*;

mod serialize;
pub use serialize::*;

#[cfg(feature = "fs")]
pub mod fs;

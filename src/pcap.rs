//! PCAP file format
//!
//! See <https://wiki.wireshark.org/Development/LibpcapFileFormat> for details.
//!
//! A PCAP file starts with a 24 bytes global header, followed by records. Each
//! record is a 16 bytes header and the packet data. The magic number at the start
//! of the file selects the byte order of every following field, and the precision
//! (micro- or nanoseconds) of the record timestamps.
//!
//! There are 2 main ways of reading a PCAP file. The first method is to use
//! [`PcapCapture::load`], which reads the whole capture into memory.
//!
//! The second method is to create a [`PcapPacketReader`], which decodes the file
//! header and then yields packets one at a time. This can be used on large files.
//!
//! Records can be added to an existing file without reading it with
//! [`append_packet`].

mod append;
mod capture;
mod frame;
mod header;
mod magic;
mod reader;

pub use append::*;
pub use capture::*;
pub use frame::*;
pub use header::*;
pub use magic::*;
pub use reader::*;

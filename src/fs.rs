//! Path based helpers
//!
//! These functions open files and delegate to the stream-based API. Every file is
//! owned by the function scope, so it is closed on all exit paths, including errors.
//!
//! Writes are not atomic: a failure while dumping leaves a truncated file. Write to
//! a temporary path and rename it on success if atomicity is needed.

use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::PcapError;
use crate::pcap::{append_packet, CapturedPacket, PcapCapture, PcapFormat};

/// Load a complete capture file
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<PcapCapture, PcapError> {
    let file = File::open(path.as_ref())?;
    debug!("loading {}", path.as_ref().display());
    PcapCapture::load(BufReader::new(file))
}

/// Write a capture to a file, replacing any existing content
pub fn dump_file<P: AsRef<Path>>(capture: &PcapCapture, path: P) -> Result<(), PcapError> {
    let file = File::create(path.as_ref())?;
    debug!("writing {}", path.as_ref().display());
    let mut w = BufWriter::new(file);
    capture.dump(&mut w)
}

/// Append one packet to an existing capture file, keeping its byte order
///
/// Only the magic number of the file is read; the record is written at the end.
pub fn append_to_file<P: AsRef<Path>>(
    path: P,
    packet: &CapturedPacket,
) -> Result<PcapFormat, PcapError> {
    let mut file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;
    debug!("appending to {}", path.as_ref().display());
    append_packet(&mut file, packet)
}

/// Merge capture files, in argument order, into `target`
///
/// All sources are loaded before the target is created, so `target` may also be
/// one of the sources.
pub fn merge_files<P, Q, I>(target: P, sources: I) -> Result<PcapCapture, PcapError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    I: IntoIterator<Item = Q>,
{
    let captures = sources
        .into_iter()
        .map(load_file)
        .collect::<Result<Vec<_>, _>>()?;
    let merged = PcapCapture::merge(captures)?;
    dump_file(&merged, target)?;
    Ok(merged)
}

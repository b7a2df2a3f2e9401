//! Zip codec for single-file document packages.
//!
//! Reading decompresses every entry in archive order. Writing replays the
//! entries in the same order with the compression method, timestamp and unix
//! mode they were read with.

use super::member::{Compression, Member};
use std::io::{Cursor, Read, Write};
use zip::result::ZipResult;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Decompress every entry of a zip archive held in memory.
pub(crate) fn read_members(bytes: &[u8]) -> ZipResult<Vec<Member>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut members = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let compression = match entry.compression() {
            CompressionMethod::Stored => Compression::Stored,
            _ => Compression::Deflated,
        };
        let last_modified = entry.last_modified();
        let unix_mode = entry.unix_mode();

        let member = if entry.is_dir() {
            Member::directory(entry.name())
        } else {
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            Member::file(entry.name(), data)
        };
        members.push(member.with_settings(compression, last_modified, unix_mode));
    }

    Ok(members)
}

/// Encode members as a zip archive.
pub(crate) fn write_members(members: &[Member]) -> ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for member in members {
        let method = match member.compression() {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        };
        let mut options = SimpleFileOptions::default()
            .compression_method(method)
            .large_file(member.data().len() as u64 >= u64::from(u32::MAX));
        if let Some(time) = member.last_modified() {
            options = options.last_modified_time(time);
        }
        if let Some(mode) = member.unix_mode() {
            options = options.unix_permissions(mode);
        }

        if member.is_dir() {
            writer.add_directory(member.name(), options)?;
        } else {
            writer.start_file(member.name(), options)?;
            writer.write_all(member.data())?;
        }
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_order_and_settings() {
        let members = vec![
            Member::file("mimetype", b"application/test".to_vec()).with_settings(
                Compression::Stored,
                None,
                None,
            ),
            Member::directory("Data"),
            Member::file("contents.xml", b"<outline/>".to_vec()),
            Member::file("Data/image.png", vec![0x89, b'P', b'N', b'G']),
        ];

        let bytes = write_members(&members).unwrap();
        let read = read_members(&bytes).unwrap();

        let names: Vec<&str> = read.iter().map(Member::name).collect();
        assert_eq!(
            names,
            ["mimetype", "Data/", "contents.xml", "Data/image.png"]
        );
        assert_eq!(read[0].compression(), Compression::Stored);
        assert_eq!(read[2].compression(), Compression::Deflated);
        assert!(read[1].is_dir());
        assert_eq!(read[3].data(), &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_rejects_non_archive() {
        assert!(read_members(b"definitely not a zip file").is_err());
    }
}

//! Archive extraction for restic's release formats
//!
//! Handles the bare bzip2 stream published for Unix targets and the zip
//! container published for Windows.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Read};
use std::path::Path;

use bzip2::read::BzDecoder;
use zip::ZipArchive;

use super::platform::ArchiveFormat;
use crate::error::ExtractError;

/// Write `archive` to `destination` as an executable.
///
/// `entry_name` is only consulted for zip containers. A mid-stream failure
/// can leave `destination` truncated.
pub fn extract(
    archive: &[u8],
    format: ArchiveFormat,
    entry_name: &str,
    destination: &Path,
) -> Result<(), ExtractError> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|source| ExtractError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match format {
        ArchiveFormat::Bzip2 => extract_bzip2(archive, destination),
        ArchiveFormat::Zip => extract_zip(archive, entry_name, destination),
    }
}

fn extract_bzip2(archive: &[u8], destination: &Path) -> Result<(), ExtractError> {
    let mut decoder = BzDecoder::new(archive);
    let mut out = create_executable(destination)?;
    copy_stream(&mut decoder, &mut out, destination)
}

fn extract_zip(archive: &[u8], entry_name: &str, destination: &Path) -> Result<(), ExtractError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;

    // Match on the final path component so `restic_x/restic.exe` also counts
    let index = (0..zip.len()).find(|&i| {
        zip.by_index(i)
            .map(|f| !f.is_dir() && file_name(f.name()) == entry_name)
            .unwrap_or(false)
    });

    let Some(index) = index else {
        let available = (0..zip.len())
            .filter_map(|i| zip.by_index(i).ok().map(|f| f.name().to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ExtractError::EntryNotFound {
            entry: entry_name.to_string(),
            available,
        });
    };

    let mut entry = zip.by_index(index)?;
    let mut out = create_executable(destination)?;
    copy_stream(&mut entry, &mut out, destination)
}

fn file_name(entry: &str) -> &str {
    entry.rsplit(['/', '\\']).next().unwrap_or(entry)
}

fn copy_stream(reader: &mut dyn Read, out: &mut File, destination: &Path) -> Result<(), ExtractError> {
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ExtractError::Decompress(e)),
        };
        io::Write::write_all(out, &buf[..n]).map_err(|source| ExtractError::Io {
            path: destination.to_path_buf(),
            source,
        })?;
    }
}

fn create_executable(path: &Path) -> Result<File, ExtractError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o755);
    }

    let file = options.open(path).map_err(|source| ExtractError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // mode() is ignored when the file already exists
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
            ExtractError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
    }

    Ok(file)
}

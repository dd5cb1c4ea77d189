//! Workbook snapshots
//!
//! Writes and validates the checksummed snapshot file described in the
//! module docs. Writes land in a sibling `.tmp` file and are renamed into
//! place.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{GridError, Result};

use super::WorkbookData;

/// Magic bytes identifying a gridstore snapshot file
pub(crate) const MAGIC: &[u8; 4] = b"GRDS";

/// Current snapshot format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + PayloadLen (8) = 14 bytes
pub(crate) const HEADER_SIZE: usize = 14;

/// Footer size: PayloadCRC (4)
pub(crate) const FOOTER_SIZE: usize = 4;

/// Serialize a workbook to `path`
pub fn write_snapshot(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let payload =
        bincode::serialize(workbook).map_err(|e| GridError::Serialization(e.to_string()))?;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&payload);
    let crc = hasher.finalize();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("tmp");
    {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(payload.len() as u64).to_le_bytes())?;
        writer.write_all(&payload)?;
        writer.write_all(&crc.to_le_bytes())?;
        writer.flush()?;

        let file = writer
            .into_inner()
            .map_err(|e| GridError::Serialization(format!("Failed to flush snapshot: {}", e)))?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    debug!(
        path = %path.display(),
        sheets = workbook.sheets.len(),
        bytes = payload.len(),
        "snapshot written"
    );
    Ok(())
}

/// Read and verify a workbook snapshot from `path`
pub fn read_snapshot(path: &Path) -> Result<WorkbookData> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;

    if bytes.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(GridError::SnapshotCorruption(format!(
            "file too short: {} bytes",
            bytes.len()
        )));
    }

    if &bytes[0..4] != MAGIC {
        return Err(GridError::SnapshotCorruption(format!(
            "invalid magic: expected GRDS, got {:?}",
            &bytes[0..4]
        )));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != VERSION {
        return Err(GridError::SnapshotCorruption(format!(
            "unsupported snapshot version: {}",
            version
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[6..HEADER_SIZE]);
    let payload_len = u64::from_le_bytes(len_bytes) as usize;

    let expected_len = HEADER_SIZE + payload_len + FOOTER_SIZE;
    if bytes.len() != expected_len {
        return Err(GridError::SnapshotCorruption(format!(
            "length mismatch: expected {} bytes, got {}",
            expected_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..HEADER_SIZE + payload_len];

    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&bytes[HEADER_SIZE + payload_len..]);
    let stored_crc = u32::from_le_bytes(crc_bytes);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(payload);
    let actual_crc = hasher.finalize();

    if stored_crc != actual_crc {
        return Err(GridError::SnapshotCorruption(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored_crc, actual_crc
        )));
    }

    let workbook: WorkbookData =
        bincode::deserialize(payload).map_err(|e| GridError::Serialization(e.to_string()))?;

    debug!(
        path = %path.display(),
        sheets = workbook.sheets.len(),
        "snapshot loaded"
    );
    Ok(workbook)
}

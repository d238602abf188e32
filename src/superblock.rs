//! Superblock: the fixed-size metadata blob at cluster 0
//!
//! The superblock has no internal structure at this layer; it is a single
//! opaque cluster that callers may stamp however they like. Attaching the
//! store zero-initializes the region.

use crate::disk::VirtualDisk;
use crate::error::Result;
use crate::layout::Layout;

/// One-cluster metadata store at the head of the image
pub struct Superblock {
    layout: Layout,
}

impl Superblock {
    /// Attach to a disk, zero-initializing the superblock cluster
    pub fn attach(disk: &mut VirtualDisk) -> Result<Self> {
        let layout = disk.layout();
        let zeros = vec![0u8; layout.cluster_size];
        disk.write_cluster(layout.superblock_cluster(), &zeros)?;
        Ok(Superblock { layout })
    }

    /// Read the full superblock cluster
    pub fn read(&self, disk: &mut VirtualDisk) -> Result<Vec<u8>> {
        disk.read_cluster(self.layout.superblock_cluster())
    }

    /// Overwrite the superblock cluster
    ///
    /// The payload must be exactly one cluster; anything else is rejected
    /// by the disk's size check.
    pub fn write(&self, disk: &mut VirtualDisk, data: &[u8]) -> Result<()> {
        disk.write_cluster(self.layout.superblock_cluster(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsError;
    use tempfile::tempdir;

    fn open_disk() -> (tempfile::TempDir, VirtualDisk) {
        let dir = tempdir().unwrap();
        let disk = VirtualDisk::open(dir.path().join("disk.img"), Layout::DEFAULT, true).unwrap();
        (dir, disk)
    }

    #[test]
    fn test_attach_zeroes_superblock() {
        let (_dir, mut disk) = open_disk();

        // Dirty the superblock cluster first.
        disk.write_cluster(0, &vec![0xAB; 1024]).unwrap();

        let sb = Superblock::attach(&mut disk).unwrap();
        let data = sb.read(&mut disk).unwrap();
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_read_round_trip() {
        let (_dir, mut disk) = open_disk();
        let sb = Superblock::attach(&mut disk).unwrap();

        let mut data = vec![0u8; 1024];
        data[0..12].copy_from_slice(b"minifat v0.1");
        sb.write(&mut disk, &data).unwrap();

        let read = sb.read(&mut disk).unwrap();
        assert_eq!(&read[0..12], b"minifat v0.1");
    }

    #[test]
    fn test_write_rejects_wrong_size() {
        let (_dir, mut disk) = open_disk();
        let sb = Superblock::attach(&mut disk).unwrap();

        let result = sb.write(&mut disk, &[0u8; 16]);
        assert!(matches!(result, Err(FsError::PayloadSize { .. })));
    }
}

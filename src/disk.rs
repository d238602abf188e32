//! Virtual disk: cluster-granular I/O over a backing file
//!
//! The disk is the sole point of persistent I/O. It exposes exactly two
//! transfer operations, both bounds-checked and both moving exactly one
//! cluster. Every write is flushed to the backing file before returning.

use crate::error::{FsError, Result};
use crate::layout::Layout;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cluster-addressed backing store
///
/// Holds an open handle to the image file. After [`close`](Self::close) the
/// handle is gone and every transfer fails with [`FsError::DiskNotOpen`].
pub struct VirtualDisk {
    layout: Layout,
    path: PathBuf,
    file: Option<File>,
}

impl VirtualDisk {
    /// Open a disk image, creating it when permitted
    ///
    /// A missing image is created zero-filled to exactly
    /// `cluster_size * cluster_count` bytes if `create_if_missing` is set;
    /// otherwise opening fails with [`FsError::ImageMissing`].
    pub fn open<P: AsRef<Path>>(path: P, layout: Layout, create_if_missing: bool) -> Result<Self> {
        layout.validate()?;
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if !create_if_missing {
                return Err(FsError::ImageMissing(path));
            }
            Self::create_image(&path, layout)?;
        }

        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        Ok(VirtualDisk {
            layout,
            path,
            file: Some(file),
        })
    }

    /// Write a fresh image of zero clusters
    fn create_image(path: &Path, layout: Layout) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let zeros = vec![0u8; layout.cluster_size];
        for _ in 0..layout.cluster_count {
            file.write_all(&zeros)?;
        }
        file.flush()?;

        info!(
            "created disk image {:?} ({} clusters of {} bytes)",
            path, layout.cluster_count, layout.cluster_size
        );
        Ok(())
    }

    fn check_cluster(&self, cluster: usize) -> Result<()> {
        if cluster >= self.layout.cluster_count {
            return Err(FsError::ClusterOutOfRange {
                cluster,
                count: self.layout.cluster_count,
            });
        }
        Ok(())
    }

    /// Read one cluster
    ///
    /// Returns exactly `cluster_size` bytes; a short read surfaces as an
    /// I/O error.
    pub fn read_cluster(&mut self, cluster: usize) -> Result<Vec<u8>> {
        self.check_cluster(cluster)?;
        let offset = (cluster * self.layout.cluster_size) as u64;
        let size = self.layout.cluster_size;

        let file = self.file.as_mut().ok_or(FsError::DiskNotOpen)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut data = vec![0u8; size];
        file.read_exact(&mut data)?;
        Ok(data)
    }

    /// Write one cluster
    ///
    /// The payload must be exactly `cluster_size` bytes.
    pub fn write_cluster(&mut self, cluster: usize, data: &[u8]) -> Result<()> {
        self.check_cluster(cluster)?;
        if data.len() != self.layout.cluster_size {
            return Err(FsError::PayloadSize {
                expected: self.layout.cluster_size,
                actual: data.len(),
            });
        }

        let offset = (cluster * self.layout.cluster_size) as u64;
        let file = self.file.as_mut().ok_or(FsError::DiskNotOpen)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }

    /// Sync all writes to stable storage
    pub fn sync(&mut self) -> Result<()> {
        let file = self.file.as_mut().ok_or(FsError::DiskNotOpen)?;
        file.sync_all()?;
        Ok(())
    }

    /// Close the disk. Idempotent; transfers fail afterwards.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("closed disk image {:?}", self.path);
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn size_bytes(&self) -> usize {
        self.layout.image_size()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disk.img");

        {
            let disk = VirtualDisk::open(&path, Layout::DEFAULT, true).unwrap();
            assert!(disk.is_open());
            assert_eq!(disk.size_bytes(), 1024 * 1024);
        }

        // Image persists; reopening without create permission works.
        let disk = VirtualDisk::open(&path, Layout::DEFAULT, false).unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            disk.size_bytes() as u64
        );
    }

    #[test]
    fn test_missing_image_without_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.img");

        let result = VirtualDisk::open(&path, Layout::DEFAULT, false);
        assert!(matches!(result, Err(FsError::ImageMissing(_))));
    }

    #[test]
    fn test_cluster_round_trip() {
        let dir = tempdir().unwrap();
        let mut disk =
            VirtualDisk::open(dir.path().join("disk.img"), Layout::DEFAULT, true).unwrap();

        let mut data = vec![0u8; 1024];
        data[0..5].copy_from_slice(b"hello");
        disk.write_cluster(7, &data).unwrap();

        let read = disk.read_cluster(7).unwrap();
        assert_eq!(read, data);
    }

    #[test]
    fn test_fresh_image_reads_zero() {
        let dir = tempdir().unwrap();
        let mut disk =
            VirtualDisk::open(dir.path().join("disk.img"), Layout::DEFAULT, true).unwrap();

        let data = disk.read_cluster(1023).unwrap();
        assert!(data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_out_of_range_cluster() {
        let dir = tempdir().unwrap();
        let mut disk =
            VirtualDisk::open(dir.path().join("disk.img"), Layout::DEFAULT, true).unwrap();

        assert!(matches!(
            disk.read_cluster(1024),
            Err(FsError::ClusterOutOfRange { cluster: 1024, .. })
        ));
        assert!(matches!(
            disk.write_cluster(5000, &vec![0u8; 1024]),
            Err(FsError::ClusterOutOfRange { .. })
        ));
    }

    #[test]
    fn test_payload_size_mismatch() {
        let dir = tempdir().unwrap();
        let mut disk =
            VirtualDisk::open(dir.path().join("disk.img"), Layout::DEFAULT, true).unwrap();

        let result = disk.write_cluster(10, &[0u8; 100]);
        assert!(matches!(
            result,
            Err(FsError::PayloadSize {
                expected: 1024,
                actual: 100
            })
        ));
    }

    #[test]
    fn test_close_is_idempotent_and_blocks_io() {
        let dir = tempdir().unwrap();
        let mut disk =
            VirtualDisk::open(dir.path().join("disk.img"), Layout::DEFAULT, true).unwrap();

        disk.close();
        disk.close();
        assert!(!disk.is_open());

        assert!(matches!(disk.read_cluster(0), Err(FsError::DiskNotOpen)));
        assert!(matches!(
            disk.write_cluster(0, &vec![0u8; 1024]),
            Err(FsError::DiskNotOpen)
        ));
        assert!(matches!(disk.sync(), Err(FsError::DiskNotOpen)));
    }
}

//! Disk geometry
//!
//! A disk image is a flat array of fixed-size clusters, partitioned at
//! statically derived boundaries: cluster 0 holds the superblock, a
//! contiguous run of clusters holds the allocation table, and everything
//! after it is the content region. The first content cluster is the root
//! directory.

use crate::error::{FsError, Result};

/// Bytes per allocation-table entry (one 4-byte signed integer per cluster).
pub const TABLE_ENTRY_SIZE: usize = 4;

/// Disk geometry and derived region boundaries
///
/// All boundaries are functions of the two knobs (cluster size and cluster
/// count), so a `Layout` value fully describes an image's on-disk structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Cluster size in bytes
    pub cluster_size: usize,

    /// Total number of clusters in the image
    pub cluster_count: usize,
}

impl Layout {
    /// Default geometry: 1024 clusters of 1024 bytes (a 1 MiB image).
    pub const DEFAULT: Layout = Layout::new(1024, 1024);

    pub const fn new(cluster_size: usize, cluster_count: usize) -> Self {
        Layout {
            cluster_size,
            cluster_count,
        }
    }

    /// Cluster holding the superblock. Always the first cluster.
    pub const fn superblock_cluster(&self) -> usize {
        0
    }

    /// First cluster of the allocation-table region.
    pub const fn table_start(&self) -> usize {
        1
    }

    /// Number of clusters reserved for the allocation table.
    ///
    /// Sized by ceiling division so the region always holds one entry per
    /// cluster even when the table does not fill its last cluster exactly.
    pub const fn table_clusters(&self) -> usize {
        (self.cluster_count * TABLE_ENTRY_SIZE + self.cluster_size - 1) / self.cluster_size
    }

    /// Last cluster of the allocation-table region (inclusive).
    pub const fn table_end(&self) -> usize {
        self.table_start() + self.table_clusters() - 1
    }

    /// First cluster available for file and directory content.
    pub const fn content_start(&self) -> usize {
        self.table_end() + 1
    }

    /// The root directory's first cluster.
    pub const fn root_dir_cluster(&self) -> usize {
        self.content_start()
    }

    /// Number of reserved clusters (superblock + table region).
    pub const fn reserved_clusters(&self) -> usize {
        self.content_start()
    }

    /// Total image size in bytes.
    pub const fn image_size(&self) -> usize {
        self.cluster_size * self.cluster_count
    }

    /// True if `cluster` lies inside the reserved (superblock + table) region.
    pub const fn is_reserved(&self, cluster: usize) -> bool {
        cluster < self.content_start()
    }

    /// Reject geometry that cannot host the layout
    ///
    /// The cluster size must be positive and the content region must be
    /// non-empty once the superblock and table region are carved out.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_size == 0 {
            return Err(FsError::InvalidLayout(String::from(
                "cluster size must be positive",
            )));
        }
        if self.cluster_count == 0 {
            return Err(FsError::InvalidLayout(String::from(
                "cluster count must be positive",
            )));
        }
        if self.content_start() >= self.cluster_count {
            return Err(FsError::InvalidLayout(format!(
                "no content region: {} clusters reserved out of {}",
                self.content_start(),
                self.cluster_count
            )));
        }
        Ok(())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

//! File allocation table
//!
//! The table is an in-memory array of one 4-byte signed entry per cluster,
//! mirrored to the reserved table region of the disk. An entry is `-1`
//! (chain terminator), `0` (free), or the index of the next cluster in a
//! chain. Entries covering the reserved region are pinned to `-1` and
//! protected from mutation.
//!
//! Durability is explicit: `allocate_chain`, `free_chain` and `set_entry`
//! change only memory; nothing reaches the disk until `flush`.

use crate::disk::VirtualDisk;
use crate::error::{FsError, Result};
use crate::layout::{Layout, TABLE_ENTRY_SIZE};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Entry value terminating a chain.
pub const END_OF_CHAIN: i32 = -1;

/// Entry value marking a free cluster.
pub const FREE_CLUSTER: i32 = 0;

/// In-memory allocation table with explicit load/flush
pub struct FatTable {
    layout: Layout,
    entries: Vec<i32>,
}

impl FatTable {
    /// Build a freshly initialized table
    ///
    /// Reserved entries are set to [`END_OF_CHAIN`], the content region to
    /// [`FREE_CLUSTER`]. Fails if the table region cannot hold one entry
    /// per cluster.
    pub fn new(layout: Layout) -> Result<Self> {
        layout.validate()?;

        let entries_per_cluster = layout.cluster_size / TABLE_ENTRY_SIZE;
        let capacity = entries_per_cluster * layout.table_clusters();
        if capacity < layout.cluster_count {
            return Err(FsError::TableRegionTooSmall {
                capacity,
                clusters: layout.table_clusters(),
                required: layout.cluster_count,
            });
        }

        let mut entries = vec![FREE_CLUSTER; layout.cluster_count];
        for entry in entries.iter_mut().take(layout.content_start()) {
            *entry = END_OF_CHAIN;
        }

        Ok(FatTable { layout, entries })
    }

    /// Load the table from the disk's table region
    ///
    /// Reads the table clusters in order, concatenates their payload and
    /// decodes one little-endian entry per cluster. The in-memory table is
    /// overwritten unconditionally.
    pub fn load(&mut self, disk: &mut VirtualDisk) -> Result<()> {
        let total = self.layout.cluster_count * TABLE_ENTRY_SIZE;
        let mut buffer = Vec::with_capacity(total);

        for cluster in self.layout.table_start()..=self.layout.table_end() {
            let data = disk.read_cluster(cluster)?;
            let remaining = total - buffer.len();
            buffer.extend_from_slice(&data[..remaining.min(data.len())]);
        }

        for (i, chunk) in buffer.chunks_exact(TABLE_ENTRY_SIZE).enumerate() {
            self.entries[i] = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        debug!("loaded {} table entries from disk", self.entries.len());
        Ok(())
    }

    /// Write the table across the disk's table region
    ///
    /// The final cluster is zero-padded when the table does not fill it
    /// exactly.
    pub fn flush(&self, disk: &mut VirtualDisk) -> Result<()> {
        let mut buffer = Vec::with_capacity(self.entries.len() * TABLE_ENTRY_SIZE);
        for entry in &self.entries {
            buffer.extend_from_slice(&entry.to_le_bytes());
        }

        let cluster_size = self.layout.cluster_size;
        let mut offset = 0;
        for cluster in self.layout.table_start()..=self.layout.table_end() {
            let mut data = vec![0u8; cluster_size];
            let take = cluster_size.min(buffer.len() - offset);
            data[..take].copy_from_slice(&buffer[offset..offset + take]);
            disk.write_cluster(cluster, &data)?;
            offset += take;
        }

        debug!("flushed {} table entries to disk", self.entries.len());
        Ok(())
    }

    fn check_index(&self, cluster: usize) -> Result<()> {
        if cluster >= self.entries.len() {
            return Err(FsError::ClusterOutOfRange {
                cluster,
                count: self.entries.len(),
            });
        }
        Ok(())
    }

    fn check_unreserved(&self, cluster: usize) -> Result<()> {
        self.check_index(cluster)?;
        if self.layout.is_reserved(cluster) {
            return Err(FsError::ReservedCluster(cluster));
        }
        Ok(())
    }

    /// Read one entry
    pub fn entry(&self, cluster: usize) -> Result<i32> {
        self.check_index(cluster)?;
        Ok(self.entries[cluster])
    }

    /// Write one entry. Reserved indices are rejected.
    pub fn set_entry(&mut self, cluster: usize, value: i32) -> Result<()> {
        self.check_unreserved(cluster)?;
        self.entries[cluster] = value;
        Ok(())
    }

    /// Walk a chain from `start` to its terminator
    ///
    /// Returns the visited clusters in traversal order. The walk aborts,
    /// returning no partial chain, when a link leaves the valid range,
    /// revisits a cluster, or points at a free cluster mid-chain.
    pub fn follow_chain(&self, start: usize) -> Result<Vec<usize>> {
        self.check_unreserved(start)?;

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = start;

        loop {
            if !visited.insert(current) {
                return Err(FsError::ChainLoop(current));
            }
            chain.push(current);

            match self.entries[current] {
                END_OF_CHAIN => break,
                FREE_CLUSTER => return Err(FsError::BrokenChain(current)),
                link if link < 0 || link as usize >= self.entries.len() => {
                    return Err(FsError::ChainOutOfRange {
                        cluster: current,
                        link,
                    })
                }
                link => current = link as usize,
            }
        }

        Ok(chain)
    }

    /// Allocate a new chain of `count` clusters
    ///
    /// Scans the content region in ascending order for free clusters,
    /// links them in scan order and returns the head. Mutates only the
    /// in-memory table; callers flush when durability is required.
    pub fn allocate_chain(&mut self, count: usize) -> Result<usize> {
        if count == 0 {
            return Err(FsError::ZeroAllocation);
        }

        let mut found = Vec::with_capacity(count);
        for cluster in self.layout.content_start()..self.entries.len() {
            if self.entries[cluster] == FREE_CLUSTER {
                found.push(cluster);
                if found.len() == count {
                    break;
                }
            }
        }

        if found.len() < count {
            return Err(FsError::OutOfSpace {
                requested: count,
                available: found.len(),
            });
        }

        for pair in found.windows(2) {
            self.entries[pair[0]] = pair[1] as i32;
        }
        self.entries[found[count - 1]] = END_OF_CHAIN;

        debug!("allocated chain of {} clusters at {}", count, found[0]);
        Ok(found[0])
    }

    /// Release a whole chain back to the free pool
    ///
    /// The chain is resolved via [`follow_chain`](Self::follow_chain)
    /// first, so a corrupt chain aborts the free with the traversal's
    /// error. Reserved clusters inside the chain are skipped, never freed.
    pub fn free_chain(&mut self, start: usize) -> Result<()> {
        self.check_unreserved(start)?;

        let chain = self.follow_chain(start)?;
        for cluster in chain {
            if self.layout.is_reserved(cluster) {
                warn!("chain from {} crosses reserved cluster {}", start, cluster);
                continue;
            }
            self.entries[cluster] = FREE_CLUSTER;
        }
        Ok(())
    }

    /// Count free clusters in the content region
    pub fn free_count(&self) -> usize {
        self.entries[self.layout.content_start()..]
            .iter()
            .filter(|&&e| e == FREE_CLUSTER)
            .count()
    }

    /// Copy of the whole table
    pub fn snapshot(&self) -> Vec<i32> {
        self.entries.clone()
    }

    /// Replace the whole table from a snapshot
    ///
    /// Rejected wholesale when the snapshot length differs from the
    /// cluster count or when it differs from current state anywhere in
    /// the reserved region, so a bulk restore cannot corrupt the layout.
    pub fn restore(&mut self, entries: &[i32]) -> Result<()> {
        if entries.len() != self.entries.len() {
            return Err(FsError::TableSizeMismatch {
                expected: self.entries.len(),
                actual: entries.len(),
            });
        }
        for cluster in 0..self.layout.content_start() {
            if entries[cluster] != self.entries[cluster] {
                return Err(FsError::ReservedEntryMismatch(cluster));
            }
        }
        self.entries.copy_from_slice(entries);
        Ok(())
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

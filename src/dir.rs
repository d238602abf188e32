//! Flat directory layer
//!
//! A directory is a cluster chain holding fixed-width 32-byte records.
//! Slot layout: bytes `[0,11)` packed 8.3 name, byte 11 attributes,
//! `[12,16)` first content cluster (little-endian), `[16,20)` size in
//! bytes (little-endian), `[20,32)` reserved zero. A slot whose first
//! byte is `0x00` or `0xE5` is empty and eligible for reuse.
//!
//! Every operation takes the directory's own start cluster; nesting is
//! representable through [`ATTR_DIRECTORY`] and sub-chains, but walking a
//! hierarchy is the caller's business.

use crate::disk::VirtualDisk;
use crate::error::{FsError, Result};
use crate::fat::FatTable;
use crate::shortname::{self, NAME_LEN, SLOT_DELETED, SLOT_NEVER_USED};
use tracing::debug;

/// Size of one directory record slot.
pub const ENTRY_SIZE: usize = 32;

/// Attribute bit marking a record as a directory.
pub const ATTR_DIRECTORY: u8 = 0x10;

/// One directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Decoded 8.3 name; empty for an empty slot
    pub name: String,

    /// Attribute bits ([`ATTR_DIRECTORY`] marks a directory)
    pub attributes: u8,

    /// First cluster of the record's content chain; 0 means no content
    pub first_cluster: u32,

    /// Content size in bytes
    pub size: u32,
}

impl DirEntry {
    /// Record for a regular file
    pub fn file(name: &str, first_cluster: u32, size: u32) -> Self {
        DirEntry {
            name: name.to_string(),
            attributes: 0,
            first_cluster,
            size,
        }
    }

    /// Record for a subdirectory
    pub fn directory(name: &str, first_cluster: u32) -> Self {
        DirEntry {
            name: name.to_string(),
            attributes: ATTR_DIRECTORY,
            first_cluster,
            size: 0,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.attributes & ATTR_DIRECTORY != 0
    }

    /// An empty slot: never written or tombstoned
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Encode into a 32-byte slot within `data`
    fn encode(&self, data: &mut [u8], offset: usize) {
        let slot = &mut data[offset..offset + ENTRY_SIZE];
        slot[0..NAME_LEN].copy_from_slice(&shortname::pack(&self.name));
        slot[NAME_LEN] = self.attributes;
        slot[12..16].copy_from_slice(&self.first_cluster.to_le_bytes());
        slot[16..20].copy_from_slice(&self.size.to_le_bytes());
        for b in &mut slot[20..ENTRY_SIZE] {
            *b = 0;
        }
    }

    /// Decode the 32-byte slot at `offset` in `data`
    fn decode(data: &[u8], offset: usize) -> Self {
        let slot = &data[offset..offset + ENTRY_SIZE];
        let mut raw = [0u8; NAME_LEN];
        raw.copy_from_slice(&slot[0..NAME_LEN]);

        DirEntry {
            name: shortname::unpack(&raw),
            attributes: slot[NAME_LEN],
            first_cluster: u32::from_le_bytes([slot[12], slot[13], slot[14], slot[15]]),
            size: u32::from_le_bytes([slot[16], slot[17], slot[18], slot[19]]),
        }
    }
}

/// Directory operations over a disk and its allocation table
///
/// Borrows both for a scope; the caller remains the owner and serializes
/// access externally.
pub struct Directory<'a> {
    disk: &'a mut VirtualDisk,
    fat: &'a mut FatTable,
}

impl<'a> Directory<'a> {
    pub fn new(disk: &'a mut VirtualDisk, fat: &'a mut FatTable) -> Self {
        Directory { disk, fat }
    }

    fn entries_per_cluster(&self) -> usize {
        self.disk.layout().cluster_size / ENTRY_SIZE
    }

    /// Materialize all non-empty records in on-disk order
    ///
    /// Cluster order within the chain, then slot order within a cluster.
    /// Returns a fresh vector on every call.
    pub fn list(&mut self, start_cluster: usize) -> Result<Vec<DirEntry>> {
        let chain = self.fat.follow_chain(start_cluster)?;
        let slots = self.entries_per_cluster();
        let mut entries = Vec::new();

        for cluster in chain {
            let data = self.disk.read_cluster(cluster)?;
            for slot in 0..slots {
                let entry = DirEntry::decode(&data, slot * ENTRY_SIZE);
                if !entry.is_empty() {
                    entries.push(entry);
                }
            }
        }
        Ok(entries)
    }

    /// Case-insensitive exact-name lookup
    ///
    /// Returns the first match in enumeration order. An empty query name
    /// is rejected before any I/O happens.
    pub fn find(&mut self, start_cluster: usize, name: &str) -> Result<Option<DirEntry>> {
        if name.is_empty() {
            return Err(FsError::EmptyName);
        }

        let entries = self.list(start_cluster)?;
        Ok(entries
            .into_iter()
            .find(|e| e.name.eq_ignore_ascii_case(name)))
    }

    /// Insert a record into the first empty slot
    ///
    /// When every slot in the chain is occupied, the chain grows by
    /// exactly one cluster: the new cluster is linked to the tail, the
    /// record lands in its first slot and the table is flushed. Growth is
    /// bounded only by free clusters.
    pub fn add(&mut self, start_cluster: usize, entry: &DirEntry) -> Result<()> {
        let chain = self.fat.follow_chain(start_cluster)?;
        let slots = self.entries_per_cluster();

        for &cluster in &chain {
            let mut data = self.disk.read_cluster(cluster)?;
            for slot in 0..slots {
                let offset = slot * ENTRY_SIZE;
                if data[offset] == SLOT_NEVER_USED || data[offset] == SLOT_DELETED {
                    entry.encode(&mut data, offset);
                    self.disk.write_cluster(cluster, &data)?;
                    return Ok(());
                }
            }
        }

        // No free slot anywhere: grow the chain by one cluster.
        let tail = *chain.last().expect("chain is never empty");
        let new_cluster = self.fat.allocate_chain(1)?;
        self.fat.set_entry(tail, new_cluster as i32)?;

        let mut data = vec![0u8; self.disk.layout().cluster_size];
        entry.encode(&mut data, 0);
        self.disk.write_cluster(new_cluster, &data)?;
        self.fat.flush(self.disk)?;

        debug!(
            "directory at {} grew by cluster {}",
            start_cluster, new_cluster
        );
        Ok(())
    }

    /// Remove a record by name, releasing its content chain
    ///
    /// Case-insensitive match as in [`find`](Self::find). On a hit the
    /// record's chain is freed (when it has one), the slot's first byte
    /// is zeroed and both the cluster and the table are persisted.
    /// Returns whether a record was removed; no match is not an error.
    pub fn remove(&mut self, start_cluster: usize, name: &str) -> Result<bool> {
        let chain = self.fat.follow_chain(start_cluster)?;
        let slots = self.entries_per_cluster();

        for cluster in chain {
            let mut data = self.disk.read_cluster(cluster)?;
            for slot in 0..slots {
                let offset = slot * ENTRY_SIZE;
                let entry = DirEntry::decode(&data, offset);
                if entry.is_empty() || !entry.name.eq_ignore_ascii_case(name) {
                    continue;
                }

                if entry.first_cluster > 0 {
                    self.fat.free_chain(entry.first_cluster as usize)?;
                }

                data[offset] = SLOT_NEVER_USED;
                self.disk.write_cluster(cluster, &data)?;
                self.fat.flush(self.disk)?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

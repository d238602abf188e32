//! # minifat - Minimal FAT-Style Filesystem
//!
//! A small FAT-style filesystem layered over a single backing file treated
//! as an array of fixed-size clusters:
//!
//! - **Virtual disk** with bounds-checked, cluster-granular I/O
//! - **Allocation table** tracking free space and per-file cluster chains,
//!   with loop and corruption detection on every traversal
//! - **Flat directories** of fixed-width 8.3 records stored inside cluster
//!   chains, growing one cluster at a time
//! - **Superblock** blob at cluster 0 for caller-defined metadata
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minifat::{DirEntry, Directory, FatTable, Layout, Result, VirtualDisk};
//!
//! # fn main() -> Result<()> {
//! let layout = Layout::DEFAULT;
//! let mut disk = VirtualDisk::open("minifat.img", layout, true)?;
//!
//! // Fresh table: reserved region pinned, content region free.
//! let mut fat = FatTable::new(layout)?;
//! let root = fat.allocate_chain(1)?;
//! fat.flush(&mut disk)?;
//!
//! // Store and look up a directory record.
//! let mut dir = Directory::new(&mut disk, &mut fat);
//! dir.add(root, &DirEntry::file("README.TXT", 0, 0))?;
//! let entry = dir.find(root, "readme.txt")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## On-Disk Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Disk Image File                  │
//! ├─────────────────────────────────────────────┤
//! │ Cluster 0: Superblock                       │
//! │  - opaque one-cluster metadata blob         │
//! ├─────────────────────────────────────────────┤
//! │ Clusters 1..=K: Allocation Table            │
//! │  - one 4-byte LE entry per cluster          │
//! │  - -1 = end of chain, 0 = free, n = next    │
//! ├─────────────────────────────────────────────┤
//! │ Clusters K+1..: Content Region              │
//! │  - first cluster is the root directory      │
//! │  - 32-byte records inside cluster chains    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Durability is explicit: table mutations live in memory until
//! [`FatTable::flush`], and a crash before the flush loses them. The crate
//! assumes one logical owner per open disk; callers serialize externally.

pub mod dir;
pub mod disk;
pub mod error;
pub mod fat;
pub mod layout;
pub mod shortname;
pub mod superblock;

pub use dir::{DirEntry, Directory, ATTR_DIRECTORY, ENTRY_SIZE};
pub use disk::VirtualDisk;
pub use error::{FsError, Result};
pub use fat::{FatTable, END_OF_CHAIN, FREE_CLUSTER};
pub use layout::{Layout, TABLE_ENTRY_SIZE};
pub use superblock::Superblock;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

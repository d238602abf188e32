use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("cluster {cluster} out of range (disk has {count} clusters)")]
    ClusterOutOfRange { cluster: usize, count: usize },

    #[error("cluster {0} is inside the reserved region")]
    ReservedCluster(usize),

    #[error("chain loops back to cluster {0}")]
    ChainLoop(usize),

    #[error("broken chain: cluster {0} links to a free cluster")]
    BrokenChain(usize),

    #[error("chain link at cluster {cluster} leaves the disk: {link}")]
    ChainOutOfRange { cluster: usize, link: i32 },

    #[error("not enough free clusters: requested {requested}, found {available}")]
    OutOfSpace { requested: usize, available: usize },

    #[error("allocation count must be positive")]
    ZeroAllocation,

    #[error("table snapshot has {actual} entries, expected {expected}")]
    TableSizeMismatch { expected: usize, actual: usize },

    #[error("table snapshot changes reserved entry {0}")]
    ReservedEntryMismatch(usize),

    #[error("payload is {actual} bytes, cluster size is {expected}")]
    PayloadSize { expected: usize, actual: usize },

    #[error("table region holds {capacity} entries across {clusters} clusters, need {required}")]
    TableRegionTooSmall {
        capacity: usize,
        clusters: usize,
        required: usize,
    },

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("disk is not open")]
    DiskNotOpen,

    #[error("disk image not found: {0}")]
    ImageMissing(PathBuf),

    #[error("directory name is empty")]
    EmptyName,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FsError>;

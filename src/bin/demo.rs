//! minifat demo driver
//!
//! Formats (or opens) a disk image and walks the whole stack once:
//! superblock, allocation table, chain allocation and a root-directory
//! insert/lookup/remove cycle.

use anyhow::Result;
use clap::Parser;
use minifat::{DirEntry, Directory, FatTable, Layout, Superblock, VirtualDisk};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "minifat-demo")]
#[command(about = "Exercise a minifat disk image end to end")]
struct Args {
    /// Path to the disk image (created when missing)
    #[arg(short = 'p', long, default_value = "minifat.img")]
    image_path: PathBuf,

    /// Cluster size in bytes
    #[arg(long, default_value_t = 1024)]
    cluster_size: usize,

    /// Number of clusters in the image
    #[arg(long, default_value_t = 1024)]
    cluster_count: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let layout = Layout::new(args.cluster_size, args.cluster_count);

    info!("opening disk image {:?}", args.image_path);
    let mut disk = VirtualDisk::open(&args.image_path, layout, true)?;

    // Superblock: stamp a tag and read it back.
    let superblock = Superblock::attach(&mut disk)?;
    let tag = b"minifat demo image";
    let mut block = vec![0u8; layout.cluster_size];
    block[..tag.len()].copy_from_slice(tag);
    superblock.write(&mut disk, &block)?;

    let read_back = superblock.read(&mut disk)?;
    info!(
        "superblock tag: {}",
        String::from_utf8_lossy(&read_back[..tag.len()])
    );

    // Fresh table, persisted, then reloaded to prove the round trip.
    let mut fat = FatTable::new(layout)?;
    fat.flush(&mut disk)?;
    fat.load(&mut disk)?;
    info!("free clusters: {}", fat.free_count());

    let start = fat.allocate_chain(3)?;
    let chain = fat.follow_chain(start)?;
    info!(
        "allocated chain: {}",
        chain
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    // Root directory: insert, list, remove.
    let root = fat.allocate_chain(1)?;
    fat.flush(&mut disk)?;

    let mut dir = Directory::new(&mut disk, &mut fat);
    dir.add(root, &DirEntry::file("HELLO.TXT", start as u32, 42))?;
    for entry in dir.list(root)? {
        let kind = if entry.is_directory() { "DIR" } else { "FILE" };
        info!(
            "{:<12} {:<5} cluster {:<4} size {}",
            entry.name, kind, entry.first_cluster, entry.size
        );
    }

    let mut dir = Directory::new(&mut disk, &mut fat);
    dir.remove(root, "hello.txt")?;
    info!("removed HELLO.TXT; free clusters: {}", fat.free_count());

    fat.flush(&mut disk)?;
    disk.sync()?;
    disk.close();
    info!("done");
    Ok(())
}

//! Directory layer over a real disk image
//!
//! Exercises insertion, growth, tombstoning and chain release through the
//! public API, checking the allocation table's view after each step.

use minifat::{DirEntry, Directory, FatTable, Layout, VirtualDisk, ENTRY_SIZE};
use tempfile::tempdir;

struct Fixture {
    _tmp: tempfile::TempDir,
    disk: VirtualDisk,
    fat: FatTable,
    root: usize,
}

fn fixture() -> Fixture {
    let tmp = tempdir().unwrap();
    let mut disk = VirtualDisk::open(tmp.path().join("disk.img"), Layout::DEFAULT, true).unwrap();
    let mut fat = FatTable::new(Layout::DEFAULT).unwrap();
    let root = fat.allocate_chain(1).unwrap();
    fat.flush(&mut disk).unwrap();
    Fixture {
        _tmp: tmp,
        disk,
        fat,
        root,
    }
}

#[test]
fn test_insert_and_case_insensitive_lookup() {
    let mut fx = fixture();
    let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);

    dir.add(fx.root, &DirEntry::file("Report.Txt", 0, 512))
        .unwrap();

    // Stored uppercased; matched regardless of query case.
    for query in ["REPORT.TXT", "report.txt", "RePoRt.tXt"] {
        let found = dir.find(fx.root, query).unwrap().unwrap();
        assert_eq!(found.name, "REPORT.TXT");
        assert_eq!(found.size, 512);
    }
}

#[test]
fn test_subdirectory_records_carry_attribute() {
    let mut fx = fixture();

    let sub_chain = fx.fat.allocate_chain(1).unwrap();
    let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
    dir.add(fx.root, &DirEntry::directory("SUB", sub_chain as u32))
        .unwrap();

    let found = dir.find(fx.root, "SUB").unwrap().unwrap();
    assert!(found.is_directory());
    assert_eq!(found.first_cluster, sub_chain as u32);

    // The sub-chain is itself a valid directory.
    let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
    dir.add(sub_chain, &DirEntry::file("INNER.TXT", 0, 0))
        .unwrap();
    assert_eq!(dir.list(sub_chain).unwrap().len(), 1);
}

#[test]
fn test_growth_allocates_exactly_one_cluster() {
    let mut fx = fixture();
    let slots_per_cluster = Layout::DEFAULT.cluster_size / ENTRY_SIZE;
    let free_before = fx.fat.free_count();

    {
        let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
        for i in 0..slots_per_cluster {
            dir.add(fx.root, &DirEntry::file(&format!("F{}.BIN", i), 0, 0))
                .unwrap();
        }
    }
    assert_eq!(fx.fat.free_count(), free_before);
    assert_eq!(fx.fat.follow_chain(fx.root).unwrap().len(), 1);

    {
        let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
        dir.add(fx.root, &DirEntry::file("LAST.BIN", 0, 0)).unwrap();
    }
    assert_eq!(fx.fat.free_count(), free_before - 1);
    assert_eq!(fx.fat.follow_chain(fx.root).unwrap().len(), 2);

    let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
    assert!(dir.find(fx.root, "LAST.BIN").unwrap().is_some());
}

#[test]
fn test_growth_persists_table() {
    let mut fx = fixture();
    let slots_per_cluster = Layout::DEFAULT.cluster_size / ENTRY_SIZE;

    {
        let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
        for i in 0..=slots_per_cluster {
            dir.add(fx.root, &DirEntry::file(&format!("F{}.BIN", i), 0, 0))
                .unwrap();
        }
    }

    // The grown chain is visible to a table freshly loaded from disk.
    let mut reloaded = FatTable::new(Layout::DEFAULT).unwrap();
    reloaded.load(&mut fx.disk).unwrap();
    assert_eq!(reloaded.follow_chain(fx.root).unwrap().len(), 2);
}

#[test]
fn test_remove_returns_clusters_and_hides_name() {
    let mut fx = fixture();

    let content = fx.fat.allocate_chain(4).unwrap();
    let free_before = fx.fat.free_count();

    {
        let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
        dir.add(fx.root, &DirEntry::file("BIG.DAT", content as u32, 4096))
            .unwrap();
        assert!(dir.remove(fx.root, "BIG.DAT").unwrap());
    }

    assert_eq!(fx.fat.free_count(), free_before + 4);

    let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
    let names: Vec<_> = dir
        .list(fx.root)
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert!(!names.contains(&"BIG.DAT".to_string()));
}

#[test]
fn test_remove_without_content_chain() {
    let mut fx = fixture();
    let free_before = fx.fat.free_count();

    {
        let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
        dir.add(fx.root, &DirEntry::file("EMPTY.TXT", 0, 0)).unwrap();
        assert!(dir.remove(fx.root, "EMPTY.TXT").unwrap());
    }

    // No chain to release; free count is untouched.
    assert_eq!(fx.fat.free_count(), free_before);
}

#[test]
fn test_remove_missing_leaves_state_alone() {
    let mut fx = fixture();

    {
        let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
        dir.add(fx.root, &DirEntry::file("KEEP.TXT", 0, 123)).unwrap();
    }
    let free_before = fx.fat.free_count();

    let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
    assert!(!dir.remove(fx.root, "MISSING.TXT").unwrap());
    assert_eq!(dir.list(fx.root).unwrap().len(), 1);
    drop(dir);
    assert_eq!(fx.fat.free_count(), free_before);
}

#[test]
fn test_tombstoned_slot_reused_before_growth() {
    let mut fx = fixture();
    let slots_per_cluster = Layout::DEFAULT.cluster_size / ENTRY_SIZE;

    {
        let mut dir = Directory::new(&mut fx.disk, &mut fx.fat);
        for i in 0..slots_per_cluster {
            dir.add(fx.root, &DirEntry::file(&format!("F{}.BIN", i), 0, 0))
                .unwrap();
        }
        assert!(dir.remove(fx.root, "F3.BIN").unwrap());
        // The tombstone gives the full directory a free slot again, so
        // this insert must not grow the chain.
        dir.add(fx.root, &DirEntry::file("REUSE.BIN", 0, 0)).unwrap();
    }

    assert_eq!(fx.fat.follow_chain(fx.root).unwrap().len(), 1);
}

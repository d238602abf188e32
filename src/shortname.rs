//! 8.3 short-name packing
//!
//! Names are stored as an 11-byte field: an 8-byte base and a 3-byte
//! extension, ASCII-uppercased, left-justified and space-padded, with no
//! separator byte. Packing is lossy: anything past the field widths is
//! silently truncated, and the fold to upper case is by fiat. Both
//! directions are pure functions so the lossy rules are testable without
//! touching a disk.

/// Packed name length: 8-byte base + 3-byte extension.
pub const NAME_LEN: usize = 11;

/// First-byte sentinel of a slot that has never held an entry.
pub const SLOT_NEVER_USED: u8 = 0x00;

/// First-byte sentinel of a removed (tombstoned) entry.
pub const SLOT_DELETED: u8 = 0xE5;

/// Pack a name into the 11-byte 8.3 field
///
/// The text before the first `.` is the base, the segment after it the
/// extension; both are truncated to their field width. An empty name
/// packs to all spaces.
pub fn pack(name: &str) -> [u8; NAME_LEN] {
    let mut packed = [b' '; NAME_LEN];
    if name.is_empty() {
        return packed;
    }

    let upper = name.to_ascii_uppercase();
    let mut parts = upper.split('.');
    let base = parts.next().unwrap_or("");
    let ext = parts.next().unwrap_or("");

    for (i, &b) in base.as_bytes().iter().take(8).enumerate() {
        packed[i] = b;
    }
    for (i, &b) in ext.as_bytes().iter().take(3).enumerate() {
        packed[8 + i] = b;
    }
    packed
}

/// Unpack an 11-byte 8.3 field back into a name
///
/// A field whose first byte is an empty-slot sentinel decodes to the
/// empty string. Trailing spaces are trimmed from both parts and the dot
/// is restored only when the extension is non-blank.
pub fn unpack(raw: &[u8; NAME_LEN]) -> String {
    if raw[0] == SLOT_NEVER_USED || raw[0] == SLOT_DELETED {
        return String::new();
    }

    let base = String::from_utf8_lossy(&raw[0..8]);
    let ext = String::from_utf8_lossy(&raw[8..11]);
    let base = base.trim_end();
    let ext = ext.trim_end();

    if ext.is_empty() {
        base.to_string()
    } else {
        format!("{}.{}", base, ext)
    }
}

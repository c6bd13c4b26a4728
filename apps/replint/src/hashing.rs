//! Content and instance fingerprints.
//!
//! Two separate digests share SHA-256 but never a preimage: every input is
//! prefixed with its own domain tag.

use crate::models::notebook::CellSnapshot;
use crate::models::{CellRef, ReportId};
use sha2::{Digest, Sha256};

const CONTENT_DOMAIN: &[u8] = b"replint/content/v1\0";
const INSTANCE_DOMAIN: &[u8] = b"replint/instance/v1\0";
const CELL_SEPARATOR: &[u8] = b"\0\x1e";

/// Length of the hex prefix kept for instance hashes.
const INSTANCE_HEX_LEN: usize = 16;

/// Incremental notebook fingerprint, fed during the forward pass.
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    pub fn new(title: &str) -> Self {
        let mut inner = Sha256::new();
        inner.update(CONTENT_DOMAIN);
        inner.update(title.as_bytes());
        inner.update(CELL_SEPARATOR);
        Self { inner }
    }

    pub fn push_cell(&mut self, cell: &CellSnapshot) {
        match cell.count() {
            Some(n) => self.inner.update(format!("[{}]", n).as_bytes()),
            None => self.inner.update(b"[ ]"),
        }
        self.inner.update(cell.text.as_bytes());
        self.inner.update(CELL_SEPARATOR);
    }

    pub fn finish(self) -> String {
        format!("{:x}", self.inner.finalize())
    }
}

/// Identity of one diagnostic instance.
pub fn instance_hash(rule: ReportId, cell: CellRef, disambiguator: &str) -> String {
    let mut h = Sha256::new();
    h.update(INSTANCE_DOMAIN);
    h.update(rule.as_str().as_bytes());
    h.update(b"\0");
    h.update(cell.to_string().as_bytes());
    h.update(b"\0");
    h.update(disambiguator.as_bytes());
    let mut hex = format!("{:x}", h.finalize());
    hex.truncate(INSTANCE_HEX_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(title: &str, cells: &[CellSnapshot]) -> String {
        let mut h = ContentHasher::new(title);
        cells.iter().for_each(|c| h.push_cell(c));
        h.finish()
    }

    #[test]
    fn test_content_hash_tracks_counts_and_text() {
        let a = content("nb.ipynb", &[CellSnapshot::code("x = 1", Some(1))]);
        let b = content("nb.ipynb", &[CellSnapshot::code("x = 1", Some(2))]);
        let c = content("nb.ipynb", &[CellSnapshot::code("x = 2", Some(1))]);
        assert_eq!(a, content("nb.ipynb", &[CellSnapshot::code("x = 1", Some(1))]));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cell_boundaries_are_not_ambiguous() {
        let joined = content("t", &[CellSnapshot::markdown("ab")]);
        let split = content("t", &[CellSnapshot::markdown("a"), CellSnapshot::markdown("b")]);
        assert_ne!(joined, split);
    }

    #[test]
    fn test_instance_hash_separates_rule_cell_and_detail() {
        let base = instance_hash(ReportId::I2, CellRef::Cell(1), "numpy");
        assert_eq!(base.len(), INSTANCE_HEX_LEN);
        assert_ne!(base, instance_hash(ReportId::I2, CellRef::Cell(1), "pandas"));
        assert_ne!(base, instance_hash(ReportId::I2, CellRef::Cell(2), "numpy"));
        assert_ne!(base, instance_hash(ReportId::P1, CellRef::Cell(1), "numpy"));
    }
}

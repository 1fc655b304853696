use crc32fast::Hasher;

use crate::node::ComponentNode;

/// Derive the id seed for a page from its identifier using CRC32
pub fn page_seed(page_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(page_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential id generator for component nodes within a page
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(page_id: &str) -> Self {
        Self {
            seed: page_seed(page_id),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Advance the counter past ids already present in a loaded document,
    /// so freshly generated ids cannot collide with persisted ones.
    pub fn skip_past<'a>(&mut self, existing: impl Iterator<Item = &'a str>) {
        for id in existing {
            if let Some(rest) = id.strip_prefix(&format!("{}-", self.seed)) {
                if let Ok(n) = rest.parse::<u32>() {
                    self.count = self.count.max(n);
                }
            }
        }
    }

    /// Get the page id seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// Rewrite every id in a duplicated subtree with fresh ones.
///
/// Used by the duplicate operation: the clone keeps types, props and
/// geometry but must not alias any id already in the page.
pub fn reassign_subtree_ids(node: &mut ComponentNode, idgen: &mut IdGenerator) {
    node.id = idgen.new_id();
    for child in &mut node.children {
        reassign_subtree_ids(child, idgen);
    }
}

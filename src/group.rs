//! Group builder: size-bounded batches for combination.

use crate::asset::ClassifiedReference;
use crate::debug;

/// References combined into one generated file, in load order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<'a> {
    items: Vec<&'a ClassifiedReference>,
    total: u64,
}

impl<'a> Batch<'a> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    fn push(&mut self, item: &'a ClassifiedReference) {
        self.total += item.file_size.unwrap_or(0);
        self.items.push(item);
    }

    pub fn items(&self) -> &[&'a ClassifiedReference] {
        &self.items
    }

    /// Summed file size in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.total
    }

    /// Source URLs in order, the registry input for this batch.
    pub fn sources(&self) -> Vec<String> {
        self.items.iter().map(|r| r.url().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split `refs` into consecutive batches of at most `max_bytes` each.
///
/// Greedy single pass: a reference that would push the running total over
/// the ceiling closes the current batch and opens the next one. A single
/// reference above the ceiling still gets a batch of its own.
pub fn group<'a, I>(refs: I, max_bytes: u64) -> Vec<Batch<'a>>
where
    I: IntoIterator<Item = &'a ClassifiedReference>,
{
    let mut batches = Vec::new();
    let mut current = Batch::new();

    for item in refs {
        let size = item.file_size.unwrap_or(0);
        if !current.is_empty() && current.total + size > max_bytes {
            batches.push(std::mem::replace(&mut current, Batch::new()));
        }
        current.push(item);
    }
    if !current.is_empty() {
        batches.push(current);
    }

    if batches.len() > 1 {
        debug!("group"; "split into {} batches", batches.len());
    }
    batches
}

use std::collections::{HashSet, VecDeque};

use crate::{BlockPos, MaterialId};

/// How a frontier entry was reached from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryClass {
    /// Same column as the parent (above or below).
    Vertical,
    /// Same layer as the parent, or a seed from a global search.
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrontierEntry {
    pub pos: BlockPos,
    pub class: DiscoveryClass,
}

/// Search frontier plus the visited set of one harvest session.
///
/// Vertical continuations are explored before lateral spread: vertical
/// neighbours go to the front of the queue, horizontal ones to the back.
/// A position is enqueued at most once per frontier.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<BlockPos>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `pos` as a fresh seed. Returns `false` if it was already visited.
    pub fn seed(&mut self, pos: BlockPos) -> bool {
        if !self.visited.insert(pos) {
            return false;
        }
        self.queue.push_back(FrontierEntry {
            pos,
            class: DiscoveryClass::Horizontal,
        });
        true
    }

    /// Enqueues every unvisited face neighbour of `pos` whose current material
    /// is `material`, returning how many were added.
    ///
    /// Vertical neighbours found in one call keep their up-then-down order at the
    /// front of the queue.
    pub fn expand_from<F>(&mut self, pos: BlockPos, material: MaterialId, mut material_at: F) -> usize
    where
        F: FnMut(BlockPos) -> Option<MaterialId>,
    {
        let mut vertical = Vec::with_capacity(2);
        let mut added = 0;

        for neighbour in pos.neighbours() {
            if self.visited.contains(&neighbour) || material_at(neighbour) != Some(material) {
                continue;
            }
            self.visited.insert(neighbour);
            added += 1;
            if pos.is_vertical_to(neighbour) {
                vertical.push(neighbour);
            } else {
                self.queue.push_back(FrontierEntry {
                    pos: neighbour,
                    class: DiscoveryClass::Horizontal,
                });
            }
        }

        for neighbour in vertical.into_iter().rev() {
            self.queue.push_front(FrontierEntry {
                pos: neighbour,
                class: DiscoveryClass::Vertical,
            });
        }

        added
    }

    pub fn next(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_visited(&self, pos: BlockPos) -> bool {
        self.visited.contains(&pos)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Pending entries, front first.
    pub fn entries(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.queue.iter()
    }
}

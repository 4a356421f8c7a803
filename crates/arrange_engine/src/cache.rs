//! Visual element cache
//!
//! Nodes live in a slot arena indexed by path. A slot keeps its index while
//! the path stays in use, so a [`VeHandle`] taken in one pass still reaches
//! the node after later passes overwrite it.
//!
//! Two kinds of pass are supported:
//! - a full pass touches every reachable path and evicts everything else
//!   when it finishes;
//! - a partial pass redoes one subtree and only evicts descendants of that
//!   subtree that were not touched.

use crate::{ArrangeError, Result, VePath, Veid, VisualElement};
use std::collections::{HashMap, HashSet};

/// Stable reference to a cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VeHandle {
    index: usize,
    generation: u64,
}

/// Running counts of cache activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub created: u64,
    pub recycled_unchanged: u64,
    pub recycled_changed: u64,
    pub evicted: u64,
    pub full_passes: u64,
    pub partial_passes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pass {
    Full,
    Partial(VePath),
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    node: Option<VisualElement>,
    touched_in: u64,
}

#[derive(Debug, Default)]
pub struct VesCache {
    slots: Vec<Slot>,
    free: Vec<usize>,
    index: HashMap<VePath, usize>,
    pass: Option<Pass>,
    pass_number: u64,
    evaluation_required: HashSet<VePath>,
    stats: CacheStats,
}

impl VesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn in_pass(&self) -> bool {
        self.pass.is_some()
    }

    fn begin(&mut self, pass: Pass) -> Result<()> {
        if self.pass.is_some() {
            tracing::error!("arrange pass started while another is running");
            return Err(ArrangeError::ReentrantArrange);
        }
        self.pass_number += 1;
        self.pass = Some(pass);
        Ok(())
    }

    /// Start a pass that will evict every path it does not touch
    pub fn begin_full(&mut self) -> Result<()> {
        self.begin(Pass::Full)?;
        self.evaluation_required.clear();
        Ok(())
    }

    /// Start a pass that redoes the subtree at `subtree`
    pub fn begin_partial(&mut self, subtree: &VePath) -> Result<()> {
        self.begin(Pass::Partial(subtree.clone()))?;
        self.evaluation_required.retain(|p| !p.is_same_or_descendant_of(subtree));
        Ok(())
    }

    /// End a full pass. Returns the number of evicted nodes.
    pub fn finish_full(&mut self) -> Result<usize> {
        match self.pass.take() {
            Some(Pass::Full) => {}
            other => {
                self.pass = other;
                return Err(ArrangeError::NoPassRunning);
            }
        }
        self.stats.full_passes += 1;
        let stale: Vec<VePath> = self
            .index
            .iter()
            .filter(|(_, idx)| self.slots[**idx].touched_in != self.pass_number)
            .map(|(path, _)| path.clone())
            .collect();
        Ok(self.evict_all(stale))
    }

    /// End a partial pass. Returns the number of evicted nodes.
    pub fn finish_partial(&mut self) -> Result<usize> {
        let subtree = match self.pass.take() {
            Some(Pass::Partial(subtree)) => subtree,
            other => {
                self.pass = other;
                return Err(ArrangeError::NoPassRunning);
            }
        };
        self.stats.partial_passes += 1;
        let stale: Vec<VePath> = self
            .index
            .iter()
            .filter(|(path, idx)| {
                path.is_descendant_of(&subtree) && self.slots[**idx].touched_in != self.pass_number
            })
            .map(|(path, _)| path.clone())
            .collect();
        Ok(self.evict_all(stale))
    }

    /// Close a pass that failed, leaving every node in place
    pub fn abandon(&mut self) {
        if self.pass.take().is_some() {
            tracing::warn!("arrange pass abandoned");
        }
    }

    fn evict_all(&mut self, paths: Vec<VePath>) -> usize {
        let count = paths.len();
        for path in paths {
            if let Some(idx) = self.index.remove(&path) {
                let slot = &mut self.slots[idx];
                slot.node = None;
                slot.generation += 1;
                self.free.push(idx);
                self.evaluation_required.remove(&path);
            }
        }
        self.stats.evicted += count as u64;
        count
    }

    /// Store a node at its path. An existing node at the path is overwritten
    /// in full and keeps its slot.
    pub fn create_or_recycle(&mut self, node: VisualElement) -> Result<VeHandle> {
        if self.pass.is_none() {
            return Err(ArrangeError::NoPassRunning);
        }
        let pass_number = self.pass_number;
        if let Some(&idx) = self.index.get(&node.path) {
            let slot = &mut self.slots[idx];
            let changed = slot.node.as_ref() != Some(&node);
            if changed {
                self.stats.recycled_changed += 1;
            } else {
                self.stats.recycled_unchanged += 1;
            }
            tracing::trace!(path = %node.path, changed, "recycled visual element");
            slot.node = Some(node);
            slot.touched_in = pass_number;
            return Ok(VeHandle {
                index: idx,
                generation: slot.generation,
            });
        }

        tracing::trace!(path = %node.path, "created visual element");
        self.stats.created += 1;
        let path = node.path.clone();
        let idx = match self.free.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx];
                slot.node = Some(node);
                slot.touched_in = pass_number;
                idx
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                    touched_in: pass_number,
                });
                self.slots.len() - 1
            }
        };
        self.index.insert(path, idx);
        Ok(VeHandle {
            index: idx,
            generation: self.slots[idx].generation,
        })
    }

    /// Mark a node and everything under it as current without rebuilding it
    pub fn touch_subtree(&mut self, path: &VePath) -> Result<()> {
        if self.pass.is_none() {
            return Err(ArrangeError::NoPassRunning);
        }
        let pass_number = self.pass_number;
        for (p, idx) in self.index.iter() {
            if p.is_same_or_descendant_of(path) {
                self.slots[*idx].touched_in = pass_number;
            }
        }
        Ok(())
    }

    pub fn get(&self, path: &VePath) -> Option<&VisualElement> {
        self.index.get(path).and_then(|idx| self.slots[*idx].node.as_ref())
    }

    pub fn handle(&self, path: &VePath) -> Option<VeHandle> {
        self.index.get(path).map(|idx| VeHandle {
            index: *idx,
            generation: self.slots[*idx].generation,
        })
    }

    /// Node behind a handle, None once the slot has been evicted
    pub fn get_by_handle(&self, handle: VeHandle) -> Option<&VisualElement> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Node at a path that must be present
    pub fn require(&self, path: &VePath) -> Result<&VisualElement> {
        self.get(path).ok_or_else(|| {
            tracing::error!(path = %path, "no visual element cached at path");
            ArrangeError::CacheMiss(path.clone())
        })
    }

    /// Every path currently showing the given Veid
    pub fn find(&self, veid: Veid) -> Vec<VePath> {
        let mut paths: Vec<VePath> = self.index.keys().filter(|p| p.veid() == veid).cloned().collect();
        paths.sort_by_key(|p| p.depth());
        paths
    }

    /// The one node showing the given Veid. More or fewer is an error.
    pub fn find_single(&self, veid: Veid) -> Result<&VisualElement> {
        let paths = self.find(veid);
        match paths.as_slice() {
            [path] => self.require(path),
            [] => Err(ArrangeError::CacheMiss(crate::VePath::root(veid))),
            [first, ..] => Err(ArrangeError::invariant(
                first,
                format!("{} visual elements show {}", paths.len(), veid),
            )),
        }
    }

    /// Other children of the node's parent, in order
    pub fn siblings(&self, path: &VePath) -> Result<Vec<VePath>> {
        let parent_path = match path.parent() {
            Some(parent_path) => parent_path,
            None => return Ok(Vec::new()),
        };
        let parent = self.require(&parent_path)?;
        Ok(parent.children.iter().filter(|c| *c != path).cloned().collect())
    }

    pub fn mark_evaluation_required(&mut self, path: &VePath) {
        self.evaluation_required.insert(path.clone());
    }

    /// Expression nodes that need their value computed before display
    pub fn evaluation_required(&self) -> impl Iterator<Item = &VePath> {
        self.evaluation_required.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &VePath> {
        self.index.keys()
    }
}

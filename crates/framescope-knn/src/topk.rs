//! Bounded top-k accumulators.
//!
//! A single linear scan offers every `(index, score)` pair to an accumulator
//! that keeps the `k` best under [`Objective::rank`]. Both implementations
//! keep exactly the same set and return it in the same order, ties included:
//! equal scores rank by ascending corpus index.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metric::Objective;

/// A scored corpus position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub score: f32,
}

/// Bounded best-so-far working set for one scan.
pub trait TopK {
    fn new(k: usize, objective: Objective) -> Self
    where
        Self: Sized;

    /// Consider one candidate. NaN scores are never admitted; every other
    /// score, infinities included, competes for a slot.
    fn offer(&mut self, index: usize, score: f32);

    /// Retained candidates, best first.
    fn into_ranked(self) -> Vec<Candidate>
    where
        Self: Sized;
}

/// Which [`TopK`] implementation a query uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accumulator {
    /// Replace-the-worst over a flat array; O(n·k).
    #[default]
    Linear,
    /// Bounded binary heap; O(n·log k).
    Heap,
}

impl fmt::Display for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accumulator::Linear => f.write_str("linear"),
            Accumulator::Heap => f.write_str("heap"),
        }
    }
}

impl FromStr for Accumulator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(Accumulator::Linear),
            "heap" => Ok(Accumulator::Heap),
            other => Err(format!(
                "unknown accumulator `{other}` (expected `linear` or `heap`)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Linear
// ---------------------------------------------------------------------------

/// Flat array of at most `k` slots; each admission scans for the worst slot.
#[derive(Debug, Clone)]
pub struct LinearTopK {
    k: usize,
    objective: Objective,
    slots: Vec<Candidate>,
}

impl LinearTopK {
    fn worst_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| self.objective.rank(a, b))
            .map(|(slot, _)| slot)
    }
}

impl TopK for LinearTopK {
    fn new(k: usize, objective: Objective) -> Self {
        Self {
            k,
            objective,
            slots: Vec::with_capacity(k),
        }
    }

    fn offer(&mut self, index: usize, score: f32) {
        if self.k == 0 || !self.objective.admits(score) {
            return;
        }
        let candidate = Candidate { index, score };
        if self.slots.len() < self.k {
            self.slots.push(candidate);
            return;
        }
        if let Some(worst) = self.worst_slot() {
            if self.objective.rank(&candidate, &self.slots[worst]) == Ordering::Less {
                self.slots[worst] = candidate;
            }
        }
    }

    fn into_ranked(mut self) -> Vec<Candidate> {
        let objective = self.objective;
        self.slots.sort_by(|a, b| objective.rank(a, b));
        self.slots
    }
}

// ---------------------------------------------------------------------------
// Heap
// ---------------------------------------------------------------------------

/// Heap entry ordered so that the heap's maximum is the worst candidate.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    candidate: Candidate,
    objective: Objective,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.objective.rank(&self.candidate, &other.candidate)
    }
}

/// Bounded max-heap of the `k` best; the root is the current worst.
#[derive(Debug, Clone)]
pub struct HeapTopK {
    k: usize,
    objective: Objective,
    heap: BinaryHeap<Ranked>,
}

impl TopK for HeapTopK {
    fn new(k: usize, objective: Objective) -> Self {
        Self {
            k,
            objective,
            heap: BinaryHeap::with_capacity(k),
        }
    }

    fn offer(&mut self, index: usize, score: f32) {
        if self.k == 0 || !self.objective.admits(score) {
            return;
        }
        let entry = Ranked {
            candidate: Candidate { index, score },
            objective: self.objective,
        };
        if self.heap.len() < self.k {
            self.heap.push(entry);
        } else if let Some(mut worst) = self.heap.peek_mut() {
            if entry < *worst {
                *worst = entry;
            }
        }
    }

    fn into_ranked(self) -> Vec<Candidate> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|r| r.candidate)
            .collect()
    }
}

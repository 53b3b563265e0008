//! Max-priority result selection.
//!
//! Scored documents go into a priority queue keyed by query similarity;
//! popping the queue yields URLs in non-increasing score order, with
//! insertion order breaking ties so repeated runs over the same inputs
//! always produce the same list.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::SimilarityGraph;

#[derive(Debug)]
struct QueueEntry {
    score: f32,
    seq: usize,
    url: String,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher score wins; among equal scores the earlier insertion
        // ranks first.
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue yielding URLs from highest to lowest score.
#[derive(Debug, Default)]
pub struct RelevanceQueue {
    heap: BinaryHeap<QueueEntry>,
    next_seq: usize,
}

impl RelevanceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a URL under the given relevance score.
    pub fn push(&mut self, score: f32, url: impl Into<String>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            score,
            seq,
            url: url.into(),
        });
    }

    /// Remove and return the highest-scored entry.
    pub fn pop(&mut self) -> Option<(f32, String)> {
        self.heap.pop().map(|entry| (entry.score, entry.url))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Select the top `count` URLs from a similarity graph.
///
/// Returns at most `min(count, nodes)` URLs ordered by descending
/// relevance score, ties resolved by graph insertion order.
pub fn select_top(graph: &SimilarityGraph, count: usize) -> Vec<String> {
    let mut queue = RelevanceQueue::new();
    for doc in graph.documents() {
        queue.push(doc.score, doc.url.clone());
    }

    let mut selected = Vec::with_capacity(count.min(queue.len()));
    while selected.len() < count {
        match queue.pop() {
            Some((_, url)) => selected.push(url),
            None => break,
        }
    }
    selected
}

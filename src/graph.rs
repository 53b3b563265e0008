//! Similarity graph construction over fetched documents.
//!
//! Each successfully parsed page becomes a node scored against the query;
//! edges connect pairs of pages whose embeddings are geometrically close.
//! The graph is rebuilt from scratch for every search and discarded with
//! it.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::config::SearchConfig;
use crate::embedding::{cosine_similarity, Embedder};
use crate::error::Result;
use crate::types::{Document, PageContent};

/// Undirected graph over documents, keyed by URL.
///
/// Nodes keep their insertion order, which downstream ranking uses to
/// break score ties deterministically. No two nodes share a URL and no
/// node has an edge to itself.
#[derive(Debug)]
pub struct SimilarityGraph {
    graph: UnGraph<Document, f32>,
    node_index: HashMap<String, NodeIndex>,
}

impl Default for SimilarityGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityGraph {
    fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            node_index: HashMap::new(),
        }
    }

    /// Number of documents in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of similarity edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph holds no documents.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up a document by URL.
    pub fn get(&self, url: &str) -> Option<&Document> {
        self.node_index.get(url).map(|&idx| &self.graph[idx])
    }

    /// Iterate documents in insertion order.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Whether an edge exists between the documents at the two URLs.
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.edge_weight(a, b).is_some()
    }

    /// Similarity weight of the edge between two URLs, if one exists.
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<f32> {
        let ia = *self.node_index.get(a)?;
        let ib = *self.node_index.get(b)?;
        let edge = self.graph.find_edge(ia, ib)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Add a document node. Returns `false` if the URL is already present.
    pub(crate) fn add_document(&mut self, doc: Document) -> bool {
        if self.node_index.contains_key(&doc.url) {
            return false;
        }
        let url = doc.url.clone();
        let idx = self.graph.add_node(doc);
        self.node_index.insert(url, idx);
        true
    }
}

/// Builds a [`SimilarityGraph`] from parsed pages and a query.
pub struct SimilarityGraphBuilder {
    embedder: Arc<dyn Embedder>,
    threshold: f32,
    max_embed_chars: usize,
}

impl SimilarityGraphBuilder {
    /// Create a builder using the pipeline's embedder and tuning.
    pub fn new(embedder: Arc<dyn Embedder>, config: &SearchConfig) -> Self {
        Self {
            embedder,
            threshold: config.similarity_threshold,
            max_embed_chars: config.max_embed_chars,
        }
    }

    /// Build the similarity graph for `pages` scored against `query`.
    ///
    /// The query is embedded once; each page's text is cut to the
    /// embedding cap, embedded, and scored by cosine similarity against
    /// the query embedding. Pages arriving with a URL already in the
    /// graph are skipped (first occurrence wins). Finally every
    /// unordered pair of distinct nodes gets an edge iff their pairwise
    /// similarity strictly exceeds the threshold. Pairwise comparison is
    /// O(n²), fine for the tens of candidates a single search produces.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Embedding`](crate::error::SearchError::Embedding)
    /// if the query or any page fails to embed. Scoring cannot proceed
    /// partially, so the caller degrades to its unranked fallback.
    pub fn build(&self, pages: &[PageContent], query: &str) -> Result<SimilarityGraph> {
        let mut graph = SimilarityGraph::new();

        let query_embedding = self.embedder.embed(query)?;

        for page in pages {
            if graph.node_index.contains_key(&page.url) {
                tracing::debug!(url = %page.url, "skipping duplicate candidate URL");
                continue;
            }
            let text = truncate_chars(&page.text, self.max_embed_chars);
            let embedding = self.embedder.embed(text)?;
            let score = cosine_similarity(&embedding, &query_embedding);
            graph.add_document(Document {
                url: page.url.clone(),
                title: page.title.clone(),
                text: page.text.clone(),
                embedding,
                score,
            });
        }

        let indices: Vec<NodeIndex> = graph.graph.node_indices().collect();
        for (i, &a) in indices.iter().enumerate() {
            for &b in &indices[i + 1..] {
                let sim =
                    cosine_similarity(&graph.graph[a].embedding, &graph.graph[b].embedding);
                if sim > self.threshold {
                    graph.graph.add_edge(a, b, sim);
                }
            }
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "similarity graph built"
        );
        Ok(graph)
    }
}

/// Cut text to at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

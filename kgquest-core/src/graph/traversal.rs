//! Depth-limited depth-first edge walk.

use super::KnowledgeGraph;

/// One tree edge discovered by [`KnowledgeGraph::dfs_edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversedEdge<'g> {
    /// Node the walk came from.
    pub source: &'g str,
    /// Newly discovered node.
    pub target: &'g str,
    /// Label of the first `source -> target` edge.
    pub label: &'g str,
}

impl KnowledgeGraph {
    /// Walk outgoing edges depth-first from `source`, at most `depth_limit`
    /// hops deep.
    ///
    /// Each node is discovered at most once per walk, so only tree edges are
    /// reported, in discovery order. Cycles terminate naturally. An unknown
    /// source or a zero limit yields nothing.
    #[must_use]
    pub fn dfs_edges(&self, source: &str, depth_limit: usize) -> Vec<TraversedEdge<'_>> {
        let mut edges = Vec::new();
        let Some(&start) = self.index.get(source) else {
            return edges;
        };
        if depth_limit == 0 {
            return edges;
        }

        let mut visited = vec![false; self.names.len()];
        visited[start] = true;
        // (node, index of the next adjacency entry to try)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        let mut depth = 1;

        while let Some(top) = stack.last_mut() {
            let parent = top.0;
            let children = &self.successors[parent];
            let mut discovered = None;
            while top.1 < children.len() {
                let adj = &children[top.1];
                top.1 += 1;
                if !visited[adj.target] {
                    visited[adj.target] = true;
                    edges.push(TraversedEdge {
                        source: &self.names[parent],
                        target: &self.names[adj.target],
                        label: adj.labels.first().map_or("", String::as_str),
                    });
                    discovered = Some(adj.target);
                    break;
                }
            }

            match discovered {
                Some(child) => {
                    if depth < depth_limit {
                        stack.push((child, 0));
                        depth += 1;
                    }
                }
                None => {
                    stack.pop();
                    depth -= 1;
                }
            }
        }

        edges
    }
}

use indexmap::IndexMap;

use super::candidate::RankingError;

/// Directed graph with weighted edges, indexed by node position.
#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
    out: Vec<IndexMap<usize, f64>>,
}

impl WeightedGraph {
    /// Graph with `nodes` isolated nodes.
    #[must_use]
    pub fn new(nodes: usize) -> Self {
        Self {
            out: vec![IndexMap::new(); nodes],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// True when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Sets the weight of `from -> to`.
    pub fn set_edge(&mut self, from: usize, to: usize, weight: f64) {
        self.out[from].insert(to, weight);
    }

    /// Adds `delta` to an existing edge, creating it when absent.
    pub fn bump_edge(&mut self, from: usize, to: usize, delta: f64) {
        *self.out[from].entry(to).or_insert(0.0) += delta;
    }

    /// Weight of `from -> to`, if the edge exists.
    #[must_use]
    pub fn weight(&self, from: usize, to: usize) -> Option<f64> {
        self.out[from].get(&to).copied()
    }

    /// Outgoing edges of `node` in insertion order.
    pub fn edges(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.out[node].iter().map(|(&to, &weight)| (to, weight))
    }
}

/// Weighted PageRank by power iteration with uniform teleport and dangling
/// mass.
///
/// Converges when the L1 change drops below `nodes * tolerance`.
pub fn pagerank(
    graph: &WeightedGraph,
    damping: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Vec<f64>, RankingError> {
    let n = graph.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    #[allow(clippy::cast_precision_loss)]
    let nf = n as f64;
    let strength: Vec<f64> = (0..n)
        .map(|i| graph.edges(i).map(|(_, w)| w).sum())
        .collect();
    let mut scores = vec![1.0 / nf; n];
    for _ in 0..max_iterations {
        let dangling: f64 = (0..n)
            .filter(|&i| strength[i] <= 0.0)
            .map(|i| scores[i])
            .sum();
        let base = damping.mul_add(dangling, 1.0 - damping) / nf;
        let mut next = vec![base; n];
        for (i, &total) in strength.iter().enumerate() {
            if total <= 0.0 {
                continue;
            }
            let share = damping * scores[i] / total;
            for (j, weight) in graph.edges(i) {
                next[j] += share * weight;
            }
        }
        let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
        scores = next;
        if delta < nf * tolerance {
            return Ok(scores);
        }
    }
    Err(RankingError::Convergence {
        iterations: max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_nodes_share_rank_equally() {
        let graph = WeightedGraph::new(4);
        let scores = pagerank(&graph, 0.85, 1e-6, 100).unwrap();
        for score in scores {
            assert!((score - 0.25).abs() < 1e-9);
        }
    }

    #[test]
    fn hub_collects_more_rank() {
        let mut graph = WeightedGraph::new(3);
        graph.set_edge(1, 0, 1.0);
        graph.set_edge(2, 0, 1.0);
        graph.set_edge(0, 1, 1.0);
        let scores = pagerank(&graph, 0.85, 1e-6, 500).unwrap();
        assert!(scores[0] > scores[1]);
        assert!(scores[1] > scores[2]);
        let total: f64 = scores.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bump_creates_and_accumulates() {
        let mut graph = WeightedGraph::new(2);
        graph.bump_edge(0, 1, 0.5);
        graph.bump_edge(0, 1, 0.25);
        assert_eq!(graph.weight(0, 1), Some(0.75));
        assert_eq!(graph.weight(1, 0), None);
    }

    #[test]
    fn zero_iterations_fail_to_converge() {
        let graph = WeightedGraph::new(2);
        let err = pagerank(&graph, 0.85, 1e-6, 0).unwrap_err();
        assert!(matches!(err, RankingError::Convergence { iterations: 0 }));
    }
}

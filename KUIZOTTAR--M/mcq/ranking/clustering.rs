use std::collections::BTreeSet;

/// Jaccard distance between two word sets; 1.0 when both are empty.
#[must_use]
pub fn jaccard_distance(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    let shared = a.intersection(b).count();
    #[allow(clippy::cast_precision_loss)]
    let similarity = shared as f64 / union as f64;
    1.0 - similarity
}

/// Groups word sets with average-linkage agglomerative clustering, merging
/// while the closest pair of clusters is at most `threshold` apart.
///
/// The dendrogram is built with the nearest-neighbour chain, quadratic in the
/// number of inputs, then cut at `threshold`. Returns a topic id per input,
/// numbered by first member.
#[must_use]
pub fn cluster_topics(word_sets: &[BTreeSet<String>], threshold: f64) -> Vec<usize> {
    let n = word_sets.len();
    let mut distances = vec![0.0_f64; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = jaccard_distance(&word_sets[i], &word_sets[j]);
            distances[i * n + j] = d;
            distances[j * n + i] = d;
        }
    }

    let mut parents: Vec<usize> = (0..n).collect();
    for (a, b, d) in linkage(&mut distances, n) {
        if d <= threshold {
            let (ra, rb) = (find_root(&mut parents, a), find_root(&mut parents, b));
            parents[ra.max(rb)] = ra.min(rb);
        }
    }

    let mut topics = vec![0; n];
    let mut numbering: Vec<Option<usize>> = vec![None; n];
    let mut next = 0;
    for (member, topic) in topics.iter_mut().enumerate() {
        let root = find_root(&mut parents, member);
        *topic = *numbering[root].get_or_insert_with(|| {
            next += 1;
            next - 1
        });
    }
    topics
}

/// Average-linkage merges `(a, b, distance)` over an `n x n` distance matrix,
/// which is overwritten with inter-cluster distances.
fn linkage(distances: &mut [f64], n: usize) -> Vec<(usize, usize, f64)> {
    let mut sizes = vec![1_usize; n];
    let mut active = vec![true; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));
    let mut chain: Vec<usize> = Vec::new();
    while merges.len() + 1 < n {
        if chain.is_empty() {
            if let Some(first) = active.iter().position(|&alive| alive) {
                chain.push(first);
            }
        }
        let Some(&tip) = chain.last() else {
            break;
        };
        let previous = chain.len().checked_sub(2).map(|idx| chain[idx]);
        // Ties go to the previous link so the chain always terminates.
        let mut nearest = previous.map(|p| (p, distances[tip * n + p]));
        for k in (0..n).filter(|&k| active[k] && k != tip) {
            let d = distances[tip * n + k];
            let closer = match nearest {
                Some((_, best)) => d < best,
                None => true,
            };
            if closer {
                nearest = Some((k, d));
            }
        }
        let Some((neighbour, d)) = nearest else {
            break;
        };
        if Some(neighbour) != previous {
            chain.push(neighbour);
            continue;
        }
        chain.truncate(chain.len() - 2);
        let (keep, absorb) = (tip.min(neighbour), tip.max(neighbour));
        #[allow(clippy::cast_precision_loss)]
        let (wk, wa) = (sizes[keep] as f64, sizes[absorb] as f64);
        for k in (0..n).filter(|&k| active[k] && k != keep && k != absorb) {
            let merged =
                wk.mul_add(distances[keep * n + k], wa * distances[absorb * n + k]) / (wk + wa);
            distances[keep * n + k] = merged;
            distances[k * n + keep] = merged;
        }
        sizes[keep] += sizes[absorb];
        active[absorb] = false;
        merges.push((keep, absorb, d));
    }
    merges
}

fn find_root(parents: &mut [usize], mut node: usize) -> usize {
    while parents[node] != node {
        parents[node] = parents[parents[node]];
        node = parents[node];
    }
    node
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn jaccard_distance_bounds() {
        assert!((jaccard_distance(&set(&["a"]), &set(&["a"])) - 0.0).abs() < f64::EPSILON);
        assert!((jaccard_distance(&set(&["a"]), &set(&["b"])) - 1.0).abs() < f64::EPSILON);
        let half = jaccard_distance(&set(&["cell", "wall"]), &set(&["cell"]));
        assert!((half - 0.5).abs() < 1e-9);
    }

    #[test]
    fn overlapping_phrases_share_a_topic() {
        let sets = vec![
            set(&["cell"]),
            set(&["energy"]),
            set(&["cell", "wall"]),
            set(&["plant", "cell", "wall"]),
        ];
        let topics = cluster_topics(&sets, 0.74);
        assert_eq!(topics[0], topics[2]);
        assert_eq!(topics[2], topics[3]);
        assert_ne!(topics[0], topics[1]);
        assert_eq!(topics[0], 0);
        assert_eq!(topics[1], 1);
    }

    #[test]
    fn empty_input_yields_no_topics() {
        assert!(cluster_topics(&[], 0.74).is_empty());
        assert_eq!(cluster_topics(&[set(&["cell"])], 0.74), vec![0]);
    }

    #[test]
    fn merge_order_follows_average_distance() {
        // {a,b,c} and {b,c} join first; {a} then sits 0.83 away on average.
        let sets = vec![set(&["a"]), set(&["a", "b", "c"]), set(&["b", "c"])];
        let topics = cluster_topics(&sets, 0.74);
        assert_eq!(topics, vec![0, 1, 1]);
        assert_eq!(cluster_topics(&sets, 0.85), vec![0, 0, 0]);
    }

    #[test]
    fn thousands_of_phrases_cluster_quickly() {
        let sets: Vec<BTreeSet<String>> = (0..2400)
            .map(|i| {
                [format!("shared{}", i / 2), format!("own{i}")]
                    .into_iter()
                    .collect()
            })
            .collect();
        let started = Instant::now();
        let topics = cluster_topics(&sets, 0.74);
        let elapsed = started.elapsed();
        for (i, topic) in topics.iter().enumerate() {
            assert_eq!(*topic, i / 2);
        }
        assert!(elapsed < Duration::from_secs(30), "clustering took {elapsed:?}");
    }
}

//! Ranking quality metrics.

use ordered_float::OrderedFloat;

/// Discounted cumulative gain of labels already in rank order, cut at
/// `k`.
pub fn dcg_at_k(labels_in_rank_order: &[u8], k: usize) -> f64 {
    labels_in_rank_order
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, &label)| gain(label) * discount(i))
        .sum()
}

/// Normalized DCG of `scores` against `labels`, cut at `k`.
///
/// Candidates are ranked by score descending. A group with no relevant
/// labels has an ideal DCG of zero and scores 1.0 — there is nothing to
/// misrank.
pub fn ndcg_at_k(scores: &[f64], labels: &[u8], k: usize) -> f64 {
    debug_assert_eq!(scores.len(), labels.len());

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(scores[i])));
    let ranked: Vec<u8> = order.iter().map(|&i| labels[i]).collect();

    let mut ideal = labels.to_vec();
    ideal.sort_unstable_by(|a, b| b.cmp(a));

    let idcg = dcg_at_k(&ideal, k);
    if idcg == 0.0 {
        return 1.0;
    }
    dcg_at_k(&ranked, k) / idcg
}

/// Exponential gain for graded relevance.
pub(crate) fn gain(label: u8) -> f64 {
    (1u32 << label) as f64 - 1.0
}

/// Logarithmic position discount; position is zero-based.
pub(crate) fn discount(position: usize) -> f64 {
    1.0 / ((position + 2) as f64).log2()
}

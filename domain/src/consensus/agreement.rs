//! Agreement scoring over normalized answers

use super::normalize::normalize_answer;
use std::collections::HashMap;

/// Fraction of unordered answer pairs that agree after normalization.
///
/// Empty answers are dropped first; with at most one answer left there is
/// nothing to disagree about and the rate is `1.0`.
///
/// # Example
///
/// ```
/// use consensus_domain::pairwise_agreement;
///
/// assert_eq!(pairwise_agreement::<&str>(&[]), 1.0);
/// assert!((pairwise_agreement(&["a", "a", "b"]) - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn pairwise_agreement<S: AsRef<str>>(answers: &[S]) -> f64 {
    let clean: Vec<String> = answers
        .iter()
        .map(|a| normalize_answer(a.as_ref()))
        .filter(|a| !a.is_empty())
        .collect();

    let n = clean.len();
    if n <= 1 {
        return 1.0;
    }

    let mut agree = 0usize;
    let mut total = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            total += 1;
            if clean[i] == clean[j] {
                agree += 1;
            }
        }
    }

    if total == 0 {
        return 1.0;
    }
    agree as f64 / total as f64
}

/// Token-overlap F1 between a prediction and a reference answer.
///
/// Both sides are normalized and split on whitespace into token multisets.
pub fn token_f1(prediction: &str, truth: &str) -> f64 {
    let pred_norm = normalize_answer(prediction);
    let truth_norm = normalize_answer(truth);
    let pred_tokens: Vec<&str> = pred_norm.split_whitespace().collect();
    let truth_tokens: Vec<&str> = truth_norm.split_whitespace().collect();

    match (pred_tokens.is_empty(), truth_tokens.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let mut truth_counts: HashMap<&str, usize> = HashMap::new();
    for token in &truth_tokens {
        *truth_counts.entry(token).or_default() += 1;
    }

    let mut common = 0usize;
    for token in &pred_tokens {
        if let Some(count) = truth_counts.get_mut(token)
            && *count > 0
        {
            *count -= 1;
            common += 1;
        }
    }

    if common == 0 {
        return 0.0;
    }

    let precision = common as f64 / pred_tokens.len() as f64;
    let recall = common as f64 / truth_tokens.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_agreement_trivial_cases() {
        assert_eq!(pairwise_agreement::<&str>(&[]), 1.0);
        assert_eq!(pairwise_agreement(&["x"]), 1.0);
        assert_eq!(pairwise_agreement(&["x", "", "  "]), 1.0);
    }

    #[test]
    fn test_agreement_partial() {
        assert!(approx(pairwise_agreement(&["a", "a", "b"]), 1.0 / 3.0));
        assert!(approx(pairwise_agreement(&["7", "7.", "**7**"]), 1.0));
        assert!(approx(pairwise_agreement(&["x", "y"]), 0.0));
    }

    #[test]
    fn test_agreement_ignores_empty() {
        assert!(approx(pairwise_agreement(&["x", "x", ""]), 1.0));
    }

    #[test]
    fn test_token_f1_edges() {
        assert_eq!(token_f1("", ""), 1.0);
        assert_eq!(token_f1("paris", ""), 0.0);
        assert_eq!(token_f1("", "paris"), 0.0);
        assert_eq!(token_f1("rome", "paris"), 0.0);
        assert_eq!(token_f1("Paris!", "paris"), 1.0);
    }

    #[test]
    fn test_token_f1_partial_overlap() {
        // precision 1/2, recall 1/1 -> f1 = 2/3
        assert!(approx(token_f1("new york", "york"), 2.0 / 3.0));
    }

    #[test]
    fn test_token_f1_multiset_counts() {
        // pred: the the cat (3), truth: the cat (2), common = 2
        // precision 2/3, recall 1 -> f1 = 0.8
        assert!(approx(token_f1("the the cat", "the cat"), 0.8));
    }
}

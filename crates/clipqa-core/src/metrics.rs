//! Text-similarity metrics for generated answers.
//!
//! Sentence-level BLEU, ROUGE-L and exact-match METEOR over a shared
//! tokenizer. All scores fall in [0, 1].

use std::collections::HashMap;

const BLEU_MAX_ORDER: usize = 4;

const METEOR_ALPHA: f64 = 0.9;
const METEOR_BETA: f64 = 3.0;
const METEOR_GAMMA: f64 = 0.5;

/// Lowercase tokenization: runs of alphanumerics are word tokens, every other
/// non-whitespace character is its own token.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word.extend(ch.to_lowercase());
        } else {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if !ch.is_whitespace() {
                tokens.push(ch.to_string());
            }
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// Sentence BLEU: modified n-gram precisions up to order 4, geometric mean,
/// brevity penalty. No smoothing, so any empty precision zeroes the score.
pub fn bleu(candidate: &[String], reference: &[String]) -> f64 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let mut log_precision_sum = 0.0;
    for n in 1..=BLEU_MAX_ORDER {
        let possible = candidate.len().saturating_sub(n - 1);
        if possible == 0 {
            return 0.0;
        }

        let candidate_counts = ngram_counts(candidate, n);
        let reference_counts = ngram_counts(reference, n);
        let matched: usize = candidate_counts
            .iter()
            .map(|(gram, &count)| count.min(reference_counts.get(*gram).copied().unwrap_or(0)))
            .sum();
        if matched == 0 {
            return 0.0;
        }

        log_precision_sum += (matched as f64 / possible as f64).ln();
    }

    let precision = (log_precision_sum / BLEU_MAX_ORDER as f64).exp();
    let brevity_penalty = if candidate.len() >= reference.len() {
        1.0
    } else {
        (1.0 - reference.len() as f64 / candidate.len() as f64).exp()
    };
    precision * brevity_penalty
}

fn lcs_len(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// ROUGE-L F-measure over the token-level longest common subsequence.
pub fn rouge_l(candidate: &[String], reference: &[String]) -> f64 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }
    let lcs = lcs_len(candidate, reference) as f64;
    if lcs == 0.0 {
        return 0.0;
    }
    let precision = lcs / candidate.len() as f64;
    let recall = lcs / reference.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Exact-match METEOR: recall-weighted harmonic mean of unigram precision and
/// recall, discounted by a fragmentation penalty over match chunks.
pub fn meteor(candidate: &[String], reference: &[String]) -> f64 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }

    // Greedy left-to-right alignment: each candidate token takes the first
    // unmatched identical reference token.
    let mut reference_used = vec![false; reference.len()];
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (ci, token) in candidate.iter().enumerate() {
        let matched = reference
            .iter()
            .enumerate()
            .find(|(ri, reference_token)| !reference_used[*ri] && *reference_token == token)
            .map(|(ri, _)| ri);
        if let Some(ri) = matched {
            reference_used[ri] = true;
            pairs.push((ci, ri));
        }
    }

    let matches = pairs.len();
    if matches == 0 {
        return 0.0;
    }

    // Pairs come out ordered by candidate index; a chunk ends whenever either
    // side stops being contiguous.
    let mut chunks = 1usize;
    for w in pairs.windows(2) {
        let (c0, r0) = w[0];
        let (c1, r1) = w[1];
        if c1 != c0 + 1 || r1 != r0 + 1 {
            chunks += 1;
        }
    }

    let precision = matches as f64 / candidate.len() as f64;
    let recall = matches as f64 / reference.len() as f64;
    let fmean = precision * recall / (METEOR_ALPHA * precision + (1.0 - METEOR_ALPHA) * recall);
    let penalty = METEOR_GAMMA * (chunks as f64 / matches as f64).powf(METEOR_BETA);
    fmean * (1.0 - penalty)
}

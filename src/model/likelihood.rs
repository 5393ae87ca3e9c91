// Log-likelihood and perplexity.
//
// The joint likelihood log p(w, z) is the quantity collapsed Gibbs sampling
// climbs; it is computed in closed form from the count tables using the
// Dirichlet-multinomial marginals:
//
//   log p(w | z) = K [lnG(V b) - V lnG(b)] + sum_k [sum_w lnG(n_kw + b) - lnG(n_k + V b)]
//   log p(z)     = D [lnG(K a) - K lnG(a)] + sum_d [sum_k lnG(n_dk + a) - lnG(n_d + K a)]
//
// The predictive likelihood sum_d sum_n log sum_k theta_dk phi_kw is what
// perplexity is reported on.

use anyhow::Result;
use ndarray::{ArrayView1, ArrayView2};

use crate::corpus::Document;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for `x > 0` (Lanczos approximation).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: G(x) G(1 - x) = pi / sin(pi x)
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut acc = LANCZOS_COEFFS[0];
    for (i, &c) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        acc += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// Digamma function psi(x) for `x > 0`.
pub fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    // Shift into the range where the asymptotic series is accurate
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    result + x.ln() - 0.5 * inv
        - inv2 * (1.0 / 12.0 - inv2 * (1.0 / 120.0 - inv2 * (1.0 / 252.0 - inv2 / 240.0)))
}

/// Joint log-likelihood log p(w, z) from Gibbs count tables.
pub fn joint_log_likelihood(
    doc_topic: ArrayView2<u32>,
    topic_word: ArrayView2<u32>,
    topic_totals: ArrayView1<u32>,
    alpha: f64,
    beta: f64,
) -> f64 {
    let num_topics = topic_totals.len() as f64;
    let vocab_size = topic_word.ncols() as f64;

    let mut words = num_topics * (ln_gamma(vocab_size * beta) - vocab_size * ln_gamma(beta));
    for (row, &total) in topic_word.rows().into_iter().zip(topic_totals.iter()) {
        words += row.iter().map(|&n| ln_gamma(n as f64 + beta)).sum::<f64>();
        words -= ln_gamma(total as f64 + vocab_size * beta);
    }

    let mut topics =
        doc_topic.nrows() as f64 * (ln_gamma(num_topics * alpha) - num_topics * ln_gamma(alpha));
    for row in doc_topic.rows() {
        let doc_len = row.sum();
        topics += row.iter().map(|&n| ln_gamma(n as f64 + alpha)).sum::<f64>();
        topics -= ln_gamma(doc_len as f64 + num_topics * alpha);
    }

    words + topics
}

/// Predictive log-likelihood of `documents` under topic-word matrix `phi`
/// and per-document topic mixtures `theta` (one row per document).
pub fn predictive_log_likelihood(
    phi: &[Vec<f64>],
    theta: &[Vec<f64>],
    documents: &[Document],
) -> Result<f64> {
    if theta.len() != documents.len() {
        anyhow::bail!(
            "theta has {} rows but there are {} documents",
            theta.len(),
            documents.len()
        );
    }

    let mut total = 0.0;
    for (doc, mixture) in documents.iter().zip(theta) {
        for &w in &doc.words {
            let p: f64 = mixture
                .iter()
                .zip(phi)
                .map(|(&t, topic)| t * topic.get(w).copied().unwrap_or(0.0))
                .sum();
            if p <= 0.0 {
                anyhow::bail!("Word id {w} has zero probability under the model");
            }
            total += p.ln();
        }
    }
    Ok(total)
}

/// Perplexity = exp(-log_likelihood / tokens). Lower is better.
pub fn perplexity(log_likelihood: f64, token_count: usize) -> Result<f64> {
    if token_count == 0 {
        anyhow::bail!("Cannot compute perplexity over zero tokens");
    }
    Ok((-log_likelihood / token_count as f64).exp())
}

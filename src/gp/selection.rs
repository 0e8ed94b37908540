//! Parent selection and truncation ("betters") survivor selection.
//!
//! All strategies assume **minimization** (lower fitness = better), and
//! unevaluated individuals count as worst.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"

use super::types::{Genotype, Individual};
use crate::error::{Result, RuleGpError};
use rand::Rng;
use std::cmp::Ordering;
use std::str::FromStr;

/// Total order over fitness values, best first.
///
/// `Ordering::Less` means `a` is strictly better than `b`. Infinite
/// fitness sorts after every finite value.
pub fn compare(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Parent selection strategy.
///
/// # Examples
///
/// ```
/// use u_rulegp::gp::Selection;
///
/// // Binary tournament, sampling with replacement
/// let sel = Selection::default();
/// assert_eq!(sel, Selection::Tournament { size: 2, with_replacement: true });
///
/// let sel: Selection = "rank".parse().unwrap();
/// assert_eq!(sel, Selection::Rank);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Pick `size` individuals at random and keep the best.
    ///
    /// Without replacement, a group never holds the same individual
    /// twice (the group shrinks to the population size if needed).
    /// Ties go to the first individual drawn.
    Tournament { size: usize, with_replacement: bool },

    /// Linear ranking: selection probability proportional to rank.
    ///
    /// # Complexity
    /// O(n log n) per selection (sort)
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Tournament {
            size: 2,
            with_replacement: true,
        }
    }
}

impl FromStr for Selection {
    type Err = RuleGpError;

    /// Resolves a configuration tag.
    ///
    /// `"tournament"` gives the default binary tournament; use
    /// [`EvolutionConfig::with_tournament`](super::EvolutionConfig::with_tournament)
    /// to change its size.
    fn from_str(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "tournament" => Ok(Selection::default()),
            "tournament-no-replacement" => Ok(Selection::Tournament {
                size: 2,
                with_replacement: false,
            }),
            "rank" => Ok(Selection::Rank),
            _ => Err(RuleGpError::UnknownOperator {
                kind: "selector",
                tag: tag.to_string(),
            }),
        }
    }
}

impl Selection {
    /// Selects the index of one parent.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select_index<G: Genotype, R: Rng>(&self, population: &[Individual<G>], rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );

        match *self {
            Selection::Tournament {
                size,
                with_replacement,
            } => tournament(population, size, with_replacement, rng),
            Selection::Rank => rank(population, rng),
        }
    }

    /// Selects `n` parents, cloned out of `population`.
    ///
    /// Returns an empty vector if `population` is empty.
    pub fn select<G: Genotype, R: Rng>(
        &self,
        population: &[Individual<G>],
        n: usize,
        rng: &mut R,
    ) -> Vec<Individual<G>> {
        if population.is_empty() {
            return Vec::new();
        }
        (0..n)
            .map(|_| population[self.select_index(population, rng)].clone())
            .collect()
    }
}

/// Tournament selection: draw a group, return the best (first drawn on ties).
fn tournament<G: Genotype, R: Rng>(
    population: &[Individual<G>],
    size: usize,
    with_replacement: bool,
    rng: &mut R,
) -> usize {
    let n = population.len();
    let size = size.max(1);

    let group: Vec<usize> = if with_replacement {
        (0..size).map(|_| rng.random_range(0..n)).collect()
    } else {
        rand::seq::index::sample(rng, n, size.min(n)).into_vec()
    };

    let mut best_idx = group[0];
    for &idx in &group[1..] {
        if compare(population[idx].fitness_or_worst(), population[best_idx].fitness_or_worst())
            == Ordering::Less
        {
            best_idx = idx;
        }
    }
    best_idx
}

/// Rank-based selection using linear ranking (rank 0 = best gets weight n).
fn rank<G: Genotype, R: Rng>(population: &[Individual<G>], rng: &mut R) -> usize {
    let n = population.len();
    if n == 1 {
        return 0;
    }

    let order = ranked_indices(population);

    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &original_idx) in order.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return original_idx;
        }
    }

    order[n - 1] // floating-point fallback
}

/// Indices of `population` sorted best-first; stable on ties.
fn ranked_indices<G: Genotype>(population: &[Individual<G>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| {
        compare(population[a].fitness_or_worst(), population[b].fitness_or_worst())
    });
    order
}

/// Truncation ("betters") selection.
///
/// Sorts `population` best-first (stable, so equal fitness keeps input
/// order) and keeps the first `n`. With `None`, or with `n` at least the
/// population size, the whole population is returned re-ordered.
pub fn betters<G: Genotype>(mut population: Vec<Individual<G>>, n: Option<usize>) -> Vec<Individual<G>> {
    population.sort_by(|a, b| compare(a.fitness_or_worst(), b.fitness_or_worst()));
    if let Some(n) = n {
        population.truncate(n);
    }
    population
}

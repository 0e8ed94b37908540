//! Evolution configuration.
//!
//! [`EvolutionConfig`] holds every parameter of the per-class loop.
//! [`EvolutionSettings`] is its tag-based form: operator names as
//! strings, resolved into concrete variants by [`EvolutionSettings::resolve`].

use super::evaluator::FitnessKind;
use super::selection::Selection;
use crate::error::{Result, RuleGpError};

/// Configuration for rule evolution.
///
/// # Defaults
///
/// ```
/// use u_rulegp::gp::EvolutionConfig;
///
/// let config = EvolutionConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 100);
/// assert!((config.recombination_prob - 0.8).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_rulegp::gp::{EvolutionConfig, Selection};
///
/// let config = EvolutionConfig::default()
///     .with_population_size(200)
///     .with_selection(Selection::Rank)
///     .with_copy_prob(0.2)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionConfig {
    /// Number of rules evolved per class, and parents drawn per generation.
    pub population_size: usize,

    /// Generations run for each class.
    pub max_generations: usize,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Probability of recombining a pair of parents (0.0–1.0).
    pub recombination_prob: f64,

    /// Probability of mutating an individual (0.0–1.0).
    pub mutation_prob: f64,

    /// Probability that a survivor is copied verbatim into the next
    /// candidate pool (0.0–1.0).
    pub copy_prob: f64,

    /// Scoring function.
    pub fitness: FitnessKind,

    /// Size penalty weight of [`FitnessKind::FailsComplexity`].
    pub alpha: f64,

    /// Length of the ordinal scale used by [`FitnessKind::OrdinalMae`].
    ///
    /// `None` uses the number of classes of the training metadata.
    pub ordinal_scale: Option<usize>,

    /// Class predicted when no rule fires.
    ///
    /// `None` uses the majority class of the training set.
    pub default_class: Option<usize>,

    /// Whether to evaluate individuals in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 100,
            selection: Selection::default(),
            recombination_prob: 0.8,
            mutation_prob: 0.1,
            copy_prob: 0.1,
            fitness: FitnessKind::default(),
            alpha: 0.9,
            ordinal_scale: None,
            default_class: None,
            parallel: true,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations per class.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the parent selection strategy.
    pub fn with_selection(mut self, sel: Selection) -> Self {
        self.selection = sel;
        self
    }

    /// Convenience builder for tournament selection.
    pub fn with_tournament(self, size: usize, with_replacement: bool) -> Self {
        self.with_selection(Selection::Tournament {
            size,
            with_replacement,
        })
    }

    /// Sets the recombination probability.
    pub fn with_recombination_prob(mut self, p: f64) -> Self {
        self.recombination_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_prob(mut self, p: f64) -> Self {
        self.mutation_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the elitist copy probability.
    pub fn with_copy_prob(mut self, p: f64) -> Self {
        self.copy_prob = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the scoring function.
    pub fn with_fitness(mut self, fitness: FitnessKind) -> Self {
        self.fitness = fitness;
        self
    }

    /// Sets the size penalty weight.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the ordinal scale length.
    pub fn with_ordinal_scale(mut self, num_classes: usize) -> Self {
        self.ordinal_scale = Some(num_classes);
        self
    }

    /// Sets the default class.
    pub fn with_default_class(mut self, class: usize) -> Self {
        self.default_class = Some(class);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(RuleGpError::InvalidConfig(msg.into()));

        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if self.max_generations == 0 {
            return invalid("max_generations must be at least 1");
        }
        if let Selection::Tournament { size: 0, .. } = self.selection {
            return invalid("tournament size must be at least 1");
        }
        for (name, p) in [
            ("recombination_prob", self.recombination_prob),
            ("mutation_prob", self.mutation_prob),
            ("copy_prob", self.copy_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(RuleGpError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return invalid("alpha must be finite and non-negative");
        }
        if self.ordinal_scale == Some(0) {
            return invalid("ordinal_scale must be positive or None");
        }
        Ok(())
    }
}

/// Tag-based configuration, as read from a settings file.
///
/// Operator choices are plain strings so that unknown names surface as
/// [`RuleGpError::UnknownOperator`] during setup, before any evolution.
///
/// ```
/// use u_rulegp::gp::{EvolutionSettings, Selection};
///
/// let settings = EvolutionSettings {
///     parents_selector: "tournament".into(),
///     tournament_size: 3,
///     ..EvolutionSettings::default()
/// };
/// let config = settings.resolve().unwrap();
/// assert_eq!(config.selection, Selection::Tournament { size: 3, with_replacement: true });
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct EvolutionSettings {
    pub population_size: usize,
    pub max_generations: usize,
    /// `"tournament"`, `"tournament-no-replacement"` or `"rank"`.
    pub parents_selector: String,
    pub tournament_size: usize,
    pub recombination_prob: f64,
    pub mutation_prob: f64,
    pub copy_prob: f64,
    /// `"ordinal-mae"` or `"fails-complexity"`.
    pub fitness: String,
    pub alpha: f64,
    pub ordinal_scale: Option<usize>,
    pub default_class: Option<usize>,
    pub parallel: bool,
    pub seed: Option<u64>,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        let config = EvolutionConfig::default();
        Self {
            population_size: config.population_size,
            max_generations: config.max_generations,
            parents_selector: "tournament".into(),
            tournament_size: 2,
            recombination_prob: config.recombination_prob,
            mutation_prob: config.mutation_prob,
            copy_prob: config.copy_prob,
            fitness: "ordinal-mae".into(),
            alpha: config.alpha,
            ordinal_scale: config.ordinal_scale,
            default_class: config.default_class,
            parallel: config.parallel,
            seed: config.seed,
        }
    }
}

impl EvolutionSettings {
    /// Resolves operator tags and validates the result.
    pub fn resolve(&self) -> Result<EvolutionConfig> {
        let selection = match self.parents_selector.parse::<Selection>()? {
            Selection::Tournament {
                with_replacement, ..
            } => Selection::Tournament {
                size: self.tournament_size,
                with_replacement,
            },
            other => other,
        };

        let config = EvolutionConfig {
            population_size: self.population_size,
            max_generations: self.max_generations,
            selection,
            recombination_prob: self.recombination_prob,
            mutation_prob: self.mutation_prob,
            copy_prob: self.copy_prob,
            fitness: self.fitness.parse()?,
            alpha: self.alpha,
            ordinal_scale: self.ordinal_scale,
            default_class: self.default_class,
            parallel: self.parallel,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

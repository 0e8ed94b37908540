//! Observer hooks fired by the evolution engine.
//!
//! Listeners run on the controller thread at generation and class
//! boundaries, never during fitness evaluation. They observe; they
//! cannot fail or steer the run.

use super::types::{Genotype, Individual};
use crate::data::Metadata;
use crate::rule::{Rule, RuleBase};

/// Snapshot handed to listeners.
#[derive(Debug)]
pub struct EvolutionEvent<'a, G: Genotype> {
    /// Class currently being evolved.
    pub class: usize,

    /// Completed generations for `class`.
    pub generation: usize,

    /// Current survivors, best first once at least one generation ran.
    pub population: &'a [Individual<G>],
}

impl<G: Genotype> EvolutionEvent<'_, G> {
    /// Best fitness in the population, `+inf` if it is empty.
    pub fn best_fitness(&self) -> f64 {
        self.population
            .iter()
            .map(Individual::fitness_or_worst)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Receives engine notifications. Every method defaults to a no-op.
pub trait EvolutionListener<G: Genotype> {
    /// The first class population has been created and evaluated.
    fn run_started(&mut self, _event: &EvolutionEvent<'_, G>) {}

    /// A generation finished and the class keeps evolving.
    fn generation_completed(&mut self, _event: &EvolutionEvent<'_, G>) {}

    /// A class finished; `champion` was inserted at `position`.
    fn class_finished(&mut self, _class: usize, _champion: &Rule<G::Antecedent>, _position: usize) {}

    /// The run ended, either with every class evolved or cancelled.
    fn run_finished(&mut self, _rule_base: &RuleBase<G::Antecedent>) {}
}

/// Reports progress through the `log` facade.
///
/// Generations are logged at `debug` every `frequency` generations;
/// class champions and the final cascade at `info`.
#[derive(Debug, Clone)]
pub struct LoggingListener {
    metadata: Metadata,
    frequency: usize,
}

impl LoggingListener {
    /// Creates a listener that logs every generation.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            frequency: 1,
        }
    }

    /// Logs only every `frequency` generations (0 is treated as 1).
    pub fn with_frequency(mut self, frequency: usize) -> Self {
        self.frequency = frequency.max(1);
        self
    }
}

impl<G: Genotype> EvolutionListener<G> for LoggingListener {
    fn run_started(&mut self, event: &EvolutionEvent<'_, G>) {
        log::info!(
            "rule evolution started: {} classes, population {}",
            self.metadata.number_of_classes(),
            event.population.len()
        );
    }

    fn generation_completed(&mut self, event: &EvolutionEvent<'_, G>) {
        if event.generation % self.frequency == 0 {
            log::debug!(
                "class {} generation {}: best fitness {}",
                event.class,
                event.generation,
                event.best_fitness()
            );
        }
    }

    fn class_finished(&mut self, class: usize, champion: &Rule<G::Antecedent>, position: usize) {
        log::info!(
            "class {class} champion (fitness {}) inserted at position {position}: {}",
            champion.fitness(),
            champion.render(&self.metadata)
        );
    }

    fn run_finished(&mut self, rule_base: &RuleBase<G::Antecedent>) {
        log::info!(
            "rule evolution finished with {} rules:\n{}",
            rule_base.len(),
            rule_base.render(&self.metadata)
        );
    }
}

//! Per-class rule evolution, driven as an explicit state machine.
//!
//! [`RuleGpRunner`] evolves one rule per class, in class order:
//!
//! ```text
//! Initializing(c) ─▶ Evolving(c, 0) ─▶ ... ─▶ Evolving(c, max-1) ─▶ ClassDone(c)
//!        ▲                                                              │
//!        └──────────────────── c + 1 < classes ◀────────────────────────┤
//!                                                                       ▼
//!                                                                   Finished
//! ```
//!
//! Each generation: tournament parents → recombination → mutation →
//! evaluation → elitist copies → truncation to the population size.
//! When a class is done its best survivor is inserted into the
//! [`RuleBase`] by fitness.

use super::config::EvolutionConfig;
use super::evaluator::Evaluator;
use super::listener::{EvolutionEvent, EvolutionListener};
use super::operators::{Mutator, Recombinator};
use super::selection::betters;
use super::types::{Genotype, Individual, RuleSpecies};
use crate::data::Dataset;
use crate::error::{Result, RuleGpError};
use crate::rule::RuleBase;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Antecedent type produced by species `S`.
pub type AntecedentOf<S> = <<S as RuleSpecies>::Genotype as Genotype>::Antecedent;

/// Where the engine stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionState {
    /// About to create and evaluate the population for `class`.
    Initializing { class: usize },

    /// `generation` generations of `class` are complete; the next step
    /// runs another one.
    Evolving { class: usize, generation: usize },

    /// Evolution of `class` is over; the next step promotes its champion.
    ClassDone { class: usize },

    /// Every class has its rule.
    Finished,
}

/// Result of a complete (or cancelled) run.
#[derive(Debug, Clone)]
pub struct RuleGpResult<A> {
    /// The assembled rule-list classifier.
    pub classifier: RuleBase<A>,

    /// Generations run for each finished class, in class order.
    pub generations: Vec<usize>,

    /// Fitness of each class champion, in class order.
    pub champion_fitness: Vec<f64>,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

/// Evolves one rule per class and assembles them into a [`RuleBase`].
///
/// # Usage
///
/// ```ignore
/// let species = TreeSpecies::new(dataset.metadata().clone(), 4)?;
/// let config = EvolutionConfig::default().with_seed(42);
/// let result = RuleGpRunner::new(&species, &dataset, config)?
///     .with_listener(LoggingListener::new(dataset.metadata().clone()))
///     .run()?;
/// let predicted = result.classifier.classify_all(&test_set);
/// ```
pub struct RuleGpRunner<'a, S: RuleSpecies> {
    species: &'a S,
    config: EvolutionConfig,
    evaluator: Evaluator<'a>,
    recombinator: Recombinator,
    mutator: Mutator,
    rng: StdRng,
    num_classes: usize,
    state: EvolutionState,
    survivors: Vec<Individual<S::Genotype>>,
    rule_base: RuleBase<AntecedentOf<S>>,
    generations: Vec<usize>,
    champion_fitness: Vec<f64>,
    listeners: Vec<Box<dyn EvolutionListener<S::Genotype> + 'a>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a, S: RuleSpecies> RuleGpRunner<'a, S> {
    /// Prepares a run over `dataset`.
    ///
    /// # Errors
    /// Fails on an invalid configuration, a dataset without classes, or
    /// a default class outside the class range.
    pub fn new(species: &'a S, dataset: &'a Dataset, config: EvolutionConfig) -> Result<Self> {
        config.validate()?;

        let num_classes = dataset.metadata().number_of_classes();
        if num_classes == 0 {
            return Err(RuleGpError::InvalidDataset(
                "dataset declares no classes".into(),
            ));
        }

        let default_class = config
            .default_class
            .unwrap_or_else(|| dataset.majority_class());
        if default_class >= num_classes {
            return Err(RuleGpError::InvalidConfig(format!(
                "default_class {default_class} out of range for {num_classes} classes"
            )));
        }

        let scale = config.ordinal_scale.unwrap_or(num_classes);
        let fitness = config.fitness.build(scale, config.alpha);
        let evaluator = Evaluator::new(dataset, fitness).with_parallel(config.parallel);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        Ok(Self {
            species,
            recombinator: Recombinator::new(config.recombination_prob),
            mutator: Mutator::new(config.mutation_prob),
            config,
            evaluator,
            rng,
            num_classes,
            state: EvolutionState::Initializing { class: 0 },
            survivors: Vec::new(),
            rule_base: RuleBase::new(default_class),
            generations: Vec::with_capacity(num_classes),
            champion_fitness: Vec::with_capacity(num_classes),
            listeners: Vec::new(),
            cancel: None,
        })
    }

    /// Registers a listener.
    pub fn with_listener(mut self, listener: impl EvolutionListener<S::Genotype> + 'a) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// Sets a cancellation token.
    ///
    /// The flag is checked before each generation and before each class;
    /// a generation in progress always completes.
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn state(&self) -> EvolutionState {
        self.state
    }

    /// Current survivors of the class being evolved.
    pub fn survivors(&self) -> &[Individual<S::Genotype>] {
        &self.survivors
    }

    /// Rules promoted so far.
    pub fn rule_base(&self) -> &RuleBase<AntecedentOf<S>> {
        &self.rule_base
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Performs one state transition and returns the new state.
    ///
    /// Stepping a finished engine is a no-op.
    pub fn step(&mut self) -> Result<EvolutionState> {
        self.state = match self.state {
            EvolutionState::Initializing { class } => {
                self.initialize(class)?;
                EvolutionState::Evolving {
                    class,
                    generation: 0,
                }
            }
            EvolutionState::Evolving { class, generation } => {
                self.evolve_generation()?;
                let generation = generation + 1;
                if generation < self.config.max_generations {
                    let event = EvolutionEvent {
                        class,
                        generation,
                        population: &self.survivors,
                    };
                    for listener in &mut self.listeners {
                        listener.generation_completed(&event);
                    }
                    EvolutionState::Evolving { class, generation }
                } else {
                    self.generations.push(generation);
                    EvolutionState::ClassDone { class }
                }
            }
            EvolutionState::ClassDone { class } => self.finish_class(class)?,
            EvolutionState::Finished => EvolutionState::Finished,
        };
        Ok(self.state)
    }

    /// Runs until every class is done or the run is cancelled.
    ///
    /// Listeners get `run_finished` in both cases; after a cancellation
    /// it carries the rules promoted so far.
    pub fn run(mut self) -> Result<RuleGpResult<AntecedentOf<S>>> {
        let mut cancelled = false;
        loop {
            match self.state {
                EvolutionState::Finished => break,
                EvolutionState::Initializing { .. } | EvolutionState::Evolving { .. }
                    if self.is_cancelled() =>
                {
                    log::info!("rule evolution cancelled in state {:?}", self.state);
                    for listener in &mut self.listeners {
                        listener.run_finished(&self.rule_base);
                    }
                    cancelled = true;
                    break;
                }
                _ => {}
            }
            self.step()?;
        }

        Ok(RuleGpResult {
            classifier: self.rule_base,
            generations: self.generations,
            champion_fitness: self.champion_fitness,
            cancelled,
        })
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Creates and evaluates the starting population of `class`.
    fn initialize(&mut self, class: usize) -> Result<()> {
        self.evaluator.set_target_class(class);

        let mut population = self
            .species
            .create_population(self.config.population_size, &mut self.rng)?;
        if population.is_empty() {
            return Err(RuleGpError::EmptyPopulation { class });
        }
        self.evaluator.evaluate(&mut population);
        self.survivors = population;

        log::debug!(
            "class {class}: evaluated initial population of {} with {}",
            self.survivors.len(),
            self.evaluator.fitness_name()
        );

        if class == 0 {
            let event = EvolutionEvent {
                class,
                generation: 0,
                population: &self.survivors,
            };
            for listener in &mut self.listeners {
                listener.run_started(&event);
            }
        }
        Ok(())
    }

    /// Runs one generation, replacing the survivors.
    fn evolve_generation(&mut self) -> Result<()> {
        let survivors = std::mem::take(&mut self.survivors);
        let size = self.config.population_size;

        let parents = self.config.selection.select(&survivors, size, &mut self.rng);
        let recombined = self
            .recombinator
            .recombine(self.species, parents, &mut self.rng)?
            .into_population();
        let mut candidates = self
            .mutator
            .mutate(self.species, recombined, &mut self.rng)?
            .into_population();

        self.evaluator.evaluate(&mut candidates);

        candidates.extend(elitist_copies(&survivors, self.config.copy_prob, &mut self.rng));

        self.survivors = if candidates.len() > size {
            betters(candidates, Some(size))
        } else {
            betters(candidates, None)
        };
        Ok(())
    }

    /// Promotes the best survivor of `class` and moves to the next class.
    fn finish_class(&mut self, class: usize) -> Result<EvolutionState> {
        for ind in &mut self.survivors {
            ind.rule_mut().set_consequent(class);
        }

        let champion = std::mem::take(&mut self.survivors)
            .into_iter()
            .next()
            .ok_or(RuleGpError::EmptyPopulation { class })?;
        let fitness = champion.fitness_or_worst();
        let mut rule = champion.into_rule();
        rule.set_fitness(fitness);

        let position = self.rule_base.insert_by_fitness(rule);
        self.champion_fitness.push(fitness);

        log::info!("class {class} done: champion fitness {fitness}, rule position {position}");
        let champion = &self.rule_base.rules()[position];
        for listener in &mut self.listeners {
            listener.class_finished(class, champion, position);
        }

        let next = class + 1;
        if next == self.num_classes {
            for listener in &mut self.listeners {
                listener.run_finished(&self.rule_base);
            }
            return Ok(EvolutionState::Finished);
        }

        self.evaluator.set_target_class(next);
        Ok(EvolutionState::Initializing { class: next })
    }
}

/// Clones each survivor with probability `copy_prob`.
///
/// Clones keep their fitness and skip every genetic operator.
fn elitist_copies<G: Genotype, R: Rng>(
    survivors: &[Individual<G>],
    copy_prob: f64,
    rng: &mut R,
) -> Vec<Individual<G>> {
    survivors
        .iter()
        .filter(|_| rng.random_bool(copy_prob))
        .cloned()
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Attribute, Instance, Metadata};
    use crate::gp::FitnessKind;
    use crate::rule::{Antecedent, Rule};
    use std::cell::RefCell;
    use std::rc::Rc;

    // ---- Interval rules on one attribute: lo <= x < hi ----

    #[derive(Debug, Clone, PartialEq)]
    struct Interval {
        lo: f64,
        hi: f64,
    }

    impl Antecedent for Interval {
        fn covers(&self, instance: &Instance) -> bool {
            let x = instance.value(0);
            x >= self.lo && x < self.hi
        }
        fn size(&self) -> usize {
            3
        }
    }

    impl Genotype for Interval {
        type Antecedent = Interval;
        fn decode(&self) -> Result<Interval> {
            Ok(self.clone())
        }
        fn size(&self) -> usize {
            2
        }
    }

    struct IntervalSpecies {
        fail_provider: bool,
    }

    impl RuleSpecies for IntervalSpecies {
        type Genotype = Interval;

        fn create_genotype<R: Rng>(&self, rng: &mut R) -> Result<Interval> {
            if self.fail_provider {
                return Err(RuleGpError::Provider("no grammar".into()));
            }
            let a = rng.random_range(0.0..30.0);
            let b = rng.random_range(0.0..30.0);
            Ok(Interval {
                lo: f64::min(a, b),
                hi: f64::max(a, b),
            })
        }

        fn crossover<R: Rng>(&self, p1: &Interval, p2: &Interval, _rng: &mut R) -> (Interval, Interval) {
            (
                Interval { lo: p1.lo, hi: p2.hi.max(p1.lo) },
                Interval { lo: p2.lo, hi: p1.hi.max(p2.lo) },
            )
        }

        fn mutate<R: Rng>(&self, g: &Interval, rng: &mut R) -> Interval {
            let lo = (g.lo + rng.random_range(-2.0..2.0)).clamp(0.0, 30.0);
            let hi = (g.hi + rng.random_range(-2.0..2.0)).clamp(lo, 30.0);
            Interval { lo, hi }
        }
    }

    /// x in 0..30, class = x / 10.
    fn dataset() -> Dataset {
        let meta = Metadata::new(
            vec![
                Attribute::numeric("x", 0.0, 30.0),
                Attribute::categorical("class", ["low", "mid", "high"]),
            ],
            1,
        );
        let instances = (0..30)
            .map(|x| Instance::new(vec![x as f64 + 0.5, (x / 10) as f64]))
            .collect();
        Dataset::new("bands", meta, instances).unwrap()
    }

    fn config() -> EvolutionConfig {
        EvolutionConfig::default()
            .with_population_size(30)
            .with_max_generations(5)
            .with_seed(42)
            .with_parallel(false)
    }

    #[derive(Default)]
    struct Counts {
        started: usize,
        generations: usize,
        classes: Vec<usize>,
        finished: usize,
    }

    struct Recorder(Rc<RefCell<Counts>>);

    impl EvolutionListener<Interval> for Recorder {
        fn run_started(&mut self, _event: &EvolutionEvent<'_, Interval>) {
            self.0.borrow_mut().started += 1;
        }
        fn generation_completed(&mut self, event: &EvolutionEvent<'_, Interval>) {
            assert!(event.generation >= 1 && event.generation < 5);
            self.0.borrow_mut().generations += 1;
        }
        fn class_finished(&mut self, class: usize, champion: &Rule<Interval>, _position: usize) {
            assert_eq!(champion.consequent(), class);
            self.0.borrow_mut().classes.push(class);
        }
        fn run_finished(&mut self, rule_base: &RuleBase<Interval>) {
            assert_eq!(rule_base.len(), 3);
            self.0.borrow_mut().finished += 1;
        }
    }

    #[test]
    fn test_walks_every_class_for_max_generations() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        let mut runner = RuleGpRunner::new(&species, &ds, config()).unwrap();

        let mut trace = vec![runner.state()];
        while runner.state() != EvolutionState::Finished {
            trace.push(runner.step().unwrap());
        }

        // per class: Evolving 0..=4, ClassDone; then next Initializing / Finished
        assert_eq!(trace.len(), 1 + 3 * 7);
        for class in 0..3 {
            let base = class * 7;
            assert_eq!(trace[base], EvolutionState::Initializing { class });
            for generation in 0..5 {
                assert_eq!(
                    trace[base + 1 + generation],
                    EvolutionState::Evolving { class, generation }
                );
            }
            assert_eq!(trace[base + 6], EvolutionState::ClassDone { class });
        }
        assert_eq!(trace[21], EvolutionState::Finished);
        assert_eq!(runner.rule_base().len(), 3);

        // stepping a finished run changes nothing
        assert_eq!(runner.step().unwrap(), EvolutionState::Finished);
        assert_eq!(runner.rule_base().len(), 3);
    }

    #[test]
    fn test_run_result_and_notifications() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        let counts = Rc::new(RefCell::new(Counts::default()));

        let result = RuleGpRunner::new(&species, &ds, config())
            .unwrap()
            .with_listener(Recorder(counts.clone()))
            .run()
            .unwrap();

        assert!(!result.cancelled);
        assert_eq!(result.generations, vec![5, 5, 5]);
        assert_eq!(result.champion_fitness.len(), 3);
        assert_eq!(result.classifier.len(), 3);

        let mut classes: Vec<usize> = result.classifier.rules().iter().map(Rule::consequent).collect();
        classes.sort_unstable();
        assert_eq!(classes, vec![0, 1, 2]);

        // best first
        for pair in result.classifier.rules().windows(2) {
            assert!(pair[0].fitness() <= pair[1].fitness());
        }

        let counts = counts.borrow();
        assert_eq!(counts.started, 1);
        assert_eq!(counts.generations, 3 * 4);
        assert_eq!(counts.classes, vec![0, 1, 2]);
        assert_eq!(counts.finished, 1);
    }

    #[test]
    fn test_survivors_never_exceed_population_and_are_sorted() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        let mut runner =
            RuleGpRunner::new(&species, &ds, config().with_copy_prob(1.0)).unwrap();

        runner.step().unwrap();
        for _ in 0..4 {
            runner.step().unwrap();
            let fits: Vec<f64> = runner.survivors().iter().map(|i| i.fitness().unwrap()).collect();
            assert_eq!(fits.len(), 30);
            assert!(fits.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_elitist_copies_keep_fitness() {
        let mut rng = StdRng::seed_from_u64(5);
        let survivors: Vec<Individual<Interval>> = (0..10)
            .map(|i| {
                let mut ind = Individual::new(Interval { lo: i as f64, hi: 30.0 }).unwrap();
                ind.set_fitness(i as f64 / 10.0);
                ind
            })
            .collect();

        let all = elitist_copies(&survivors, 1.0, &mut rng);
        assert_eq!(all.len(), 10);
        for (copy, source) in all.iter().zip(&survivors) {
            assert_eq!(copy.fitness(), source.fitness());
            assert_eq!(copy.genotype(), source.genotype());
        }

        assert!(elitist_copies(&survivors, 0.0, &mut rng).is_empty());
    }

    #[test]
    fn test_same_seed_same_classifier() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        let a = RuleGpRunner::new(&species, &ds, config()).unwrap().run().unwrap();
        let b = RuleGpRunner::new(&species, &ds, config().with_parallel(true))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(a.classifier, b.classifier);
        assert_eq!(a.champion_fitness, b.champion_fitness);
    }

    #[test]
    fn test_cancel_before_start() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        let cancel = Arc::new(AtomicBool::new(true));

        let result = RuleGpRunner::new(&species, &ds, config())
            .unwrap()
            .with_cancel(cancel)
            .run()
            .unwrap();

        assert!(result.cancelled);
        assert!(result.classifier.is_empty());
        assert!(result.generations.is_empty());
    }

    #[test]
    fn test_cancel_from_listener_stops_between_generations() {
        struct CancelAfterFirstClass(Arc<AtomicBool>);

        impl EvolutionListener<Interval> for CancelAfterFirstClass {
            fn class_finished(&mut self, _class: usize, _champion: &Rule<Interval>, _position: usize) {
                self.0.store(true, Ordering::Relaxed);
            }
        }

        /// Records the size of every rule base seen at the end of a run.
        struct FinalRules(Rc<RefCell<Vec<usize>>>);

        impl EvolutionListener<Interval> for FinalRules {
            fn run_finished(&mut self, rule_base: &RuleBase<Interval>) {
                self.0.borrow_mut().push(rule_base.len());
            }
        }

        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        let cancel = Arc::new(AtomicBool::new(false));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let result = RuleGpRunner::new(&species, &ds, config())
            .unwrap()
            .with_listener(CancelAfterFirstClass(cancel.clone()))
            .with_listener(FinalRules(seen.clone()))
            .with_cancel(cancel)
            .run()
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.classifier.len(), 1);
        assert_eq!(result.generations, vec![5]);
        // the partial cascade is still reported, exactly once
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_provider_failure_is_fatal() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: true };
        let err = RuleGpRunner::new(&species, &ds, config()).unwrap().run().unwrap_err();
        assert!(matches!(err, RuleGpError::Provider(_)));
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        assert!(RuleGpRunner::new(&species, &ds, config().with_max_generations(0)).is_err());
        assert!(matches!(
            RuleGpRunner::new(&species, &ds, config().with_default_class(3)),
            Err(RuleGpError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_default_class_is_majority_when_unset() {
        let meta = Metadata::new(
            vec![
                Attribute::numeric("x", 0.0, 30.0),
                Attribute::categorical("class", ["a", "b"]),
            ],
            1,
        );
        let instances = vec![
            Instance::new(vec![1.0, 1.0]),
            Instance::new(vec![2.0, 1.0]),
            Instance::new(vec![3.0, 0.0]),
        ];
        let ds = Dataset::new("skewed", meta, instances).unwrap();
        let species = IntervalSpecies { fail_provider: false };
        let runner = RuleGpRunner::new(&species, &ds, config()).unwrap();
        assert_eq!(runner.rule_base().default_class(), 1);
        assert_eq!(runner.num_classes(), 2);
    }

    #[test]
    fn test_alternate_fitness_runs_to_completion() {
        let ds = dataset();
        let species = IntervalSpecies { fail_provider: false };
        let result = RuleGpRunner::new(
            &species,
            &ds,
            config().with_fitness(FitnessKind::FailsComplexity),
        )
        .unwrap()
        .run()
        .unwrap();
        assert_eq!(result.classifier.len(), 3);
        assert!(result.champion_fitness.iter().all(|f| f.is_finite()));
    }
}

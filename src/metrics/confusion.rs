use crate::data::Dataset;
use crate::error::{Result, RuleGpError};
use crate::rule::{Antecedent, RuleBase};
use std::fmt;

/// Square count matrix: rows are actual classes, columns predicted ones.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Creates an all-zero matrix.
    pub fn new(num_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; num_classes]; num_classes],
        }
    }

    /// Tallies paired actual / predicted labels.
    ///
    /// # Errors
    /// Fails if the slices differ in length or a label is out of range.
    pub fn from_predictions(num_classes: usize, actual: &[usize], predicted: &[usize]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(RuleGpError::InvalidDataset(format!(
                "{} actual labels but {} predictions",
                actual.len(),
                predicted.len()
            )));
        }
        let mut matrix = Self::new(num_classes);
        for (&a, &p) in actual.iter().zip(predicted) {
            matrix.record(a, p)?;
        }
        Ok(matrix)
    }

    /// Classifies every instance of `dataset` with `rule_base`.
    pub fn from_rule_base<A: Antecedent>(rule_base: &RuleBase<A>, dataset: &Dataset) -> Result<Self> {
        let actual: Vec<usize> = dataset
            .instances()
            .iter()
            .map(|instance| dataset.class_of(instance))
            .collect();
        let predicted = rule_base.classify_all(dataset);
        Self::from_predictions(dataset.metadata().number_of_classes(), &actual, &predicted)
    }

    /// Adds one observation.
    pub fn record(&mut self, actual: usize, predicted: usize) -> Result<()> {
        let n = self.num_classes();
        if actual >= n || predicted >= n {
            return Err(RuleGpError::InvalidDataset(format!(
                "label pair ({actual}, {predicted}) out of range for {n} classes"
            )));
        }
        self.counts[actual][predicted] += 1;
        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.counts.len()
    }

    /// Count of instances of class `actual` predicted as `predicted`.
    pub fn count(&self, actual: usize, predicted: usize) -> usize {
        self.counts
            .get(actual)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of correctly classified instances.
    pub fn correct(&self) -> usize {
        (0..self.num_classes()).map(|i| self.counts[i][i]).sum()
    }

    fn row_total(&self, actual: usize) -> usize {
        self.counts[actual].iter().sum()
    }

    fn column_total(&self, predicted: usize) -> usize {
        self.counts.iter().map(|row| row[predicted]).sum()
    }

    /// Fraction of correct predictions; 0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Area under the ROC curve.
    ///
    /// Binary problems use the single pair `(0, 1)`. Otherwise the
    /// one-vs-one AUC is averaged over every ordered pair `i != j`.
    /// With fewer than two classes the result is 0.5.
    pub fn auc(&self) -> f64 {
        let n = self.num_classes();
        match n {
            0 | 1 => 0.5,
            2 => self.pair_auc(0, 1),
            _ => {
                let mut sum = 0.0;
                for i in 0..n {
                    for j in 0..n {
                        if i != j {
                            sum += self.pair_auc(i, j);
                        }
                    }
                }
                sum / (n * (n - 1)) as f64
            }
        }
    }

    /// `(1 + tpRate - fpRate) / 2` treating `positive` against `negative`.
    fn pair_auc(&self, positive: usize, negative: usize) -> f64 {
        let tp = self.counts[positive][positive];
        let fn_ = self.counts[positive][negative];
        let fp = self.counts[negative][positive];
        let tn = self.counts[negative][negative];

        let tp_rate = if tp + fn_ == 0 {
            1.0
        } else {
            tp as f64 / (tp + fn_) as f64
        };
        let fp_rate = if fp + tn == 0 {
            0.0
        } else {
            fp as f64 / (fp + tn) as f64
        };
        (1.0 + tp_rate - fp_rate) / 2.0
    }

    /// Cohen's kappa; 1 when the chance-agreement denominator vanishes.
    pub fn kappa(&self) -> f64 {
        let total = self.total() as f64;
        let correct = self.correct() as f64;
        let chance: f64 = (0..self.num_classes())
            .map(|i| self.row_total(i) as f64 * self.column_total(i) as f64)
            .sum();

        let denominator = total * total - chance;
        if denominator == 0.0 {
            1.0
        } else {
            (total * correct - chance) / denominator
        }
    }

    /// Ordinal mean absolute error, averaged per actual class.
    ///
    /// Each class contributes the mean `|actual - predicted|` over its
    /// instances; a class without instances contributes 0.
    pub fn omae(&self) -> f64 {
        let n = self.num_classes();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = (0..n)
            .map(|i| {
                let instances = self.row_total(i);
                if instances == 0 {
                    return 0.0;
                }
                let distance: usize = self.counts[i]
                    .iter()
                    .enumerate()
                    .map(|(j, &c)| i.abs_diff(j) * c)
                    .sum();
                distance as f64 / instances as f64
            })
            .sum();
        sum / n as f64
    }

    /// N-th root of the product of per-class recalls.
    ///
    /// A class without instances has recall 0.
    pub fn geometric_mean(&self) -> f64 {
        let n = self.num_classes();
        if n == 0 {
            return 0.0;
        }
        let product: f64 = (0..n)
            .map(|i| {
                let instances = self.row_total(i);
                if instances == 0 {
                    0.0
                } else {
                    self.counts[i][i] as f64 / instances as f64
                }
            })
            .product();
        product.powf(1.0 / n as f64)
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.counts {
            let cells: Vec<String> = row.iter().map(|c| format!("{c:>6}")).collect();
            writeln!(f, "{}", cells.join(""))?;
        }
        Ok(())
    }
}

/// Summary statistics of one classifier on one dataset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub auc: f64,
    pub kappa: f64,
    pub omae: f64,
    pub geometric_mean: f64,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    pub fn from_matrix(confusion: ConfusionMatrix) -> Self {
        Self {
            accuracy: confusion.accuracy(),
            auc: confusion.auc(),
            kappa: confusion.kappa(),
            omae: confusion.omae(),
            geometric_mean: confusion.geometric_mean(),
            confusion,
        }
    }

    /// Evaluates `rule_base` on `dataset`.
    pub fn evaluate<A: Antecedent>(rule_base: &RuleBase<A>, dataset: &Dataset) -> Result<Self> {
        ConfusionMatrix::from_rule_base(rule_base, dataset).map(Self::from_matrix)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "AUC: {:.4}", self.auc)?;
        writeln!(f, "Kappa: {:.4}", self.kappa)?;
        writeln!(f, "OMAE: {:.4}", self.omae)?;
        writeln!(f, "GeoMean: {:.4}", self.geometric_mean)?;
        writeln!(f, "Confusion matrix:")?;
        write!(f, "{}", self.confusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Attribute, Instance, Metadata};
    use crate::rule::Rule;
    use crate::tree::{Comparison, Expr};

    const EPS: f64 = 1e-9;

    fn matrix(rows: &[&[usize]]) -> ConfusionMatrix {
        ConfusionMatrix {
            counts: rows.iter().map(|r| r.to_vec()).collect(),
        }
    }

    #[test]
    fn test_binary_statistics() {
        let m = matrix(&[&[5, 1], &[2, 2]]);
        assert_eq!(m.total(), 10);
        assert_eq!(m.correct(), 7);
        assert!((m.accuracy() - 0.7).abs() < EPS);
        // tpRate 5/6, fpRate 2/4
        assert!((m.auc() - (1.0 + 5.0 / 6.0 - 0.5) / 2.0).abs() < EPS);
        // (10*7 - 54) / (100 - 54)
        assert!((m.kappa() - 16.0 / 46.0).abs() < EPS);
        assert!((m.omae() - (1.0 / 6.0 + 0.5) / 2.0).abs() < EPS);
        assert!((m.geometric_mean() - (5.0 / 6.0 * 0.5f64).sqrt()).abs() < EPS);
    }

    #[test]
    fn test_perfect_multiclass() {
        let m = matrix(&[&[3, 0, 0], &[0, 4, 0], &[0, 0, 2]]);
        assert!((m.accuracy() - 1.0).abs() < EPS);
        assert!((m.auc() - 1.0).abs() < EPS);
        assert!((m.kappa() - 1.0).abs() < EPS);
        assert!(m.omae().abs() < EPS);
        assert!((m.geometric_mean() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_omae_weights_distance() {
        // class 0 predicted as class 2 costs twice as much as class 1
        let near = matrix(&[&[0, 2, 0], &[0, 2, 0], &[0, 0, 2]]);
        let far = matrix(&[&[0, 0, 2], &[0, 2, 0], &[0, 0, 2]]);
        assert!((near.omae() - 1.0 / 3.0).abs() < EPS);
        assert!((far.omae() - 2.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_empty_class_never_nan() {
        let m = matrix(&[&[2, 0, 0], &[0, 0, 0], &[0, 1, 3]]);
        assert!((m.omae() - 0.25 / 3.0).abs() < EPS);
        assert_eq!(m.geometric_mean(), 0.0);
        assert!(!m.auc().is_nan());
        assert!(!m.kappa().is_nan());

        let empty = ConfusionMatrix::new(3);
        assert_eq!(empty.accuracy(), 0.0);
        assert_eq!(empty.kappa(), 1.0);
        assert_eq!(empty.omae(), 0.0);
        assert_eq!(empty.geometric_mean(), 0.0);
        assert!((empty.auc() - 1.0).abs() < EPS);

        assert_eq!(ConfusionMatrix::new(1).auc(), 0.5);
    }

    #[test]
    fn test_from_predictions_validates() {
        let m = ConfusionMatrix::from_predictions(2, &[0, 0, 1], &[0, 1, 1]).unwrap();
        assert_eq!(m.count(0, 0), 1);
        assert_eq!(m.count(0, 1), 1);
        assert_eq!(m.count(1, 1), 1);
        assert_eq!(m.count(5, 5), 0);

        assert!(ConfusionMatrix::from_predictions(2, &[0], &[0, 1]).is_err());
        assert!(ConfusionMatrix::from_predictions(2, &[0], &[2]).is_err());
    }

    #[test]
    fn test_report_from_rule_base() {
        let meta = Metadata::new(
            vec![
                Attribute::numeric("x", 0.0, 10.0),
                Attribute::categorical("class", ["low", "high"]),
            ],
            1,
        );
        let instances = vec![
            Instance::new(vec![1.0, 0.0]),
            Instance::new(vec![2.0, 0.0]),
            Instance::new(vec![6.0, 0.0]),
            Instance::new(vec![7.0, 1.0]),
        ];
        let ds = Dataset::new("toy", meta, instances).unwrap();

        let mut rb = RuleBase::new(1);
        rb.push(Rule::new(Expr::condition(0, Comparison::Less, 5.0), 0));

        let report = ClassificationReport::evaluate(&rb, &ds).unwrap();
        assert_eq!(report.confusion.count(0, 0), 2);
        assert_eq!(report.confusion.count(0, 1), 1);
        assert_eq!(report.confusion.count(1, 1), 1);
        assert!((report.accuracy - 0.75).abs() < EPS);

        let text = report.to_string();
        assert!(text.starts_with("Accuracy: 0.7500"));
        assert!(text.contains("Confusion matrix:"));
    }
}

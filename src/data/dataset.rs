//! Labeled instances and the dataset container.

use super::metadata::{Attribute, Metadata};
use crate::error::{Result, RuleGpError};

/// One labeled feature vector. The class label is stored at the
/// metadata's class index like any other value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    values: Vec<f64>,
}

impl Instance {
    /// Creates an instance from its raw values.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Value of attribute `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// All values in attribute order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Read-only labeled dataset shared by every fitness evaluation.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    metadata: Metadata,
    instances: Vec<Instance>,
}

impl Dataset {
    /// Builds a dataset after checking it against its metadata.
    ///
    /// The class attribute must be categorical with at least one value,
    /// every instance must have one value per attribute, and every class
    /// value must be a valid label index.
    pub fn new(name: impl Into<String>, metadata: Metadata, instances: Vec<Instance>) -> Result<Self> {
        let width = metadata.number_of_attributes();
        let class_index = metadata.class_index();

        match metadata.attribute(class_index) {
            Some(Attribute::Categorical { values, .. }) if !values.is_empty() => {}
            Some(_) => {
                return Err(RuleGpError::InvalidDataset(
                    "class attribute must be categorical with at least one value".into(),
                ))
            }
            None => {
                return Err(RuleGpError::InvalidDataset(format!(
                    "class index {class_index} out of range for {width} attributes"
                )))
            }
        }

        let num_classes = metadata.number_of_classes();
        for (row, instance) in instances.iter().enumerate() {
            if instance.values.len() != width {
                return Err(RuleGpError::InvalidDataset(format!(
                    "instance {row} has {} values, expected {width}",
                    instance.values.len()
                )));
            }
            let label = instance.value(class_index);
            if label < 0.0 || label.fract() != 0.0 || label as usize >= num_classes {
                return Err(RuleGpError::InvalidDataset(format!(
                    "instance {row} has invalid class value {label}"
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            metadata,
            instances,
        })
    }

    /// Dataset name used in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute descriptions.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Instances in their original order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Class label of `instance`.
    pub fn class_of(&self, instance: &Instance) -> usize {
        instance.value(self.metadata.class_index()) as usize
    }

    /// Number of instances per class label.
    pub fn class_distribution(&self) -> Vec<usize> {
        let mut counts = vec![0; self.metadata.number_of_classes()];
        for instance in &self.instances {
            counts[self.class_of(instance)] += 1;
        }
        counts
    }

    /// Most frequent class; the lowest label wins ties. Class 0 for an
    /// empty dataset.
    pub fn majority_class(&self) -> usize {
        let counts = self.class_distribution();
        let mut best = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = class;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> Metadata {
        Metadata::new(
            vec![
                Attribute::numeric("x", 0.0, 10.0),
                Attribute::categorical("class", ["a", "b", "c"]),
            ],
            1,
        )
    }

    #[test]
    fn test_valid_dataset() {
        let ds = Dataset::new(
            "toy",
            metadata(),
            vec![
                Instance::new(vec![1.0, 0.0]),
                Instance::new(vec![2.0, 2.0]),
                Instance::new(vec![3.0, 2.0]),
            ],
        )
        .unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.class_of(&ds.instances()[1]), 2);
        assert_eq!(ds.class_distribution(), vec![1, 0, 2]);
        assert_eq!(ds.majority_class(), 2);
    }

    #[test]
    fn test_rejects_wrong_width() {
        let err = Dataset::new("bad", metadata(), vec![Instance::new(vec![1.0])]).unwrap_err();
        assert!(matches!(err, RuleGpError::InvalidDataset(_)));
    }

    #[test]
    fn test_rejects_out_of_range_class() {
        let err = Dataset::new("bad", metadata(), vec![Instance::new(vec![1.0, 3.0])]).unwrap_err();
        assert!(matches!(err, RuleGpError::InvalidDataset(_)));
    }

    #[test]
    fn test_rejects_fractional_class() {
        let err = Dataset::new("bad", metadata(), vec![Instance::new(vec![1.0, 0.5])]).unwrap_err();
        assert!(matches!(err, RuleGpError::InvalidDataset(_)));
    }

    #[test]
    fn test_rejects_numeric_class() {
        let meta = Metadata::new(vec![Attribute::numeric("y", 0.0, 1.0)], 0);
        assert!(Dataset::new("bad", meta, vec![]).is_err());
    }

    #[test]
    fn test_majority_tie_prefers_lowest_label() {
        let ds = Dataset::new(
            "tie",
            metadata(),
            vec![Instance::new(vec![0.0, 1.0]), Instance::new(vec![0.0, 0.0])],
        )
        .unwrap();
        assert_eq!(ds.majority_class(), 0);
    }
}

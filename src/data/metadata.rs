//! Attribute and metadata descriptions.

/// Description of one attribute (column) of a dataset.
///
/// Categorical values are stored in instances as the index of the value
/// in `values`, converted to `f64`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    /// Real-valued attribute with a declared range.
    Numeric { name: String, min: f64, max: f64 },

    /// Nominal attribute with a fixed list of values.
    Categorical { name: String, values: Vec<String> },
}

impl Attribute {
    /// Creates a numeric attribute. `min` and `max` are swapped if reversed.
    pub fn numeric(name: impl Into<String>, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Attribute::Numeric {
            name: name.into(),
            min,
            max,
        }
    }

    /// Creates a categorical attribute.
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Attribute::Categorical {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &str {
        match self {
            Attribute::Numeric { name, .. } | Attribute::Categorical { name, .. } => name,
        }
    }

    /// Returns `true` for categorical attributes.
    pub fn is_categorical(&self) -> bool {
        matches!(self, Attribute::Categorical { .. })
    }

    /// Formats a stored value for display.
    ///
    /// Categorical values print their label; out-of-range indices and
    /// numeric values print the number itself.
    pub fn show(&self, value: f64) -> String {
        match self {
            Attribute::Categorical { values, .. } => {
                if value >= 0.0 && value.fract() == 0.0 {
                    if let Some(label) = values.get(value as usize) {
                        return label.clone();
                    }
                }
                format!("{value}")
            }
            Attribute::Numeric { .. } => format!("{value}"),
        }
    }
}

/// Ordered attribute list plus the position of the class attribute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    attributes: Vec<Attribute>,
    class_index: usize,
}

impl Metadata {
    /// Creates metadata. Consistency is checked by [`Dataset::new`](super::Dataset::new).
    pub fn new(attributes: Vec<Attribute>, class_index: usize) -> Self {
        Self {
            attributes,
            class_index,
        }
    }

    /// Index of the class attribute.
    pub fn class_index(&self) -> usize {
        self.class_index
    }

    /// The class attribute.
    ///
    /// # Panics
    /// Panics if `class_index` is out of range.
    pub fn class_attribute(&self) -> &Attribute {
        &self.attributes[self.class_index]
    }

    /// Number of class labels, or 0 if the class attribute is not categorical.
    pub fn number_of_classes(&self) -> usize {
        match self.attributes.get(self.class_index) {
            Some(Attribute::Categorical { values, .. }) => values.len(),
            _ => 0,
        }
    }

    /// Total number of attributes, class included.
    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Attribute at `index`, if any.
    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// All attributes in order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Indices of every attribute except the class.
    pub fn input_attributes(&self) -> Vec<usize> {
        (0..self.attributes.len())
            .filter(|&i| i != self.class_index)
            .collect()
    }
}

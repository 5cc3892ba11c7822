use serde::{Deserialize, Serialize};

use crate::definition::ExpressionTree;

/// Value reserved at slot 0 of every discrete value list.
pub const NA_VALUE: &str = "N/A";

/// Kind of an attribute as declared in the names file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Continuous,
    Discrete,
    Date,
    Time,
    Timestamp,
    Excluded,
    /// Identifies cases without participating in modeling; excluded like
    /// `ignore` but remembered as the table's label attribute.
    Label,
}

/// Legal values of a discrete attribute. Slot 0 always holds the `N/A`
/// sentinel; slots 1.. hold the declared values in file order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueList {
    pub values: Vec<String>,
    /// Declared maximum number of real values (`discrete N` form), or the
    /// number of enumerated values (explicit form).
    pub max_values: usize,
}

impl ValueList {
    /// List for a `discrete N` declaration: room reserved, sentinel only.
    pub fn with_max(max_values: usize) -> Self {
        let mut values = Vec::with_capacity(max_values + 1);
        values.push(NA_VALUE.to_owned());
        Self { values, max_values }
    }

    /// List for an explicit enumeration, filled one value at a time.
    pub fn enumerated() -> Self {
        let mut values = Vec::with_capacity(100);
        values.push(NA_VALUE.to_owned());
        Self {
            values,
            max_values: 0,
        }
    }

    pub fn push(&mut self, value: String) {
        self.values.push(value);
    }

    /// Number of declared real values, excluding the sentinel.
    pub fn real_count(&self) -> usize {
        self.values.len() - 1
    }
}

/// One named field of the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    /// The values of a discrete attribute form an ordered scale.
    pub ordered: bool,
    /// Excluded from modeling without changing the declared kind.
    pub skip: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub values: Option<ValueList>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub definition: Option<ExpressionTree>,
    /// Indices of the attributes a derived attribute's definition references.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub depends_on: Vec<usize>,
}

impl Attribute {
    pub fn new(name: String) -> Self {
        Self {
            name,
            kind: AttributeKind::Continuous,
            ordered: false,
            skip: false,
            values: None,
            definition: None,
            depends_on: vec![],
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.kind == AttributeKind::Continuous && self.values.is_none()
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self.kind, AttributeKind::Excluded | AttributeKind::Label)
    }
}

/// Per-attribute storage mirrored from the statistics pipeline. The parser
/// never fills these; they are reserved for the case-data loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeStats {
    pub mean: Vec<f64>,
    pub sd: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub precision: Vec<u32>,
    pub modal: Vec<String>,
    pub unit: Vec<String>,
    pub preference: Vec<f64>,
}

impl AttributeStats {
    pub fn zeroed(n: usize) -> Self {
        Self {
            mean: vec![0.0; n],
            sd: vec![0.0; n],
            min: vec![0.0; n],
            max: vec![0.0; n],
            precision: vec![0; n],
            modal: vec![String::new(); n],
            unit: vec![String::new(); n],
            preference: vec![0.0; n],
        }
    }
}

/// Validated result of a names-file load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeTable {
    pub attributes: Vec<Attribute>,
    /// Index of the target (class) attribute. Always continuous and never
    /// skipped.
    pub target: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label_att: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub case_weight_att: Option<usize>,
    /// Largest value-list length (sentinel included) over the attributes
    /// declared with an explicit value enumeration.
    pub max_discrete_values: usize,
    /// Epoch base year shared by every timestamp attribute.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp_base_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stats: Option<AttributeStats>,
}

impl AttributeTable {
    pub fn target_attribute(&self) -> &Attribute {
        &self.attributes[self.target]
    }

    /// Locate an attribute by name over the whole table.
    pub fn which(&self, name: &str) -> Option<usize> {
        which(name, &self.attributes, 0, self.attributes.len())
    }

    /// Reserve the mirrored statistics columns, one slot per attribute.
    pub fn reserve_stats(&mut self) {
        if self.stats.is_none() {
            self.stats = Some(AttributeStats::zeroed(self.attributes.len()));
        }
    }

    /// Release everything the table owns: names, value lists, definitions,
    /// dependency lists and statistics columns. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.attributes.shrink_to_fit();
        self.label_att = None;
        self.case_weight_att = None;
        self.max_discrete_values = 0;
        self.timestamp_base_year = None;
        self.stats = None;
    }
}

/// Locate `name` in `attributes[first..last]` by exact string equality.
pub fn which(name: &str, attributes: &[Attribute], first: usize, last: usize) -> Option<usize> {
    attributes[first..last.min(attributes.len())]
        .iter()
        .position(|att| att.name == name)
        .map(|i| first + i)
}

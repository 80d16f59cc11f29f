use smallvec::SmallVec;
use std::fmt;

/// One (name, value) pair qualifying a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Most provider series carry one to three dimensions.
pub type Dimensions = SmallVec<[Dimension; 4]>;

/// A time series as known by the provider.
///
/// Dimension order is kept as received because it drives the output
/// formatting, but it does not take part in identity.
#[derive(Debug, Clone, Default)]
pub struct MetricSeries {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Dimensions,
}

impl MetricSeries {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            dimensions: Dimensions::new(),
        }
    }

    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.push(Dimension::new(name, value));
        self
    }

    /// Whether both series have the same dimensions, regardless of order.
    fn same_dimensions(&self, other: &MetricSeries) -> bool {
        self.dimensions.len() == other.dimensions.len()
            && self
                .dimensions
                .iter()
                .all(|dimension| other.dimensions.contains(dimension))
    }
}

impl PartialEq for MetricSeries {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace
            && self.metric_name == other.metric_name
            && self.same_dimensions(other)
    }
}

impl Eq for MetricSeries {}

impl fmt::Display for MetricSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.metric_name)?;
        if !self.dimensions.is_empty() {
            let dimensions = self
                .dimensions
                .iter()
                .map(|d| format!("{}={}", d.name, d.value))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, "[{}]", dimensions)?;
        }
        Ok(())
    }
}

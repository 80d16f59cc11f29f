pub mod dimension_filter;
pub mod query;
pub mod series;
pub mod stat_config;

pub use dimension_filter::{DimensionFilter, parse_dimension_filters};
pub use query::{DataQuery, DataResult, Datapoint, ProviderMessage};
pub use series::{Dimension, Dimensions, MetricSeries};
pub use stat_config::{DEFAULT_STATS, StatConfig};

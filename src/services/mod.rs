//! Services for country aggregation and presentation data

pub mod aggregation;
pub mod cache;
pub mod country_codes;
pub mod merger;
pub mod normalizer;
pub mod visualization;

pub use aggregation::{AggregationOptions, AggregationService};
pub use cache::TtlCache;
pub use country_codes::country_code;
pub use merger::{MergePolicy, Merger};
pub use normalizer::name_key;
pub use visualization::{density, visualize, DensityBucket};

pub mod fact_builder;
pub mod pipeline;
pub mod staging_transformer;
pub mod weather_dimension;

pub use fact_builder::HourlyFactBuilder;
pub use pipeline::{log_load_verification, Pipeline, PipelineOutput};
pub use staging_transformer::{StagingOutput, StagingTransformer};
pub use weather_dimension::WeatherDimensionBuilder;

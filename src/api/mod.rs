// Output-facing data transfer objects.

pub mod dto;

pub use dto::DistributionReport;

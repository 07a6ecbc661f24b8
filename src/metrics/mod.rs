pub mod collector;
pub mod registry;

pub use collector::{path_label, record_rate_limit, record_request, RateLimit, RequestRecord};
pub use registry::Metrics;

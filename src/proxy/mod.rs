pub mod context;
mod handler;
pub mod upstream;

pub use context::BoxBody;
pub use handler::handle_request;
pub use upstream::Upstream;

//! API extractors and response types

pub mod extract;
pub mod response;

pub use extract::AppJson;
pub use response::DataResponse;

//! HTTP Query Protocol
//!
//! JSON bodies exchanged between the similarity server and remote clients.

mod request;
mod response;

pub use request::{CosNQuery, CosQuery, CosesQuery};
pub use response::{CosNResponse, CosResponse, CosesResponse, ErrorBody, HealthResponse};

/// Route for pairwise similarity
pub const COS_ROUTE: &str = "/cos";
/// Route for batch pairwise similarity
pub const COSES_ROUTE: &str = "/coses";
/// Route for top-N similarity
pub const COS_N_ROUTE: &str = "/cos-n";
/// Route for liveness and request statistics
pub const HEALTH_ROUTE: &str = "/health";

pub mod analysis;
pub mod flowgraph;
pub mod health;
pub mod params;
pub mod recipes;

use serde::Deserialize;

/// Request envelope shared by every POST endpoint: `{"data": ...}`.
#[derive(Debug, Deserialize)]
pub struct DataBody<T> {
    pub data: T,
}

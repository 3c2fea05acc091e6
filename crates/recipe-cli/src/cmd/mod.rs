pub mod params;
pub mod serve;
pub mod tag;

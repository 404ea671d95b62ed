pub mod error;
pub mod geo_point;
pub mod updates;
pub mod vendor;

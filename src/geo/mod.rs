pub mod distance;
pub mod nearby;

pub use distance::{distance_km, format_distance, DistanceUnit};
pub use nearby::{nearby, Located, Nearby};

pub mod artifact;
pub mod comparator;
pub mod domain;
pub mod errors;
pub mod harness;
pub mod pipeline;
pub mod targets;
pub mod traits;

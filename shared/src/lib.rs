pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod report;
pub mod scenario;
pub mod simulation;
pub mod types;
pub mod weights;

pub use aggregate::*;
pub use analysis::*;
pub use config::*;
pub use error::SimError;
pub use scenario::*;
pub use simulation::*;
pub use types::*;
pub use weights::*;

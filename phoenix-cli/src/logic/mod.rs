pub mod policy;
pub mod reports;
pub mod simulation;

pub use policy::SessionStrategy;
pub use simulation::{SimulationConfig, SimulationSession, SimulationSummary};

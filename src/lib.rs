pub mod config;
pub mod replay;
pub mod scenario;

pub use replay::{Frame, Replay};
pub use scenario::{Scenario, ScenarioError, Step};

pub mod generation;
pub mod reassembler;
pub mod throttle;

pub use generation::{run_generation, GenerationOutcome};
pub use reassembler::StreamReassembler;
pub use throttle::ScrollThrottle;

pub mod accumulator;
pub mod policy;
pub mod shared;

// Re-export commonly used types
pub use accumulator::Window;
pub use policy::{WindowPolicy, Windowing};
pub use shared::SharedRun;

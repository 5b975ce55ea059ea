pub mod site;
pub mod stats;
pub mod variant;

// re-exports
pub use site::*;
pub use stats::*;
pub use variant::*;

//! Head-and-shoulders detection components
//!
//! The scan is split into small stateless pieces so each can be tested on
//! its own:
//!
//! - **helpers**: local peak search over a window, shoulder/head ratios
//! - **scoring**: confidence score and signal/strength classification
//! - **head_shoulders**: the sliding scan over candidate center indices
//! - **overlap**: deduplication of near-adjacent detections

pub mod head_shoulders;
pub mod helpers;
pub mod overlap;
pub mod scoring;

// Re-export all components for convenience
pub use head_shoulders::*;
pub use helpers::*;
pub use overlap::*;
pub use scoring::*;

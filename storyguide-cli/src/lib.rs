// All guidance logic is in storyguide-core
// This CLI is a thin wrapper that adds terminal and JSON output

pub mod output;

// Re-export core types for convenience
pub use storyguide_core::*;

pub use output::OutputFormat;

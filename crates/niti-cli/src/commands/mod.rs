//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analysis` - Pipeline commands (context, wisdom, prompt)
//! - `principles` - Knowledge base listing
//! - `prompts` - Prompt library management commands
//! - `serve` - Web server command
//! - `shared` - Shared utilities (load_advisor, load_data)

pub mod analysis;
pub mod principles;
pub mod prompts;
pub mod serve;
pub mod shared;

// Re-export command functions for main.rs
pub use analysis::*;
pub use principles::*;
pub use prompts::*;
pub use serve::*;
pub use shared::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub mod handlers;
pub mod render;

// Re-export commonly used handler functions for convenience
pub use handlers::{ReplCommand, Session, load_config, parse_repl_line};
pub use render::{TerminalRenderer, format_metadata, format_snapshot};

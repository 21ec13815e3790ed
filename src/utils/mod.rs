//! Utility modules supporting fetch operations.
//!
//! - [`CacheService`]: bounded time-window memoization of API responses
//! - [`HttpClient`]: shared HTTP client with sensible defaults
//! - [`ProgressReporter`]: progress tracking with a learned total
//! - [`truncate_with_ellipsis`]: unicode-aware text truncation for tables

mod cache;
mod display;
mod http;
mod progress;

pub use cache::{CacheResult, CacheService, CacheStats};
pub use display::{is_terminal, terminal_info, terminal_width, truncate_with_ellipsis, Terminal};
pub use http::HttpClient;
pub use progress::ProgressReporter;

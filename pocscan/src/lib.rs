pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    is_valid_release_url, load_rules, normalize_release_url, parse_release_url,
    prompt_for_release_url,
};

//! # Secret Actions
//!
//! Actions decide what happens to a secret after it has been decrypted:
//!
//! - **Default**: copy the first non-empty line (the password)
//! - **Extraction Actions**: copy the first capture group of a user pattern
//!   (`user: (.+)`, `url: (.+)`, ...)
//! - **Show Contents**: display the whole file instead of copying
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Secret Actions                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ActionSettings ──► ActionRegistry ──► Action                   │
//! │                                          │                      │
//! │                                          ▼                      │
//! │                   decrypted text ──► apply_action ──► Extracted │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod error;
pub mod extract;
pub mod registry;

pub use action::{
    Action, ActionDefinition, ActionRule, ActionSettings, DEFAULT_ACTION_ICON,
    SHOW_CONTENTS_ACTION, SHOW_CONTENTS_ICON,
};
pub use error::{ActionError, ExtractionError, Result};
pub use extract::{Extracted, apply_action, extract_with_pattern, first_line};
pub use registry::ActionRegistry;

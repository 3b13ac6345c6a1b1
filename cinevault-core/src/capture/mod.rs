//! Screen capture protection for protected screens.

pub mod advisory;
pub mod guard;

pub use advisory::{
    AdvisoryShield, SELECTION_BLOCK_CSS, devtools_suspected, is_devtools_shortcut,
};
pub use guard::{CaptureGuard, CaptureScope};

//! TUI widgets

mod error_banner;
mod mode_indicator;

pub use error_banner::ErrorBanner;
pub use mode_indicator::ModeIndicator;

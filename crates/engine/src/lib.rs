//! Storyteller Engine library.
//!
//! Wires the domain core to storage, geocoding and time.
//!
//! ## Structure
//!
//! - `use_cases/` - Timeline refresh and rescheduling, location hierarchy, map placement
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;

//! Virtual framebuffer display for headless automation.
//!
//! Open a [`VirtualDisplaySession`] through a [`SessionLauncher`], start the
//! driven application with [`VirtualDisplaySession::command`], and let the
//! session stop the recorder and the server when it goes out of scope.

pub mod backend;
pub mod errors;
pub mod probe;
pub mod session;
pub mod types;

pub use backend::{DisplayBackend, FIRST_DISPLAY, XvfbBackend, find_free_display};
pub use errors::DisplayError;
pub use probe::ServerProbe;
pub use session::{SessionLauncher, VirtualDisplaySession};
pub use types::{SessionConfig, recorder_args};

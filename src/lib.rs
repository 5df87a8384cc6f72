// Library surface for headless/integration tests and reuse.
// The terminal front-end lives in main.rs and ui.rs.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod high_score;
pub mod mode;
pub mod runtime;
pub mod score;
pub mod session;
pub mod target;
pub mod timer;

pub use controller::SessionController;
pub use events::{InputEvent, SessionEvent, SessionListener};
pub use mode::Mode;
pub use session::{SessionConfig, SessionState};

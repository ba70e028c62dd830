pub mod chrome;
pub mod document;
pub mod error;
pub mod http;
pub mod loader;
pub mod session;

pub use chrome::ChromeSession;
pub use error::ScanError;
pub use http::HttpSession;
pub use loader::{Readiness, load_page};
pub use session::{Backend, BrowserOptions, BrowserSession, ElementSnapshot, launch_session};

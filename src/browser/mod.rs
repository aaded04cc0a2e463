pub mod chromium;
pub mod mock_session;
pub mod session;
pub mod stealth;

pub use chromium::ChromiumSession;
pub use mock_session::{MockPage, MockSession};
pub use session::{BrowserSession, ClickTarget, TextMatch};

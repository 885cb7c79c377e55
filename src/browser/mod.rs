//! Headless Chrome page fetcher
//!
//! Navigates to listing pages, waits for the item marker and runs the
//! extraction script inside the page.

mod session;

pub use session::{ChromeLauncher, ChromeSession};

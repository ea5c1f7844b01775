//! Browser rendering for pages whose document links are injected by script.
//!
//! The pipeline only sees [`PageRenderer`]; [`WebDriverRenderer`] drives any
//! W3C WebDriver endpoint (chromedriver, geckodriver, a Selenium grid).

mod error;
mod webdriver;

pub use error::RenderError;
pub use webdriver::WebDriverRenderer;

use async_trait::async_trait;

/// Loads a page in a browser and returns the markup after scripts have run.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigates to `url`, waits for the page to settle, and returns its HTML.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the browser cannot be driven or the page
    /// fails to load.
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

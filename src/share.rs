//! Pre-filled social post links.

use serde::{Deserialize, Serialize};
use tracing::info;
use url::form_urlencoded;

const INTENT_ENDPOINT: &str = "https://twitter.com/intent/tweet";

/// Share settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Public address of the app, linked from the post.
    pub origin: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            origin: "https://succinctcolors.netlify.app/".to_string(),
        }
    }
}

impl ShareConfig {
    /// The promotional post text.
    pub fn post_text(&self) -> String {
        format!(
            "🎨 Just created my own version of the Succinct logo!\n\n\
             Try creating your own colorful version at: \n\n\
             {}\n\n\
             Gprove @Succinctlabs #CreativeChallenge",
            self.origin
        )
    }

    /// Post-intent link with the text filled in.
    pub fn intent_url(&self) -> String {
        let text: String = form_urlencoded::byte_serialize(self.post_text().as_bytes()).collect();
        format!("{}?text={}", INTENT_ENDPOINT, text)
    }

    /// Opens the intent link in the default browser.
    pub fn open(&self) -> std::io::Result<String> {
        let url = self.intent_url();
        open::that(&url)?;
        info!(url = %url, "opened share link");
        Ok(url)
    }
}

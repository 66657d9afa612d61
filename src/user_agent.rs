//! User-Agent string sent with every tracker request.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/ggn-downloader";

/// Default User-Agent for tracker requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("ggn-downloader/{version} (+{PROJECT_UA_URL})")
}

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum OpenUrlError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Refusing to open {0} URL (only http/https)")]
    UnsupportedScheme(String),
    #[error("Failed to launch browser: {0}")]
    Launch(#[from] std::io::Error),
}

/// Parse `raw` and accept it only if it is an http(s) URL.
///
/// Article URLs come from a third-party API, so anything else (`file:`,
/// `javascript:`, custom handlers) is rejected before it reaches the
/// system opener.
pub fn browsable_url(raw: &str) -> Result<Url, OpenUrlError> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(OpenUrlError::UnsupportedScheme(scheme.to_string())),
    }
}

/// Open `raw` in the system browser.
pub fn open_in_browser(raw: &str) -> Result<(), OpenUrlError> {
    let url = browsable_url(raw)?;
    open::that(url.as_str())?;
    tracing::debug!(url = %url, "Opened in browser");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_and_https_accepted() {
        assert!(browsable_url("https://en.wikipedia.org/wiki/Rust").is_ok());
        assert!(browsable_url(" http://localhost:5000/api/auth/login ").is_ok());
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert!(matches!(
            browsable_url("file:///etc/passwd"),
            Err(OpenUrlError::UnsupportedScheme(s)) if s == "file"
        ));
        assert!(matches!(
            browsable_url("javascript:alert(1)"),
            Err(OpenUrlError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(browsable_url(""), Err(OpenUrlError::InvalidUrl(_))));
        assert!(matches!(open_in_browser("no scheme"), Err(OpenUrlError::InvalidUrl(_))));
    }
}

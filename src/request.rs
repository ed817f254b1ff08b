//! Conversion requests.

use crate::error::MarkdownifyError;
use crate::pipeline::input::is_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What to convert, plus optional per-call tool overrides.
///
/// Exactly one of `file_path` and `url` must be set. Both fields are kept
/// optional so that requests deserialised from JSON can be validated rather
/// than rejected by the parser; [`ConversionRequest::source`] does the check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub file_path: Option<PathBuf>,
    pub url: Option<String>,
    /// Overrides [`crate::ConverterConfig::project_root`] for this call.
    pub project_root: Option<PathBuf>,
    /// Overrides [`crate::ConverterConfig::uv_path`] for this call.
    pub uv_path: Option<PathBuf>,
}

/// A validated request source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionSource {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for ConversionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionSource::File(p) => write!(f, "{}", p.display()),
            ConversionSource::Url(u) => f.write_str(u),
        }
    }
}

impl ConversionRequest {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Treat `http://` / `https://` strings as URLs and anything else as a path.
    pub fn from_source_str(source: &str) -> Self {
        if is_url(source) {
            Self::url(source)
        } else {
            Self::file(source)
        }
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_uv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.uv_path = Some(path.into());
        self
    }

    /// Whether this request overrides the configured tool location.
    pub fn overrides_tool(&self) -> bool {
        self.project_root.is_some() || self.uv_path.is_some()
    }

    /// Validate that exactly one source is given. Empty strings count as absent.
    pub fn source(&self) -> Result<ConversionSource, MarkdownifyError> {
        let file = self
            .file_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty());
        let url = self.url.as_deref().filter(|u| !u.is_empty());

        match (file, url) {
            (Some(path), None) => Ok(ConversionSource::File(path.clone())),
            (None, Some(url)) => {
                let parsed = reqwest::Url::parse(url).map_err(|e| MarkdownifyError::InvalidInput {
                    reason: format!("'{url}' is not a valid URL: {e}"),
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(MarkdownifyError::InvalidInput {
                        reason: format!("'{url}' is not an HTTP/HTTPS URL"),
                    });
                }
                Ok(ConversionSource::Url(url.to_string()))
            }
            (None, None) => Err(MarkdownifyError::InvalidInput {
                reason: "Either file_path or url must be provided".into(),
            }),
            (Some(_), Some(_)) => Err(MarkdownifyError::InvalidInput {
                reason: "Only one of file_path or url may be provided".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn neither_source_is_invalid_input() {
        let err = ConversionRequest::default().source().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("file_path"), "got: {err}");
    }

    #[test]
    fn both_sources_is_invalid_input() {
        let req = ConversionRequest {
            file_path: Some("a.pdf".into()),
            url: Some("https://example.com/a.pdf".into()),
            ..Default::default()
        };
        assert_eq!(req.source().unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let req = ConversionRequest {
            file_path: Some(PathBuf::new()),
            url: Some("https://example.com/x.docx".into()),
            ..Default::default()
        };
        assert_eq!(
            req.source().unwrap(),
            ConversionSource::Url("https://example.com/x.docx".into())
        );
    }

    #[test]
    fn non_http_urls_are_rejected() {
        assert!(ConversionRequest::url("ftp://example.com/a.pdf").source().is_err());
        assert!(ConversionRequest::url("not a url").source().is_err());
    }

    #[test]
    fn from_source_str_dispatches() {
        assert_eq!(
            ConversionRequest::from_source_str("https://x.org/a.pdf").url.as_deref(),
            Some("https://x.org/a.pdf")
        );
        assert_eq!(
            ConversionRequest::from_source_str("./a.pdf").file_path,
            Some(PathBuf::from("./a.pdf"))
        );
    }

    #[test]
    fn deserialises_from_json() {
        let req: ConversionRequest =
            serde_json::from_str(r#"{"url":"https://example.com/r.pdf"}"#).unwrap();
        assert!(!req.overrides_tool());
        assert!(matches!(req.source().unwrap(), ConversionSource::Url(_)));
    }
}

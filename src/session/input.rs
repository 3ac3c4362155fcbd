//! Parsing of user input lines into commands

use crate::utils::error::VodError;
use url::Url;

/// One broadcast to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub broadcast_id: String,
    pub quality: Option<String>,
}

/// A parsed line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    Fetch(Request),
}

impl Command {
    /// Keywords are matched before tokenization
    pub fn parse(line: &str) -> Result<Self, VodError> {
        match line.trim() {
            "exit" => Ok(Command::Exit),
            "help" => Ok(Command::Help),
            other => Request::parse(other).map(Command::Fetch),
        }
    }
}

impl Request {
    /// `<id or url> [quality]`
    pub fn parse(line: &str) -> Result<Self, VodError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Err(VodError::EmptyInput),
            [identifier] => Ok(Self {
                broadcast_id: parse_broadcast_id(identifier)?,
                quality: None,
            }),
            [identifier, quality] => Ok(Self {
                broadcast_id: parse_broadcast_id(identifier)?,
                quality: Some(quality.to_string()),
            }),
            _ => Err(VodError::InvalidInputFormat(format!(
                "expected a broadcast id or URL and an optional quality, got {} values",
                tokens.len()
            ))),
        }
    }
}

/// Extract the numeric broadcast id from a bare id or a broadcast URL
///
/// ```
/// use vodloader::session::input::parse_broadcast_id;
/// let id = parse_broadcast_id("http://www.twitch.tv/esltv_sc2/b/585041281").unwrap();
/// assert_eq!(id, "585041281");
/// assert_eq!(parse_broadcast_id("585041281").unwrap(), "585041281");
/// ```
pub fn parse_broadcast_id(identifier: &str) -> Result<String, VodError> {
    if let Some(id) = numeric_id(identifier) {
        return Ok(id.to_string());
    }

    let with_scheme = if identifier.contains("://") {
        identifier.to_string()
    } else {
        format!("https://{}", identifier)
    };

    let url = Url::parse(&with_scheme).map_err(|_| {
        VodError::InvalidInputFormat(format!("not a broadcast id or URL: {}", identifier))
    })?;

    url.path_segments()
        .and_then(|segments| segments.rev().find_map(numeric_id))
        .map(str::to_string)
        .ok_or_else(|| {
            VodError::InvalidInputFormat(format!("no broadcast id found in {}", identifier))
        })
}

// "585041281", or with the single-letter prefix the API uses ("v585041281")
fn numeric_id(segment: &str) -> Option<&str> {
    let digits = segment
        .strip_prefix(['v', 'a', 'b'])
        .unwrap_or(segment);
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        assert_eq!(Command::parse("exit").unwrap(), Command::Exit);
        assert_eq!(Command::parse("  help \n").unwrap(), Command::Help);
    }

    #[test]
    fn test_bare_id_with_quality() {
        assert_eq!(
            Command::parse("585041281 720p").unwrap(),
            Command::Fetch(Request {
                broadcast_id: "585041281".to_string(),
                quality: Some("720p".to_string()),
            })
        );
    }

    #[test]
    fn test_urls() {
        let cases = [
            "http://www.twitch.tv/esltv_sc2/b/585041281",
            "https://www.twitch.tv/esltv_sc2/b/585041281/",
            "www.twitch.tv/videos/585041281?t=1h2m",
            "twitch.tv/videos/v585041281#chat",
        ];
        for case in cases {
            assert_eq!(parse_broadcast_id(case).unwrap(), "585041281", "{}", case);
        }
    }

    #[test]
    fn test_url_with_quality() {
        let request = Request::parse("http://www.twitch.tv/esltv_sc2/b/585041281 source").unwrap();
        assert_eq!(request.broadcast_id, "585041281");
        assert_eq!(request.quality.as_deref(), Some("source"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(Command::parse(""), Err(VodError::EmptyInput)));
        assert!(matches!(Command::parse("   \t "), Err(VodError::EmptyInput)));
    }

    #[test]
    fn test_too_many_tokens() {
        assert!(matches!(
            Command::parse("585041281 720p extra"),
            Err(VodError::InvalidInputFormat(_))
        ));
    }

    #[test]
    fn test_no_numeric_id() {
        for case in ["esltv_sc2", "https://www.twitch.tv/esltv_sc2", "v", "http://"] {
            assert!(
                matches!(parse_broadcast_id(case), Err(VodError::InvalidInputFormat(_))),
                "{}",
                case
            );
        }
    }

    #[test]
    fn test_batch_requests_have_no_keywords() {
        assert!(matches!(
            Request::parse("exit"),
            Err(VodError::InvalidInputFormat(_))
        ));
    }
}

/// Input validation for submissions and reviews
use crate::config::SubmissionConfig;
use crate::error::{CoreError, CoreResult};
use crate::submission::wizard::DraftSeed;
use url::Url;

/// Check a submitted link against the allowed-domain list.
///
/// The host must equal an allowed domain or be a subdomain of one; substring
/// matching would accept `evil-youtube.com`.
pub fn validate_link(link: &str, allowed_domains: &[String]) -> CoreResult<()> {
    let url = Url::parse(link)
        .map_err(|_| CoreError::InvalidInput("link is not a valid URL".to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CoreError::InvalidInput(
            "link must be http or https".to_string(),
        ));
    }

    let host = url
        .host_str()
        .ok_or_else(|| CoreError::InvalidInput("link has no host".to_string()))?
        .to_lowercase();

    let allowed = allowed_domains.iter().any(|d| {
        let d = d.to_lowercase();
        host == d || host.ends_with(&format!(".{}", d))
    });

    if allowed {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(format!(
            "links from {} are not accepted",
            host
        )))
    }
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Validate the fields a user supplies before the wizard starts
pub fn validate_seed(seed: &DraftSeed, config: &SubmissionConfig) -> CoreResult<()> {
    validate_link(&seed.link, &config.allowed_domains)?;

    if seed.description.trim().is_empty() {
        return Err(CoreError::InvalidInput(
            "description must not be empty".to_string(),
        ));
    }
    if seed.description.chars().count() > config.max_description_len {
        return Err(CoreError::InvalidInput(format!(
            "description longer than {} characters",
            config.max_description_len
        )));
    }
    if let Some(title) = &seed.title {
        if title.chars().count() > config.max_title_len {
            return Err(CoreError::InvalidInput(format!(
                "title longer than {} characters",
                config.max_title_len
            )));
        }
    }
    if let Some(artist) = &seed.artist {
        if artist.chars().count() > config.max_artist_len {
            return Err(CoreError::InvalidInput(format!(
                "artist name longer than {} characters",
                config.max_artist_len
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;

    fn domains() -> Vec<String> {
        CoreConfig::default().submissions.allowed_domains
    }

    #[test]
    fn accepts_known_domains_and_subdomains() {
        assert!(validate_link("https://youtube.com/watch?v=abc", &domains()).is_ok());
        assert!(validate_link("https://www.youtube.com/watch?v=abc", &domains()).is_ok());
        assert!(validate_link("https://open.spotify.com/track/xyz", &domains()).is_ok());
        assert!(validate_link("https://youtu.be/abc", &domains()).is_ok());
    }

    #[test]
    fn rejects_lookalike_and_unknown_hosts() {
        assert!(validate_link("https://evil-youtube.com/x", &domains()).is_err());
        assert!(validate_link("https://example.com/song", &domains()).is_err());
        assert!(validate_link("ftp://youtube.com/x", &domains()).is_err());
        assert!(validate_link("not a url", &domains()).is_err());
    }

    #[test]
    fn counts_words() {
        assert_eq!(word_count("five words are not enough"), 5);
        assert_eq!(word_count("  spaced   out  "), 2);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn seed_validation_enforces_lengths() {
        let config = CoreConfig::default().submissions;
        let mut seed = DraftSeed {
            link: "https://suno.com/song/1".to_string(),
            title: None,
            artist: None,
            description: "a tight little demo".to_string(),
        };
        assert!(validate_seed(&seed, &config).is_ok());

        seed.description = "x".repeat(config.max_description_len + 1);
        assert!(validate_seed(&seed, &config).is_err());

        seed.description = "ok".to_string();
        seed.artist = Some("y".repeat(config.max_artist_len + 1));
        assert!(validate_seed(&seed, &config).is_err());
    }
}

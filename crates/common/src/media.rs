//! External media URL validation and embedding.
//!
//! Audio never passes through this system; songs carry an opaque link to an
//! external host, validated against a hostname allowlist. A missing or
//! invalid link means "preview not available", never a hard failure on read.

use url::Url;

/// Check whether a URL points at an allow-listed media host.
///
/// Returns `false` for unparseable URLs rather than erroring; callers decide
/// whether to reject (upload boundary) or degrade (display paths).
#[must_use]
pub fn is_allowed_media_url(raw: &str, allowed_hosts: &[String]) -> bool {
    let Ok(parsed) = Url::parse(raw) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    allowed_hosts.iter().any(|allowed| host == allowed)
}

/// Strip query parameters from a media URL, keeping the canonical track link.
#[must_use]
pub fn normalize_media_url(raw: &str) -> Option<String> {
    let mut parsed = Url::parse(raw).ok()?;
    parsed.set_query(None);
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

/// Build the third-party player embed URL for a track link.
///
/// Returns `None` when the link is absent or unparseable so callers render a
/// "preview not available" state instead.
#[must_use]
pub fn embed_url(track_url: Option<&str>, allowed_hosts: &[String]) -> Option<String> {
    let raw = track_url?;
    if !is_allowed_media_url(raw, allowed_hosts) {
        return None;
    }
    let normalized = normalize_media_url(raw)?;
    let mut embed = Url::parse("https://w.soundcloud.com/player/").ok()?;
    embed
        .query_pairs_mut()
        .append_pair("url", &normalized)
        .append_pair("color", "#ff5500")
        .append_pair("auto_play", "false")
        .append_pair("hide_related", "true")
        .append_pair("show_comments", "false")
        .append_pair("visual", "true");
    Some(embed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["soundcloud.com".to_string(), "on.soundcloud.com".to_string()]
    }

    #[test]
    fn test_allowed_hosts() {
        assert!(is_allowed_media_url(
            "https://soundcloud.com/artist/track",
            &hosts()
        ));
        assert!(is_allowed_media_url(
            "https://on.soundcloud.com/abc123",
            &hosts()
        ));
    }

    #[test]
    fn test_rejected_hosts() {
        assert!(!is_allowed_media_url("https://example.com/track", &hosts()));
        assert!(!is_allowed_media_url(
            "https://evil-soundcloud.com/track",
            &hosts()
        ));
        assert!(!is_allowed_media_url("not a url", &hosts()));
        assert!(!is_allowed_media_url("", &hosts()));
    }

    #[test]
    fn test_normalize_strips_query() {
        let normalized =
            normalize_media_url("https://soundcloud.com/artist/track?si=xyz#t=30").unwrap();
        assert_eq!(normalized, "https://soundcloud.com/artist/track");
    }

    #[test]
    fn test_embed_url_for_valid_link() {
        let embed = embed_url(Some("https://soundcloud.com/artist/track"), &hosts()).unwrap();
        assert!(embed.starts_with("https://w.soundcloud.com/player/?"));
        assert!(embed.contains("soundcloud.com%2Fartist%2Ftrack"));
    }

    #[test]
    fn test_embed_url_absent_or_invalid() {
        assert!(embed_url(None, &hosts()).is_none());
        assert!(embed_url(Some("https://example.com/x"), &hosts()).is_none());
        assert!(embed_url(Some("::::"), &hosts()).is_none());
    }
}

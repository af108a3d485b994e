use crate::url::domain::{extract_host, host_matches_suffix};
use url::Url;

/// Path extensions that identify binary or non-article content
const BINARY_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".zip", ".rar", ".7z",
    ".gz", ".tar", ".mp3", ".mp4", ".webm", ".avi", ".mov", ".doc", ".docx", ".xls", ".xlsx",
    ".ppt", ".pptx", ".exe", ".dmg", ".css", ".js",
];

/// Social and tracking hosts that never carry extractable theory (suffix match)
const DENY_HOSTS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "tiktok.com",
    "pinterest.com",
    "linkedin.com",
    "youtube.com",
    "doubleclick.net",
    "googletagmanager.com",
    "google-analytics.com",
];

/// Known high-quality chess sources, accepted without further checks
/// (substring match on the host)
const ALLOW_HOSTS: &[&str] = &[
    "lichess.org",
    "chess.com",
    "chessable.com",
    "chessgames.com",
    "chesstempo.com",
    "chessbase.com",
    "365chess.com",
    "chessprogramming.org",
    "thechesswebsite.com",
    "simplifychess.com",
];

/// Topic vocabulary; a URL from an unknown host must mention at least one
/// of these (case-insensitive, anywhere in the URL) to stay in scope
const TOPIC_KEYWORDS: &[&str] = &[
    "chess",
    "opening",
    "middlegame",
    "endgame",
    "tactic",
    "gambit",
    "checkmate",
    "stalemate",
    "zugzwang",
    "sicilian",
    "najdorf",
    "caro-kann",
    "ruy-lopez",
    "kings-indian",
    "queens-gambit",
    "grandmaster",
    "pgn",
    "fide",
];

/// Classifies a candidate link as in-scope for the harvest or not
///
/// Pure function, no I/O. Decision order:
/// 1. Malformed or non-HTTP(S) URLs are rejected.
/// 2. Paths ending in a binary/media extension are rejected.
/// 3. Denylisted social/tracking hosts are rejected (suffix match).
/// 4. Allowlisted chess sources are accepted immediately (substring match).
/// 5. Anything else is accepted iff the URL mentions a topic keyword.
///
/// # Examples
///
/// ```
/// use caissa_harvest::url::is_in_scope;
///
/// assert!(is_in_scope("https://lichess.org/study/abc"));
/// assert!(is_in_scope("https://example.com/sicilian-defense-guide"));
/// assert!(!is_in_scope("https://facebook.com/x"));
/// assert!(!is_in_scope("not a url"));
/// ```
pub fn is_in_scope(candidate: &str) -> bool {
    let parsed = match Url::parse(candidate) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    let host = match extract_host(&parsed) {
        Some(host) => host,
        None => return false,
    };

    let path = parsed.path().to_ascii_lowercase();
    if BINARY_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        return false;
    }

    if DENY_HOSTS
        .iter()
        .any(|deny| host_matches_suffix(&host, deny))
    {
        return false;
    }

    if ALLOW_HOSTS.iter().any(|allow| host.contains(allow)) {
        return true;
    }

    let lowered = candidate.to_ascii_lowercase();
    TOPIC_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_url_rejected() {
        assert!(!is_in_scope("not a url"));
        assert!(!is_in_scope(""));
        assert!(!is_in_scope("/relative/path"));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert!(!is_in_scope("ftp://chess.example.com/games"));
        assert!(!is_in_scope("mailto:someone@chess.com"));
    }

    #[test]
    fn test_binary_extension_rejected() {
        assert!(!is_in_scope("https://evil.com/game.pdf"));
        assert!(!is_in_scope("https://lichess.org/board.png"));
        assert!(!is_in_scope("https://example.com/chess-archive.zip"));
    }

    #[test]
    fn test_extension_check_ignores_query() {
        // The extension lives in the path; a query mentioning .pdf is fine
        assert!(is_in_scope("https://example.com/chess-guide?ref=intro.pdf"));
    }

    #[test]
    fn test_denylisted_host_rejected() {
        assert!(!is_in_scope("https://facebook.com/x"));
        assert!(!is_in_scope("https://www.youtube.com/watch?v=chess-opening"));
        assert!(!is_in_scope("https://m.twitter.com/chess"));
    }

    #[test]
    fn test_allowlisted_host_accepted() {
        assert!(is_in_scope("https://lichess.org/study/abc"));
        assert!(is_in_scope("https://www.chess.com/lessons"));
        // Substring match extends to related hosts
        assert!(is_in_scope("https://old.chessgames.com/perl/chessgame"));
    }

    #[test]
    fn test_keyword_heuristic() {
        assert!(is_in_scope("https://example.com/sicilian-defense-guide"));
        assert!(is_in_scope("https://blog.example.org/ENDGAME-studies"));
        assert!(!is_in_scope("https://example.com/cooking-recipes"));
    }
}

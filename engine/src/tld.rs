//! Host extraction and top-level-domain classification.
//!
//! Splitting follows the same rules the training pipeline used: the host is
//! cut into subdomain / registrable label / public suffix using the ICANN
//! section of the public suffix list, and the suffix is then checked against
//! the set of suffixes the classifier was trained on.

use std::borrow::Cow;
use std::collections::HashSet;
use std::net::Ipv6Addr;
use std::path::Path;

use once_cell::sync::Lazy;
use psl::Type;
use regex::Regex;
use tracing::{debug, info};

use crate::error::AppError;

/// Sentinel the classifier was trained with for suffixes outside the known set.
pub const UNKNOWN_TLD: &str = "unknown";

const BUILTIN_KNOWN_TLDS: &str = include_str!("../data/known_tlds.txt");

// ASCII full stop plus the ideographic / fullwidth / halfwidth variants.
const LABEL_DOTS: [char; 4] = ['.', '\u{3002}', '\u{ff0e}', '\u{ff61}'];

// Zero-padded octets ("192.168.01.1", "010.001.002.003") still count as an
// IPv4 host.
static IPV4_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$")
        .expect("IPv4 host pattern is valid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainParts {
    pub subdomain: String,
    pub domain: String,
    pub suffix: String,
}

impl DomainParts {
    /// Split the host of `url` into its parts. Never fails: anything that
    /// does not look like a host degrades to empty parts.
    pub fn parse(url: &str) -> Self {
        let netloc = extract_netloc(url);
        if netloc.is_empty() {
            return Self::default();
        }

        if netloc.starts_with('[') && netloc.ends_with(']') && netloc.len() > 1 {
            let inner = &netloc[1..netloc.len() - 1];
            if inner.parse::<Ipv6Addr>().is_ok() {
                return Self {
                    domain: inner.to_string(),
                    ..Self::default()
                };
            }
        }

        let host: String = netloc
            .chars()
            .map(|c| if LABEL_DOTS.contains(&c) { '.' } else { c })
            .collect();

        if IPV4_HOST.is_match(&host) {
            return Self {
                domain: host,
                ..Self::default()
            };
        }

        let labels: Vec<&str> = host.split('.').collect();
        let suffix_labels = icann_suffix_labels(&host.to_lowercase()).min(labels.len());
        let split = labels.len() - suffix_labels;

        let suffix = labels[split..].join(".");
        if split == 0 {
            return Self {
                suffix,
                ..Self::default()
            };
        }

        Self {
            subdomain: labels[..split - 1].join("."),
            domain: labels[split - 1].to_string(),
            suffix,
        }
    }
}

/// Number of labels in the longest ICANN public suffix of `host`, or 0 when
/// the rightmost label is not on the list at all.
fn icann_suffix_labels(host: &str) -> usize {
    let mut candidate = host;
    loop {
        let suffix = match psl::suffix(candidate.as_bytes()) {
            Some(suffix) if suffix.is_known() => suffix,
            _ => return 0,
        };
        let text = match std::str::from_utf8(suffix.as_bytes()) {
            Ok(text) => text,
            Err(_) => return 0,
        };

        match suffix.typ() {
            // Private registrations (blogspot.com, github.io, ...) are part of
            // the registrable name, retry on what is left once the leftmost
            // label of the private rule is dropped.
            Some(Type::Private) => match text.split_once('.') {
                Some((_, rest)) => candidate = rest,
                None => return 0,
            },
            _ => return text.split('.').count(),
        }
    }
}

/// Cut the network location out of a URL: scheme, userinfo, port, path,
/// query and fragment are all discarded. Bracketed IPv6 literals keep their
/// brackets.
fn extract_netloc(url: &str) -> &str {
    let rest = strip_scheme(url);
    let rest = cut(rest, '/');
    let rest = cut(rest, '?');
    let rest = cut(rest, '#');
    let after_userinfo = match rest.rfind('@') {
        Some(at) => &rest[at + 1..],
        None => rest,
    };

    if after_userinfo.starts_with('[') {
        if let Some(close) = after_userinfo.find(']') {
            return &after_userinfo[..=close];
        }
    }

    cut(after_userinfo, ':')
        .trim()
        .trim_end_matches(|c| LABEL_DOTS.contains(&c))
}

fn strip_scheme(url: &str) -> &str {
    let Some(slashes) = url.find("//") else {
        return url;
    };
    if slashes == 0 {
        return &url[2..];
    }
    if slashes < 2 || !url[..slashes].ends_with(':') {
        return url;
    }
    let scheme = &url[..slashes - 1];
    if scheme
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        &url[slashes + 2..]
    } else {
        url
    }
}

fn cut(s: &str, delimiter: char) -> &str {
    s.split(delimiter).next().unwrap_or_default()
}

/// Prefix `http://` unless the URL already carries an http(s) scheme.
pub fn with_http_scheme(url: &str) -> Cow<'_, str> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("http://{url}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TldClassification {
    pub subdomain: String,
    pub domain: String,
    pub tld: String,
}

impl TldClassification {
    pub fn is_unknown(&self) -> bool {
        self.tld == UNKNOWN_TLD
    }

    /// `sub.domain.tld`, or `domain.tld` without a subdomain. Uses the
    /// classified TLD, so unknown suffixes show up as `.unknown`.
    pub fn full_domain(&self) -> String {
        if self.subdomain.is_empty() {
            format!("{}.{}", self.domain, self.tld)
        } else {
            format!("{}.{}.{}", self.subdomain, self.domain, self.tld)
        }
    }
}

/// Immutable set of suffixes the classifier knows about.
#[derive(Debug, Clone)]
pub struct KnownTlds {
    entries: HashSet<String>,
}

impl KnownTlds {
    pub fn builtin() -> Self {
        Self::parse_list(BUILTIN_KNOWN_TLDS)
    }

    /// One suffix per line; blank lines and `#` comments are skipped.
    pub fn parse_list(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let entry = line.trim();
                if entry.is_empty() || entry.starts_with('#') {
                    None
                } else {
                    Some(entry.to_string())
                }
            })
            .collect();
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let known = Self::parse_list(&content);
        if known.is_empty() {
            return Err(AppError::Config(format!(
                "known TLD list {} has no entries",
                path.display()
            )));
        }
        info!("Loaded {} known TLDs from {}", known.len(), path.display());
        Ok(known)
    }

    pub fn contains(&self, suffix: &str) -> bool {
        self.entries.contains(suffix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify the host of `url`, parsing it as `http://` when no http(s)
    /// scheme is present.
    pub fn classify(&self, url: &str) -> TldClassification {
        self.classify_parts(DomainParts::parse(&with_http_scheme(url)))
    }

    pub fn classify_parts(&self, parts: DomainParts) -> TldClassification {
        let tld = if self.contains(&parts.suffix) {
            parts.suffix
        } else {
            debug!("Suffix {:?} not in known set", parts.suffix);
            UNKNOWN_TLD.to_string()
        };
        TldClassification {
            subdomain: parts.subdomain,
            domain: parts.domain,
            tld,
        }
    }
}

impl Default for KnownTlds {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(sub: &str, domain: &str, suffix: &str) -> DomainParts {
        DomainParts {
            subdomain: sub.to_string(),
            domain: domain.to_string(),
            suffix: suffix.to_string(),
        }
    }

    #[test]
    fn test_simple_and_multi_label_suffix() {
        assert_eq!(DomainParts::parse("http://example.com"), parts("", "example", "com"));
        assert_eq!(
            DomainParts::parse("https://www.bbc.co.uk/news"),
            parts("www", "bbc", "co.uk")
        );
        assert_eq!(
            DomainParts::parse("a.b.example.com.au"),
            parts("a.b", "example", "com.au")
        );
    }

    #[test]
    fn test_private_suffix_is_part_of_the_name() {
        assert_eq!(
            DomainParts::parse("http://foo.blogspot.com"),
            parts("foo", "blogspot", "com")
        );
        assert_eq!(
            DomainParts::parse("http://someone.github.io/page"),
            parts("someone", "github", "io")
        );
    }

    #[test]
    fn test_netloc_noise_is_stripped() {
        assert_eq!(
            DomainParts::parse("https://user:pw@login.example.com:8443/a?b=c#d"),
            parts("login", "example", "com")
        );
        assert_eq!(DomainParts::parse("example.com."), parts("", "example", "com"));
        assert_eq!(DomainParts::parse("//example.org/x"), parts("", "example", "org"));
    }

    #[test]
    fn test_ip_hosts() {
        assert_eq!(DomainParts::parse("http://192.168.1.1/login"), parts("", "192.168.1.1", ""));
        assert_eq!(DomainParts::parse("http://[::1]:8080/"), parts("", "::1", ""));
        // not a valid dotted quad, falls through to label splitting
        assert_eq!(DomainParts::parse("http://192.168.1"), parts("192.168", "1", ""));
        assert_eq!(DomainParts::parse("http://256.1.1.1/"), parts("256.1.1", "1", ""));
    }

    #[test]
    fn test_zero_padded_ipv4_hosts() {
        assert_eq!(DomainParts::parse("http://192.168.01.1/login"), parts("", "192.168.01.1", ""));
        assert_eq!(DomainParts::parse("010.001.002.003"), parts("", "010.001.002.003", ""));
    }

    #[test]
    fn test_unlisted_suffix_and_degenerate_hosts() {
        assert_eq!(DomainParts::parse("http://google.notavalidsuffix"), parts("google", "notavalidsuffix", ""));
        assert_eq!(DomainParts::parse("localhost"), parts("", "localhost", ""));
        assert_eq!(DomainParts::parse("http://co.uk"), parts("", "", "co.uk"));
        assert_eq!(DomainParts::parse(""), DomainParts::default());
        assert_eq!(DomainParts::parse("http:///path"), DomainParts::default());
    }

    #[test]
    fn test_case_is_kept() {
        assert_eq!(DomainParts::parse("HTTP://WWW.Example.COM"), parts("WWW", "Example", "COM"));
    }

    #[test]
    fn test_builtin_set() {
        let known = KnownTlds::builtin();
        assert_eq!(known.len(), 667);
        assert!(known.contains("com"));
        assert!(known.contains("xyz"));
        assert!(known.contains("com:443"));
        assert!(known.contains("xn--p1ai"));
        assert!(!known.contains("co.uk"));
        assert!(!known.contains("zzz"));
    }

    #[test]
    fn test_classify() {
        let known = KnownTlds::builtin();

        let c = known.classify("example.com");
        assert_eq!(c.tld, "com");
        assert_eq!(c.full_domain(), "example.com");

        let c = known.classify("http://shop.example.zzz");
        assert!(c.is_unknown());
        assert_eq!(c.subdomain, "shop.example");
        assert_eq!(c.domain, "zzz");
        assert_eq!(c.full_domain(), "shop.example.zzz.unknown");

        // suffix is co.uk, which the model never saw
        assert!(known.classify("www.bbc.co.uk").is_unknown());
    }

    #[test]
    fn test_scheme_normalization_only_for_parsing() {
        assert_eq!(with_http_scheme("example.com"), "http://example.com");
        assert_eq!(with_http_scheme("https://example.com"), "https://example.com");
        // a foreign scheme ends up as the host once http:// is prefixed
        let known = KnownTlds::builtin();
        assert_eq!(known.classify("ftp://files.example.com").domain, "ftp");
    }

    #[test]
    fn test_parse_list_skips_comments() {
        let known = KnownTlds::parse_list("# header\ncom\n\n  org  \n#net\n");
        assert_eq!(known.len(), 2);
        assert!(known.contains("org"));
        assert!(!known.contains("net"));
    }
}

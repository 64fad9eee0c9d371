use crate::lexicon::SuspicionLexicon;
use crate::tld::{DomainParts, KnownTlds};

pub const UNKNOWN_TLD_PENALTY: f64 = 0.6;
pub const KEYWORD_PENALTY: f64 = 0.3;
pub const DECISION_THRESHOLD: f64 = 0.5;

/// How the final probability was put together.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub base_probability: f64,
    pub tld: String,
    pub unknown_tld: bool,
    pub keyword_hits: usize,
    pub probability: f64,
}

/// Raise the model's probability for unknown TLDs and lure keywords, capped
/// at 1.0. The URL is parsed as sent, without scheme normalization.
pub fn assess(url: &str, known_tlds: &KnownTlds, lexicon: &SuspicionLexicon, base_probability: f64) -> RiskAssessment {
    let classification = known_tlds.classify_parts(DomainParts::parse(url));
    let unknown_tld = classification.is_unknown();
    let keyword_hits = lexicon.keyword_hits(url);

    let mut risk = base_probability;
    if unknown_tld {
        risk += UNKNOWN_TLD_PENALTY;
    }
    risk += KEYWORD_PENALTY * keyword_hits as f64;

    RiskAssessment {
        base_probability,
        tld: classification.tld,
        unknown_tld,
        keyword_hits,
        probability: risk.min(1.0),
    }
}

pub fn blend(url: &str, known_tlds: &KnownTlds, lexicon: &SuspicionLexicon, base_probability: f64) -> f64 {
    assess(url, known_tlds, lexicon, base_probability).probability
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub probability: f64,
    pub prediction: u8,
}

impl Verdict {
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability,
            prediction: (probability >= DECISION_THRESHOLD) as u8,
        }
    }

    pub fn rounded_probability(&self) -> f64 {
        round_to(self.probability, 4)
    }

    /// Probability on a 0-100 scale, two decimals.
    pub fn risk_score(&self) -> f64 {
        round_to(self.probability * 100.0, 2)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(url: &str, base: f64) -> RiskAssessment {
        assess(url, &KnownTlds::builtin(), &SuspicionLexicon::default(), base)
    }

    #[test]
    fn test_clean_url_keeps_base_probability() {
        let a = run("http://example.com", 0.1);
        assert!(!a.unknown_tld);
        assert_eq!(a.keyword_hits, 0);
        assert_eq!(a.probability, 0.1);
        assert_eq!(Verdict::from_probability(a.probability).prediction, 0);
    }

    #[test]
    fn test_keywords_saturate() {
        let a = run("https://paypal-login.verify-account.xyz", 0.2);
        assert!(!a.unknown_tld);
        assert_eq!(a.keyword_hits, 4);
        assert_eq!(a.probability, 1.0);
        assert_eq!(Verdict::from_probability(a.probability).prediction, 1);
    }

    #[test]
    fn test_unknown_tld_penalty() {
        let a = run("http://example.zzz", 0.1);
        assert!(a.unknown_tld);
        assert_eq!(a.tld, "unknown");
        assert!((a.probability - 0.7).abs() < 1e-12);

        for base in [0.0, 0.25, 0.39, 0.5, 1.0] {
            let p = run("http://example.zzz", base).probability;
            assert!(p >= (base + UNKNOWN_TLD_PENALTY).min(1.0) - 1e-12);
        }
    }

    #[test]
    fn test_ip_host_counts_as_unknown() {
        let a = run("http://192.168.1.1/login", 0.0);
        assert!(a.unknown_tld);
        assert_eq!(a.keyword_hits, 1);
        assert!((a.probability - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_probability_stays_in_unit_interval() {
        let urls = [
            "",
            "example.com",
            "http://a.b.c.d.e.f.example.co.uk/signin?x=1",
            "https://secure-bank-login-support-invoice.tk",
            "ftp://weird",
            "::::",
        ];
        for url in urls {
            for base in [0.0, 0.01, 0.5, 0.99, 1.0] {
                let p = blend(url, &KnownTlds::builtin(), &SuspicionLexicon::default(), base);
                assert!((0.0..=1.0).contains(&p), "{url} {base} -> {p}");
            }
        }
    }

    #[test]
    fn test_verdict_rounding() {
        let v = Verdict::from_probability(0.123456);
        assert_eq!(v.rounded_probability(), 0.1235);
        assert_eq!(v.risk_score(), 12.35);
        assert_eq!(v.prediction, 0);

        let v = Verdict::from_probability(0.5);
        assert_eq!(v.prediction, 1);
        assert_eq!(v.risk_score(), 50.0);
    }
}

//! URL-structure features.
//!
//! Everything here is computed from the URL string exactly as the caller sent
//! it. Only the host split (see [`crate::tld`]) sees the `http://`-normalized
//! copy. Several columns keep quirks of the training pipeline (letters are
//! counted in the domain label only, "other special chars" is just `/`) and
//! must stay that way for the model's sake.

use regex::Regex;

use crate::lexicon::{SuspicionFlags, SuspicionLexicon};
use crate::record::{FeatureRecord, FeatureValue, SchemaError};
use crate::tld::{KnownTlds, TldClassification};

const DOTTED_QUAD: &str = r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$";

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalFeatures {
    pub url_length: i64,
    pub domain_length: i64,
    pub is_domain_ip: i64,
    pub tld: String,
    pub tld_length: i64,
    pub no_of_subdomain: i64,
    pub has_obfuscation: i64,
    pub no_of_obfuscated_char: i64,
    pub obfuscation_ratio: f64,
    pub no_of_letters: i64,
    pub letter_ratio: f64,
    pub no_of_digits: i64,
    pub digit_ratio: f64,
    pub no_of_equals: i64,
    pub no_of_qmark: i64,
    pub no_of_ampersand: i64,
    pub no_of_other_special: i64,
    pub special_char_ratio: f64,
    pub is_https: i64,
}

impl LexicalFeatures {
    /// Column name / value pairs in schema order.
    pub fn columns(&self) -> Vec<(&'static str, FeatureValue)> {
        vec![
            ("URLLength", self.url_length.into()),
            ("DomainLength", self.domain_length.into()),
            ("IsDomainIP", self.is_domain_ip.into()),
            ("TLD", self.tld.clone().into()),
            ("TLDLength", self.tld_length.into()),
            ("NoOfSubDomain", self.no_of_subdomain.into()),
            ("HasObfuscation", self.has_obfuscation.into()),
            ("NoOfObfuscatedChar", self.no_of_obfuscated_char.into()),
            ("ObfuscationRatio", self.obfuscation_ratio.into()),
            ("NoOfLettersInURL", self.no_of_letters.into()),
            ("LetterRatioInURL", self.letter_ratio.into()),
            ("NoOfDegitsInURL", self.no_of_digits.into()),
            ("DegitRatioInURL", self.digit_ratio.into()),
            ("NoOfEqualsInURL", self.no_of_equals.into()),
            ("NoOfQMarkInURL", self.no_of_qmark.into()),
            ("NoOfAmpersandInURL", self.no_of_ampersand.into()),
            ("NoOfOtherSpecialCharsInURL", self.no_of_other_special.into()),
            ("SpacialCharRatioInURL", self.special_char_ratio.into()),
            ("IsHTTPS", self.is_https.into()),
        ]
    }
}

pub struct FeatureExtractor {
    known_tlds: KnownTlds,
    lexicon: SuspicionLexicon,
    dotted_quad: Regex,
}

impl FeatureExtractor {
    pub fn new(known_tlds: KnownTlds, lexicon: SuspicionLexicon) -> Self {
        Self {
            known_tlds,
            lexicon,
            dotted_quad: Regex::new(DOTTED_QUAD).expect("dotted quad pattern is valid"),
        }
    }

    pub fn known_tlds(&self) -> &KnownTlds {
        &self.known_tlds
    }

    pub fn lexicon(&self) -> &SuspicionLexicon {
        &self.lexicon
    }

    /// Full classifier input for `url`.
    pub fn extract(&self, url: &str) -> Result<FeatureRecord, SchemaError> {
        let lexical = self.lexical(url);
        let suspicion = self.lexicon.score(url);
        assemble(&lexical, &suspicion)
    }

    pub fn lexical(&self, url: &str) -> LexicalFeatures {
        let parts = self.known_tlds.classify(url);
        self.lexical_from_parts(url, &parts)
    }

    pub fn lexical_from_parts(&self, url: &str, parts: &TldClassification) -> LexicalFeatures {
        let url_length = url.chars().count() as i64;

        let no_of_letters = parts.domain.chars().filter(|c| c.is_alphabetic()).count() as i64;
        let no_of_digits = url.chars().filter(|c| c.is_numeric()).count() as i64;
        let no_of_other_special = count_char(url, '/');

        LexicalFeatures {
            url_length,
            domain_length: parts.full_domain().chars().count() as i64,
            is_domain_ip: self.dotted_quad.is_match(&parts.domain) as i64,
            tld: parts.tld.clone(),
            tld_length: parts.tld.chars().count() as i64,
            no_of_subdomain: parts.subdomain.split('.').filter(|l| !l.is_empty()).count() as i64,
            // no obfuscation detection; the columns stay for the model
            has_obfuscation: 0,
            no_of_obfuscated_char: 0,
            obfuscation_ratio: 0.0,
            no_of_letters,
            letter_ratio: ratio(no_of_letters, url_length),
            no_of_digits,
            digit_ratio: ratio(no_of_digits, url_length),
            no_of_equals: count_char(url, '='),
            no_of_qmark: count_char(url, '?'),
            no_of_ampersand: count_char(url, '&'),
            no_of_other_special,
            special_char_ratio: ratio(no_of_other_special, url_length),
            is_https: url.to_lowercase().starts_with("https://") as i64,
        }
    }
}

/// Merge URL features and keyword flags into one classifier row. Page-content
/// columns are never observed and take their schema defaults.
pub fn assemble(lexical: &LexicalFeatures, suspicion: &SuspicionFlags) -> Result<FeatureRecord, SchemaError> {
    let keyword_columns = suspicion
        .columns()
        .map(|(name, value)| (name, FeatureValue::Int(value)));
    FeatureRecord::assemble(lexical.columns().into_iter().chain(keyword_columns))
}

fn count_char(s: &str, needle: char) -> i64 {
    s.chars().filter(|c| *c == needle).count() as i64
}

fn ratio(count: i64, total: i64) -> f64 {
    if total > 0 {
        count as f64 / total as f64
    } else {
        0.0
    }
}

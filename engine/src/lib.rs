//! URL phishing scorer: lexical features, a pre-trained classifier and a
//! heuristic blend, served over HTTP.

pub mod blend;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod model;
pub mod record;
pub mod routes;
pub mod tld;
pub mod types;

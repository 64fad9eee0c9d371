use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    blend::{self, Verdict},
    error::{validation_error, AppError},
    features::FeatureExtractor,
    lexicon::SuspicionLexicon,
    model::Classifier,
    record::FeatureRecord,
    tld::KnownTlds,
    types::PredictResponse,
};

/// Scores URLs: features, model probability, heuristic blend.
///
/// Holds only read-only state, so a single instance serves every request
/// concurrently without locking.
pub struct PhishingEngine {
    extractor: FeatureExtractor,
    classifier: Arc<dyn Classifier>,
    max_url_length: usize,
}

impl PhishingEngine {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        known_tlds: KnownTlds,
        lexicon: SuspicionLexicon,
        max_url_length: usize,
    ) -> Self {
        info!(
            "Initializing phishing engine: model {}, {} known TLDs",
            classifier.version(),
            known_tlds.len()
        );
        Self {
            extractor: FeatureExtractor::new(known_tlds, lexicon),
            classifier,
            max_url_length,
        }
    }

    pub fn model_version(&self) -> &str {
        self.classifier.version()
    }

    pub fn known_tlds(&self) -> &KnownTlds {
        self.extractor.known_tlds()
    }

    pub fn features(&self, url: &str) -> Result<FeatureRecord, AppError> {
        self.validate_url(url)?;
        Ok(self.extractor.extract(url)?)
    }

    pub fn score_url(&self, url: &str) -> Result<PredictResponse, AppError> {
        let record = self.features(url)?;

        let base_probability = self.classifier.predict_proba(&record)?;
        let model_label = self.classifier.predict(&record)?;

        let assessment = blend::assess(
            url,
            self.extractor.known_tlds(),
            self.extractor.lexicon(),
            base_probability,
        );
        let verdict = Verdict::from_probability(assessment.probability);

        debug!(
            url,
            base_probability,
            model_label,
            tld = %assessment.tld,
            keyword_hits = assessment.keyword_hits,
            final_probability = verdict.probability,
            "Scored URL"
        );

        Ok(PredictResponse::new(url, &verdict))
    }

    // Empty or blank URLs are scored like any other string.
    fn validate_url(&self, url: &str) -> Result<(), AppError> {
        if url.chars().count() > self.max_url_length {
            return Err(validation_error(&format!(
                "URL longer than {} characters",
                self.max_url_length
            )));
        }
        Ok(())
    }
}

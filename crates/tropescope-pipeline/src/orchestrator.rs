//! Pipeline orchestrator
//!
//! Per input: extract the claim, then run retrieval → mapping alongside the
//! counterfactual test, then aggregate. Only extraction failures abort an
//! input; the other stages degrade and mark the result.

use crate::aggregator::aggregate;
use crate::cache::{Lookup, ResultCache};
use crate::config::PipelineConfig;
use crate::counterfactual::CounterfactualTester;
use crate::error::{PipelineError, SetupError};
use crate::extractor::ClaimExtractor;
use crate::mapper::TropeMapper;
use crate::metrics::{MetricsSnapshot, PipelineMetrics};
use crate::retriever::ContextRetriever;
use crate::retry::OracleCaller;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tropescope_domain::{
    ClaimRecord, CounterfactualResult, Degradation, DegradedStage, Explicitness, KnowledgeStore, ReasoningOracle,
    RetrievedContext, RiskResult, Target, TropeMatch,
};
use tropescope_store::KnowledgeBase;

/// Outcome of classifying one input
pub type ItemResult = Result<Arc<RiskResult>, PipelineError>;

const SHORT_TEXT_EXPLANATION: &str = "Text too short for meaningful analysis.";
const NO_TROPE_EXPLANATION: &str = "No clear identity-based implication detected.";

/// The classification pipeline
///
/// Cheap to clone; clones share the cache, the concurrency limit and the
/// metrics.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tropescope_domain::{OracleStage, Verdict};
/// use tropescope_llm::MockOracle;
/// use tropescope_pipeline::{Pipeline, PipelineConfig};
/// use tropescope_store::embedding::HashedTokenEmbedding;
/// use tropescope_store::KnowledgeBase;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let oracle = MockOracle::new();
/// oracle.add_response(
///     OracleStage::ClaimExtraction,
///     r#"{"claim": "The weather is nice", "target": "unclear", "explicitness": "implicit"}"#,
/// );
/// oracle.add_response(OracleStage::TropeMapping, r#"{"mapped_trope": "none", "trope_strength": 0.0}"#);
/// oracle.add_response(OracleStage::Counterfactual, r#"{"meaning_preserved": true}"#);
///
/// let store = KnowledgeBase::builtin(Arc::new(HashedTokenEmbedding::new(384))).unwrap();
/// let pipeline = Pipeline::new(Arc::new(oracle), Arc::new(store), PipelineConfig::default()).unwrap();
///
/// let result = pipeline.classify("The weather is nice today.").await.unwrap();
/// assert_eq!(result.verdict(), Verdict::Low);
/// # }
/// ```
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    config: PipelineConfig,
    extractor: ClaimExtractor,
    retriever: ContextRetriever,
    mapper: TropeMapper,
    tester: CounterfactualTester,
    cache: Option<ResultCache>,
    permits: Semaphore,
    metrics: PipelineMetrics,
}

impl Pipeline {
    /// Create a pipeline over an oracle and a knowledge store
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        store: Arc<dyn KnowledgeStore>,
        config: PipelineConfig,
    ) -> Result<Self, SetupError> {
        config.validate().map_err(SetupError::Config)?;

        let caller = OracleCaller::new(oracle, config.retry.clone(), config.stage_timeout());
        let cache = config
            .cache
            .enabled
            .then(|| ResultCache::new(config.cache.capacity));

        info!(
            concurrency = config.concurrency,
            retrieval_k = config.retrieval_k,
            cache_enabled = config.cache.enabled,
            max_retries = config.retry.effective_retries(),
            "Pipeline ready"
        );

        Ok(Self {
            inner: Arc::new(PipelineInner {
                extractor: ClaimExtractor::new(caller.clone()),
                retriever: ContextRetriever::new(store),
                mapper: TropeMapper::new(caller.clone()),
                tester: CounterfactualTester::new(caller),
                cache,
                permits: Semaphore::new(config.concurrency),
                metrics: PipelineMetrics::new(),
                config,
            }),
        })
    }

    /// Build the configured oracle and knowledge base, then the pipeline
    pub fn from_config(config: PipelineConfig) -> Result<Self, SetupError> {
        config.validate().map_err(SetupError::Config)?;

        let oracle = config.oracle.build()?;
        let store = KnowledgeBase::from_config(&config.embedding, config.knowledge_base_dir.as_deref())?;

        Self::new(oracle, Arc::new(store), config)
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Current counter values
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Number of completed results held in the cache
    pub fn cached_results(&self) -> usize {
        self.inner.cache.as_ref().map_or(0, ResultCache::len)
    }

    /// Forget every cached result
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.clear();
        }
    }

    /// Classify one text
    pub async fn classify(&self, text: &str) -> ItemResult {
        self.inner.classify(text, &CancellationToken::new()).await
    }

    /// Classify many texts; output `i` belongs to input `i`
    ///
    /// Each distinct text runs at most once, and its outcome is copied to
    /// every position holding that text. A failed item never fails the batch.
    pub async fn classify_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<ItemResult> {
        self.classify_batch_with_cancel(texts, CancellationToken::new()).await
    }

    /// [`classify_batch`](Self::classify_batch) that stops dispatching new
    /// stages once `cancel` fires
    ///
    /// Items still queued resolve to [`PipelineError::Cancelled`]. Oracle calls
    /// already sent are allowed to finish.
    pub async fn classify_batch_with_cancel<S: AsRef<str>>(
        &self,
        texts: &[S],
        cancel: CancellationToken,
    ) -> Vec<ItemResult> {
        let mut distinct: Vec<String> = Vec::new();
        let mut index_of: HashMap<&str, usize> = HashMap::new();
        let positions: Vec<usize> = texts
            .iter()
            .map(|text| {
                let text = text.as_ref();
                *index_of.entry(text).or_insert_with(|| {
                    distinct.push(text.to_string());
                    distinct.len() - 1
                })
            })
            .collect();

        debug!(inputs = texts.len(), distinct = distinct.len(), "Dispatching batch");

        let handles = distinct.into_iter().map(|text| {
            let inner = Arc::clone(&self.inner);
            let cancel = cancel.clone();
            tokio::spawn(async move { inner.classify(&text, &cancel).await })
        });

        let outcomes: Vec<ItemResult> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|e| Err(PipelineError::TaskFailed(e.to_string()))))
            .collect();

        positions.into_iter().map(|idx| outcomes[idx].clone()).collect()
    }

    /// Blocking [`classify`](Self::classify)
    ///
    /// Runs on a private single-threaded runtime. Returns
    /// [`PipelineError::BlockingInAsyncContext`] when called from async code.
    pub fn classify_blocking(&self, text: &str) -> ItemResult {
        blocking_runtime()?.block_on(self.classify(text))
    }

    /// Blocking [`classify_batch`](Self::classify_batch)
    pub fn classify_batch_blocking<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<ItemResult>, PipelineError> {
        Ok(blocking_runtime()?.block_on(self.classify_batch(texts)))
    }
}

impl PipelineInner {
    async fn classify(&self, text: &str, cancel: &CancellationToken) -> ItemResult {
        self.metrics.record_classification();

        let outcome = self.lookup_or_compute(text, cancel).await;
        if let Err(e) = &outcome {
            self.metrics.record_failure();
            warn!(error = %e, text_len = text.len(), "Classification failed");
        }
        outcome
    }

    async fn lookup_or_compute(&self, text: &str, cancel: &CancellationToken) -> ItemResult {
        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(PipelineError::TextTooLong(length, self.config.max_text_length));
        }

        let Some(cache) = &self.cache else {
            return self.compute(text, cancel).await;
        };

        let (outcome, lookup) = cache.get_or_compute(text, || self.compute(text, cancel)).await;
        if lookup == Lookup::Shared && outcome.is_ok() {
            self.metrics.record_cache_hit();
            debug!(cache_hit = true, text_len = text.len(), "Served cached result");
        }
        outcome
    }

    async fn compute(&self, text: &str, cancel: &CancellationToken) -> ItemResult {
        if text.trim().chars().count() < self.config.min_text_chars {
            self.metrics.record_fast_path();
            debug!(text_len = text.len(), "Input below minimum length, skipping stages");
            return Ok(Arc::new(short_text_result(text)));
        }

        // Queue for a slot, unless the batch is cancelled first
        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
            permit = self.permits.acquire() => permit.map_err(|e| PipelineError::TaskFailed(e.to_string()))?,
        };

        self.metrics.record_pipeline_run();
        let result = self.run_stages(text, cancel).await?;

        if result.is_degraded() {
            self.metrics.record_degraded();
        }
        info!(
            verdict = %result.verdict(),
            risk_score = result.risk_score(),
            trope = %result.trope(),
            degraded = result.is_degraded(),
            "Classified text"
        );

        Ok(Arc::new(result))
    }

    async fn run_stages(&self, text: &str, cancel: &CancellationToken) -> Result<RiskResult, PipelineError> {
        ensure_active(cancel)?;
        let claim = self.extractor.extract(text).await?;
        ensure_active(cancel)?;

        let (mapped, (counterfactual, counterfactual_degradation)) =
            tokio::join!(self.retrieve_and_map(&claim, cancel), self.test_counterfactual(&claim));

        let (trope_match, mut degradations) = mapped?;
        degradations.extend(counterfactual_degradation);

        Ok(aggregate(claim, trope_match, counterfactual).with_degradations(degradations))
    }

    async fn retrieve_and_map(
        &self,
        claim: &ClaimRecord,
        cancel: &CancellationToken,
    ) -> Result<(TropeMatch, Vec<Degradation>), PipelineError> {
        let mut degradations = Vec::new();

        let context = match self.retriever.retrieve(claim, self.config.retrieval_k).await {
            Ok(context) => context,
            Err(e) => {
                warn!(stage = %DegradedStage::Retrieval, error = %e, "Continuing without reference material");
                degradations.push(Degradation::new(DegradedStage::Retrieval, e.to_string()));
                RetrievedContext::empty(claim.extracted_claim.clone())
            }
        };

        ensure_active(cancel)?;

        let trope_match = match self.mapper.map_trope(claim, &context).await {
            Ok(trope_match) => trope_match,
            Err(e) => {
                warn!(stage = %DegradedStage::TropeMapping, error = %e, "Treating claim as matching no trope");
                degradations.push(Degradation::new(DegradedStage::TropeMapping, e.to_string()));
                TropeMatch::none(NO_TROPE_EXPLANATION, format!("Trope mapping unavailable: {}", e))
            }
        };

        Ok((trope_match, degradations))
    }

    async fn test_counterfactual(&self, claim: &ClaimRecord) -> (CounterfactualResult, Option<Degradation>) {
        match self.tester.test_counterfactual(claim).await {
            Ok(result) => (result, None),
            Err(e) => {
                warn!(stage = %DegradedStage::Counterfactual, error = %e, "Assuming identity-dependent meaning");
                (
                    CounterfactualResult::undetermined(format!("Counterfactual test unavailable: {}", e)),
                    Some(Degradation::new(DegradedStage::Counterfactual, e.to_string())),
                )
            }
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

/// Result for inputs too short to analyse; no oracle involved
fn short_text_result(text: &str) -> RiskResult {
    aggregate(
        ClaimRecord::new(text, text, Target::Unclear, Explicitness::Implicit),
        TropeMatch::none(SHORT_TEXT_EXPLANATION, ""),
        CounterfactualResult::new("", true, ""),
    )
}

fn blocking_runtime() -> Result<Runtime, PipelineError> {
    if Handle::try_current().is_ok() {
        return Err(PipelineError::BlockingInAsyncContext);
    }
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PipelineError::Runtime(e.to_string()))
}

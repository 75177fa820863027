//! Concurrent review classification
//!
//! Every review in a batch is classified independently: one task per review,
//! each running the retry state machine against the inference backend. A
//! semaphore caps the number of requests in flight. A permit is held only for
//! the duration of one attempt, so reviews waiting out a backoff do not block
//! others.
//!
//! Failures never fail the batch. A review whose attempts are exhausted (or
//! whose task panics) yields an empty result.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use bankrev_common::config::InferenceConfig;

use super::inference_client::{ChatRequest, InferenceBackend, InferenceError};
use super::lenient_json::decode_lenient;
use super::prompt::RequestTemplate;
use super::response_validator::{validate_pairs, ValidationError};
use super::retry_policy::{AttemptOutcome, RetryAction, RetryPolicy, RetryState};
use crate::models::{ClassificationResult, RawTopicSentimentPair, ReviewInput, ReviewLabels};

/// Why a single attempt failed
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Model output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Model output rejected: {0}")]
    Validation(#[from] ValidationError),

    #[error("Concurrency gate closed")]
    GateClosed,
}

impl AttemptError {
    fn outcome(&self) -> AttemptOutcome {
        match self {
            AttemptError::Inference(e) if !e.is_retryable() => AttemptOutcome::Fatal,
            AttemptError::GateClosed => AttemptOutcome::Fatal,
            _ => AttemptOutcome::Retryable,
        }
    }
}

/// Cheap to clone; clones share the backend and the concurrency gate
#[derive(Clone)]
pub struct Classifier {
    backend: Arc<dyn InferenceBackend>,
    gate: Arc<Semaphore>,
    policy: RetryPolicy,
    template: Arc<RequestTemplate>,
    attempt_timeout: Duration,
}

impl Classifier {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        config: &InferenceConfig,
        template: RequestTemplate,
    ) -> Self {
        Self {
            backend,
            gate: Arc::new(Semaphore::new(config.max_connections.max(1))),
            policy: RetryPolicy::new(config.max_retries, config.retry_backoff()),
            template: Arc::new(template),
            attempt_timeout: config.timeout(),
        }
    }

    /// Classify a batch; the result has one entry per input, in input order
    pub async fn classify_batch(&self, reviews: &[ReviewInput]) -> Vec<ClassificationResult> {
        self.classify_labels(reviews)
            .await
            .iter()
            .map(ClassificationResult::from)
            .collect()
    }

    /// Like [`Classifier::classify_batch`] but keeps the typed pairs and the
    /// attempt counts
    pub async fn classify_labels(&self, reviews: &[ReviewInput]) -> Vec<ReviewLabels> {
        let mut tasks = JoinSet::new();
        for (index, review) in reviews.iter().cloned().enumerate() {
            let classifier = self.clone();
            tasks.spawn(async move { (index, classifier.classify_review(&review).await) });
        }

        let mut slots: Vec<Option<ReviewLabels>> = vec![None; reviews.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, labels)) => slots[index] = Some(labels),
                Err(e) => error!(error = %e, "Classification task did not complete"),
            }
        }

        slots
            .into_iter()
            .zip(reviews)
            .map(|(slot, review)| {
                slot.unwrap_or(ReviewLabels {
                    id: review.id,
                    pairs: None,
                    attempts: 0,
                })
            })
            .collect()
    }

    /// Run one review through the retry state machine
    pub async fn classify_review(&self, review: &ReviewInput) -> ReviewLabels {
        let request = self.template.build(&review.text);
        let mut state = RetryState::Pending;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let result = self.gated_attempt(&request).await;

            let outcome = match &result {
                Ok(_) => AttemptOutcome::Success,
                Err(e) => {
                    warn!(review_id = review.id, attempt, cause = %e, "Classification attempt failed");
                    e.outcome()
                }
            };

            let (next_state, action) = self.policy.next(state, outcome);
            state = next_state;

            match action {
                RetryAction::Accept => {
                    debug!(review_id = review.id, attempt, "Review classified");
                    return ReviewLabels {
                        id: review.id,
                        pairs: result.ok(),
                        attempts: attempt,
                    };
                }
                RetryAction::RetryAfter(delay) => tokio::time::sleep(delay).await,
                RetryAction::GiveUp => {
                    warn!(
                        review_id = review.id,
                        attempts = attempt,
                        "Giving up on review, returning empty classification"
                    );
                    return ReviewLabels {
                        id: review.id,
                        pairs: None,
                        attempts: attempt,
                    };
                }
            }
        }
    }

    async fn gated_attempt(
        &self,
        request: &ChatRequest,
    ) -> Result<Vec<RawTopicSentimentPair>, AttemptError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| AttemptError::GateClosed)?;

        let content = tokio::time::timeout(self.attempt_timeout, self.backend.complete(request))
            .await
            .map_err(|_| InferenceError::Timeout(self.attempt_timeout))??;

        let value = decode_lenient(&content)?;
        Ok(validate_pairs(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prompt::NO_THINK_SUFFIX;
    use async_trait::async_trait;
    use bankrev_common::Sentiment;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies from a per-text script; the last reply repeats
    struct ScriptedBackend {
        scripts: HashMap<String, Vec<Result<String, InferenceError>>>,
        calls: Mutex<HashMap<String, usize>>,
        delay: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                scripts: HashMap::new(),
                calls: Mutex::new(HashMap::new()),
                delay: Duration::ZERO,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn script(mut self, text: &str, replies: Vec<Result<String, InferenceError>>) -> Self {
            self.scripts.insert(format!("{text}{NO_THINK_SUFFIX}"), replies);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls_for(&self, text: &str) -> usize {
            let key = format!("{text}{NO_THINK_SUFFIX}");
            self.calls.lock().unwrap().get(&key).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let text = request.messages[1].content.clone();
            let call_index = {
                let mut calls = self.calls.lock().unwrap();
                let count = calls.entry(text.clone()).or_insert(0);
                *count += 1;
                *count - 1
            };

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if text.starts_with("panic") {
                panic!("backend exploded");
            }

            let replies = self.scripts.get(&text).expect("unscripted review text");
            let reply = &replies[call_index.min(replies.len() - 1)];
            match reply {
                Ok(content) => Ok(content.clone()),
                Err(InferenceError::Build(msg)) => Err(InferenceError::Build(msg.clone())),
                Err(_) => Err(InferenceError::Status(503, "unavailable".to_string())),
            }
        }
    }

    fn config(max_connections: usize) -> InferenceConfig {
        InferenceConfig {
            max_connections,
            retry_backoff_ms: 0,
            ..InferenceConfig::default()
        }
    }

    fn classifier(backend: Arc<ScriptedBackend>, max_connections: usize) -> Classifier {
        classifier_with(backend, &config(max_connections))
    }

    fn classifier_with(backend: Arc<ScriptedBackend>, config: &InferenceConfig) -> Classifier {
        let template = RequestTemplate::new(config, "sys".to_string());
        Classifier::new(backend, config, template)
    }

    const CREDIT_NEGATIVE: &str = "[{'topic': 'Кредиты', 'sentiment': 'negative'}]";

    #[tokio::test]
    async fn test_first_attempt_success_makes_one_call() {
        let backend = Arc::new(ScriptedBackend::new().script("a", vec![Ok(CREDIT_NEGATIVE.into())]));
        let classifier = classifier(backend.clone(), 4);

        let labels = classifier.classify_review(&ReviewInput::new(1, "a")).await;

        assert_eq!(backend.calls_for("a"), 1);
        assert_eq!(labels.attempts, 1);
        assert_eq!(
            labels.pairs,
            Some(vec![RawTopicSentimentPair::new("Кредиты", Sentiment::Negative)])
        );
    }

    #[tokio::test]
    async fn test_always_malformed_uses_every_attempt() {
        let backend = Arc::new(ScriptedBackend::new().script("a", vec![Ok("не json".into())]));
        let classifier = classifier(backend.clone(), 4);

        let results = classifier.classify_batch(&[ReviewInput::new(5, "a")]).await;

        assert_eq!(backend.calls_for("a"), 3);
        assert_eq!(results, vec![ClassificationResult::empty(5)]);
    }

    #[tokio::test]
    async fn test_recovers_after_invalid_shape_and_status_error() {
        let backend = Arc::new(ScriptedBackend::new().script(
            "a",
            vec![
                Ok("[{'topic': 'Кредиты'}]".into()),
                Err(InferenceError::Status(503, String::new())),
                Ok(CREDIT_NEGATIVE.into()),
            ],
        ));
        let classifier = classifier(backend.clone(), 4);

        let labels = classifier.classify_review(&ReviewInput::new(1, "a")).await;

        assert_eq!(labels.attempts, 3);
        assert!(labels.succeeded());
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let backend = Arc::new(
            ScriptedBackend::new().script("a", vec![Err(InferenceError::Build("bad".into()))]),
        );
        let classifier = classifier(backend.clone(), 4);

        let labels = classifier.classify_review(&ReviewInput::new(1, "a")).await;

        assert_eq!(backend.calls_for("a"), 1);
        assert!(!labels.succeeded());
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolates_failures() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("ok", vec![Ok(CREDIT_NEGATIVE.into())])
                .script("bad", vec![Ok("{'topic': 'Кредиты'}".into())])
                .script("empty", vec![Ok("[]".into())]),
        );
        let classifier = classifier(backend, 2);
        let input = vec![
            ReviewInput::new(10, "ok"),
            ReviewInput::new(11, "bad"),
            ReviewInput::new(12, "empty"),
            ReviewInput::new(13, "ok"),
        ];

        let results = classifier.classify_batch(&input).await;

        let ids: Vec<i64> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13]);
        assert_eq!(results[0].topics, vec!["Кредиты"]);
        assert_eq!(results[0].sentiments, vec!["отрицательно"]);
        assert!(results[1].is_empty());
        assert!(results[2].is_empty());
        assert_eq!(results[3].topics, vec!["Кредиты"]);
    }

    #[tokio::test]
    async fn test_panicking_task_yields_empty_result() {
        let backend = Arc::new(ScriptedBackend::new().script("ok", vec![Ok(CREDIT_NEGATIVE.into())]));
        let classifier = classifier(backend, 2);

        let results = classifier
            .classify_batch(&[ReviewInput::new(1, "panic now"), ReviewInput::new(2, "ok")])
            .await;

        assert_eq!(results[0], ClassificationResult::empty(1));
        assert_eq!(results[1].topics, vec!["Кредиты"]);
    }

    #[tokio::test]
    async fn test_concurrency_cap_is_respected() {
        let mut backend = ScriptedBackend::new().with_delay(Duration::from_millis(20));
        let mut input = Vec::new();
        for i in 0..12 {
            let text = format!("review {i}");
            backend = backend.script(&text, vec![Ok("[]".into())]);
            input.push(ReviewInput::new(i, text));
        }
        let backend = Arc::new(backend);
        let classifier = classifier(backend.clone(), 3);

        let results = classifier.classify_batch(&input).await;

        assert_eq!(results.len(), 12);
        let max = backend.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "observed {max} concurrent requests");
        assert!(max >= 1);
    }

    #[tokio::test]
    async fn test_backoff_releases_the_gate() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("bad", vec![Ok("не json".into())])
                .script("good", vec![Ok(CREDIT_NEGATIVE.into())]),
        );
        let config = InferenceConfig {
            max_connections: 1,
            retry_backoff_ms: 800,
            ..InferenceConfig::default()
        };
        let classifier = classifier_with(backend.clone(), &config);

        let retrying = {
            let classifier = classifier.clone();
            tokio::spawn(async move { classifier.classify_review(&ReviewInput::new(1, "bad")).await })
        };
        while backend.calls_for("bad") == 0 {
            tokio::task::yield_now().await;
        }

        // The only permit is free while "bad" sleeps between attempts
        let started = std::time::Instant::now();
        let good = classifier.classify_review(&ReviewInput::new(2, "good")).await;
        let elapsed = started.elapsed();

        assert!(good.succeeded());
        assert_eq!(good.attempts, 1);
        assert!(elapsed < Duration::from_millis(400), "waited {elapsed:?} for the gate");

        let bad = retrying.await.unwrap();
        assert_eq!(bad.attempts, 3);
        assert!(!bad.succeeded());
        assert_eq!(backend.calls_for("bad"), 3);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let classifier = classifier(Arc::new(ScriptedBackend::new()), 1);
        assert!(classifier.classify_batch(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_kept_positionally() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .script("x", vec![Ok(CREDIT_NEGATIVE.into())])
                .script("y", vec![Ok("[]".into())]),
        );
        let classifier = classifier(backend, 2);

        let results = classifier
            .classify_batch(&[ReviewInput::new(7, "x"), ReviewInput::new(7, "y")])
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].topics, vec!["Кредиты"]);
        assert!(results[1].is_empty());
    }
}

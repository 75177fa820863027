//! Classification services

pub mod classifier;
pub mod inference_client;
pub mod ingest;
pub mod lenient_json;
pub mod prompt;
pub mod response_validator;
pub mod retry_policy;

pub use classifier::{AttemptError, Classifier};
pub use inference_client::{ChatMessage, ChatRequest, InferenceBackend, InferenceError, VllmClient};
pub use ingest::{ingest_batch, IngestReport};
pub use prompt::RequestTemplate;
pub use retry_policy::{AttemptOutcome, RetryAction, RetryPolicy, RetryState};

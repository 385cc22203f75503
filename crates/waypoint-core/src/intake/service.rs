//! Recommender collaborator trait.

use super::model::{IntakeAnswers, Recommendation};
use crate::error::FetchError;

/// Maps intake answers to a suggested flow.
///
/// Implementations are expected to be stateless request/response calls.
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Returns the flow best matching the answers.
    ///
    /// Fails with `FetchError::Unreachable` when the service cannot answer.
    async fn recommend(&self, answers: &IntakeAnswers) -> Result<Recommendation, FetchError>;
}

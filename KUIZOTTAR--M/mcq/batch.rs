use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use shared_logging::LogLevel;

use crate::orchestration_entry::{GeneratedQuiz, GenerationRequest, KuizError, QuizRuntime};

/// Runs independent generation requests concurrently on the blocking pool.
#[derive(Debug, Clone)]
pub struct BatchGenerator {
    runtime: Arc<QuizRuntime>,
}

impl BatchGenerator {
    /// Creates a batch generator over a shared runtime.
    #[must_use]
    pub const fn new(runtime: Arc<QuizRuntime>) -> Self {
        Self { runtime }
    }

    /// Generates every request; results keep the input order and fail
    /// independently.
    pub async fn generate_all(
        &self,
        requests: Vec<GenerationRequest>,
    ) -> Vec<Result<GeneratedQuiz, KuizError>> {
        self.log("mcq.batch.start", json!({ "requests": requests.len() }));
        let tasks = requests.into_iter().map(|request| {
            let runtime = Arc::clone(&self.runtime);
            tokio::task::spawn_blocking(move || runtime.generate(&request))
        });
        let results: Vec<Result<GeneratedQuiz, KuizError>> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|err| Err(KuizError::Worker(err.to_string()))))
            .collect();
        let failed = results.iter().filter(|result| result.is_err()).count();
        self.log(
            "mcq.batch.complete",
            json!({ "requests": results.len(), "failed": failed }),
        );
        results
    }

    fn log(&self, message: &str, metadata: serde_json::Value) {
        if let Some(tel) = self.runtime.telemetry() {
            let _ = tel.log(LogLevel::Info, message, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::KuizConfig, source::SourceDocument};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn batch_keeps_order_and_isolates_failures() {
        let runtime = Arc::new(QuizRuntime::initialize(&KuizConfig::default()).unwrap());
        let batch = BatchGenerator::new(runtime);
        let cells = "The mitochondria is the powerhouse of the cell. \
            Cells contain organelles that perform specific functions.";
        let requests = vec![
            GenerationRequest::new(SourceDocument::inline(cells))
                .with_count(1)
                .with_seed(1),
            GenerationRequest::new(SourceDocument::topic("Atlantis", None)),
            GenerationRequest::new(SourceDocument::inline(cells).with_title("Cells"))
                .with_count(2)
                .with_seed(2),
        ];
        let results = batch.generate_all(requests).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().question_set.achieved(), 1);
        assert!(matches!(results[1], Err(KuizError::NoContent)));
        let third = results[2].as_ref().unwrap();
        assert_eq!(third.title, "Cells");
        assert!(third.question_set.achieved() <= 2);
    }
}

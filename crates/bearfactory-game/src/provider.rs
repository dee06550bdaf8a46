/*
[INPUT]:  Player goal, FactoryClient for remote generation
[OUTPUT]: Shuffled task lists for a round, with a static fallback on failure
[POS]:    Collaborator seam - task set provider
[UPDATE]: When adding providers or changing fallback wording
*/

use async_trait::async_trait;
use bearfactory_adapter::{FactoryClient, GeneratedTask, Relevance};
use rand::seq::SliceRandom;
use std::sync::Arc;

use crate::error::GameError;
use crate::task::Task;

/// Source of task sets for a goal.
///
/// Implementations return tasks in play order; the round takes them as-is.
#[async_trait]
pub trait TaskProvider: Send + Sync {
    async fn generate(&self, goal: &str) -> Result<Vec<Task>, GameError>;
}

/// Text generation backed by the remote model.
#[derive(Debug, Clone)]
pub struct RemoteTaskProvider {
    client: Arc<FactoryClient>,
}

impl RemoteTaskProvider {
    pub fn new(client: Arc<FactoryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskProvider for RemoteTaskProvider {
    async fn generate(&self, goal: &str) -> Result<Vec<Task>, GameError> {
        let generated = self
            .client
            .generate_tasks(goal)
            .await
            .map_err(GameError::ProviderUnavailable)?;
        let mut tasks = label_tasks(generated);
        shuffle(&mut tasks);
        Ok(tasks)
    }
}

/// Wraps a provider and substitutes [`fallback_tasks`] when it fails or returns nothing.
#[derive(Debug, Clone)]
pub struct FallbackTaskProvider<P> {
    inner: P,
}

impl<P> FallbackTaskProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<P: TaskProvider> TaskProvider for FallbackTaskProvider<P> {
    async fn generate(&self, goal: &str) -> Result<Vec<Task>, GameError> {
        match self.inner.generate(goal).await {
            Ok(tasks) if !tasks.is_empty() => Ok(tasks),
            Ok(_) => {
                tracing::warn!(goal = %goal, "provider returned no tasks; using fallback list");
                Ok(shuffled_fallback(goal))
            }
            Err(err) => {
                tracing::warn!(goal = %goal, error = %err, "provider failed; using fallback list");
                Ok(shuffled_fallback(goal))
            }
        }
    }
}

/// Fixed task texts, served in order. Used for offline configs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTaskProvider {
    items: Vec<(String, bool)>,
}

impl StaticTaskProvider {
    pub fn new(items: impl IntoIterator<Item = (String, bool)>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

#[async_trait]
impl TaskProvider for StaticTaskProvider {
    async fn generate(&self, _goal: &str) -> Result<Vec<Task>, GameError> {
        let mut relevant = 0;
        let mut irrelevant = 0;
        Ok(self
            .items
            .iter()
            .map(|(text, is_relevant)| {
                let key = next_key(*is_relevant, &mut relevant, &mut irrelevant);
                Task::new(key, text.clone(), *is_relevant)
            })
            .collect())
    }
}

const FALLBACK_RELEVANT: [&str; 5] = [
    "Research {goal} best practices",
    "Create a plan for {goal}",
    "Set milestones for {goal}",
    "Allocate budget for {goal}",
    "Schedule time for {goal}",
];

const FALLBACK_IRRELEVANT: [&str; 5] = [
    "Organize your sock drawer",
    "Learn ancient Latin poetry",
    "Count all the leaves on a tree",
    "Watch clouds for an hour",
    "Memorize the phone book",
];

/// Goal-templated list used when generation is unavailable. Relevant first, unshuffled.
pub fn fallback_tasks(goal: &str) -> Vec<Task> {
    let goal = goal.trim().to_lowercase();
    let relevant = FALLBACK_RELEVANT
        .iter()
        .enumerate()
        .map(|(i, template)| Task::new(format!("r{i}"), template.replace("{goal}", &goal), true));
    let irrelevant = FALLBACK_IRRELEVANT
        .iter()
        .enumerate()
        .map(|(i, text)| Task::new(format!("ir{i}"), *text, false));
    relevant.chain(irrelevant).collect()
}

fn shuffled_fallback(goal: &str) -> Vec<Task> {
    let mut tasks = fallback_tasks(goal);
    shuffle(&mut tasks);
    tasks
}

fn label_tasks(generated: Vec<GeneratedTask>) -> Vec<Task> {
    let mut relevant = 0;
    let mut irrelevant = 0;
    generated
        .into_iter()
        .map(|task| {
            let is_relevant = task.relevance == Relevance::Relevant;
            let key = next_key(is_relevant, &mut relevant, &mut irrelevant);
            Task::new(key, task.text, is_relevant)
        })
        .collect()
}

fn next_key(is_relevant: bool, relevant: &mut usize, irrelevant: &mut usize) -> String {
    if is_relevant {
        *relevant += 1;
        format!("r{}", *relevant - 1)
    } else {
        *irrelevant += 1;
        format!("ir{}", *irrelevant - 1)
    }
}

// thread_rng is not Send, so it never lives across an await.
fn shuffle(tasks: &mut [Task]) {
    tasks.shuffle(&mut rand::thread_rng());
}

#[cfg(test)]
mod tests {
    use super::*;
    use bearfactory_adapter::FactoryError;

    struct FailingProvider;

    #[async_trait]
    impl TaskProvider for FailingProvider {
        async fn generate(&self, _goal: &str) -> Result<Vec<Task>, GameError> {
            Err(GameError::ProviderUnavailable(FactoryError::InvalidResponse(
                "short".to_string(),
            )))
        }
    }

    #[test]
    fn test_fallback_substitutes_lowercase_goal() {
        let tasks = fallback_tasks("Launch A Podcast");
        assert_eq!(tasks.len(), 10);
        assert_eq!(tasks[0].text(), "Research launch a podcast best practices");
        assert_eq!(tasks[4].text(), "Schedule time for launch a podcast");
        assert_eq!(tasks[5].text(), "Organize your sock drawer");
        assert_eq!(tasks.iter().filter(|t| t.is_relevant()).count(), 5);
        assert_eq!(tasks[7].key(), "ir2");
    }

    #[test]
    fn test_label_tasks_numbers_each_label() {
        let generated = vec![
            GeneratedTask { text: "a".to_string(), relevance: Relevance::Irrelevant },
            GeneratedTask { text: "b".to_string(), relevance: Relevance::Relevant },
            GeneratedTask { text: "c".to_string(), relevance: Relevance::Irrelevant },
        ];
        let keys: Vec<String> = label_tasks(generated)
            .iter()
            .map(|t| t.key().to_string())
            .collect();
        assert_eq!(keys, vec!["ir0", "r0", "ir1"]);
    }

    #[tokio::test]
    async fn test_fallback_provider_recovers_from_failure() {
        let provider = FallbackTaskProvider::new(FailingProvider);
        let tasks = provider.generate("Write a novel").await.unwrap();
        assert_eq!(tasks.len(), 10);
        assert!(tasks.iter().any(|t| t.text() == "Create a plan for write a novel"));
    }

    #[tokio::test]
    async fn test_fallback_provider_recovers_from_empty_list() {
        let provider = FallbackTaskProvider::new(StaticTaskProvider::default());
        let tasks = provider.generate("Run a marathon").await.unwrap();
        assert_eq!(tasks.len(), 10);
    }

    #[tokio::test]
    async fn test_fallback_provider_passes_through_success() {
        let provider = FallbackTaskProvider::new(StaticTaskProvider::new([
            ("Stretch".to_string(), true),
            ("Nap".to_string(), false),
        ]));
        let tasks = provider.generate("Run a marathon").await.unwrap();
        let texts: Vec<&str> = tasks.iter().map(Task::text).collect();
        assert_eq!(texts, vec!["Stretch", "Nap"]);
    }
}

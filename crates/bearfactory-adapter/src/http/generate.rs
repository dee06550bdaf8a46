/*
[INPUT]:  Player goal text and Gemini API key
[OUTPUT]: Exactly five relevant and five irrelevant generated tasks
[POS]:    HTTP layer - task text generation endpoint
[UPDATE]: When the prompt wording or generated line format changes
*/

use crate::http::{FactoryClient, FactoryError, Result};
use crate::types::{GenerateContentRequest, GenerateContentResponse, GeneratedTask, Relevance};
use reqwest::Method;

/// Number of tasks requested for each label
pub const TASKS_PER_LABEL: usize = 5;

/// Build the generation prompt for a goal.
pub fn task_prompt(goal: &str) -> String {
    let mut prompt = format!(
        "Given the user goal: \"{goal}\"\n\
         Generate exactly {TASKS_PER_LABEL} highly relevant tasks and exactly {TASKS_PER_LABEL} \
         a mix of irrelevant tasks and some tasks that are related to the same work but distraction.\n\
         Format your response as follows:\n"
    );
    for label in [Relevance::Relevant, Relevance::Irrelevant] {
        for _ in 0..TASKS_PER_LABEL {
            prompt.push_str(label.prefix());
            prompt.push_str(" [task description]\n");
        }
    }
    prompt.push_str("Make sure the tasks are not longer than 7 words each.");
    prompt
}

/// Collect labelled lines from generated text.
///
/// Keeps at most [`TASKS_PER_LABEL`] per label in the order they appear and
/// fails with [`FactoryError::InvalidResponse`] unless both labels are full.
pub fn parse_generated_tasks(text: &str) -> Result<Vec<GeneratedTask>> {
    let mut tasks = Vec::with_capacity(TASKS_PER_LABEL * 2);
    let mut relevant = 0;
    let mut irrelevant = 0;

    for line in text.lines() {
        let Some((relevance, task_text)) = Relevance::split_line(line) else {
            continue;
        };
        let count = match relevance {
            Relevance::Relevant => &mut relevant,
            Relevance::Irrelevant => &mut irrelevant,
        };
        if *count < TASKS_PER_LABEL {
            *count += 1;
            tasks.push(GeneratedTask {
                text: task_text.to_string(),
                relevance,
            });
        }
        if relevant == TASKS_PER_LABEL && irrelevant == TASKS_PER_LABEL {
            break;
        }
    }

    if relevant < TASKS_PER_LABEL || irrelevant < TASKS_PER_LABEL {
        return Err(FactoryError::InvalidResponse(format!(
            "expected {TASKS_PER_LABEL} relevant and {TASKS_PER_LABEL} irrelevant tasks, got {relevant} and {irrelevant}"
        )));
    }

    Ok(tasks)
}

impl FactoryClient {
    /// Call the configured model with a single prompt
    ///
    /// POST /v1beta/models/{model}:generateContent?key={key}
    pub async fn generate_content(&self, prompt: &str) -> Result<GenerateContentResponse> {
        let endpoint = format!("v1beta/models/{}:generateContent", self.model());
        let builder = self
            .generation_request(Method::POST, &endpoint)?
            .json(&GenerateContentRequest::from_prompt(prompt));
        self.send_json(builder).await
    }

    /// Generate the labelled task list for a goal, in response order
    pub async fn generate_tasks(&self, goal: &str) -> Result<Vec<GeneratedTask>> {
        let response = self.generate_content(&task_prompt(goal)).await?;
        let text = response.first_text().ok_or_else(|| {
            FactoryError::InvalidResponse("generation response carried no text".to_string())
        })?;
        let tasks = parse_generated_tasks(text)?;
        tracing::debug!(goal = %goal, count = tasks.len(), "generated tasks");
        Ok(tasks)
    }
}

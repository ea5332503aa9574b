//! Scripted four-agent conversation
//!
//! This is the "native" processing path: a fixed, strictly sequential
//! series of store mutations interleaved with artificial delays. It only
//! looks like agents collaborating; the content comes from the canned
//! templates in [`crate::classify`].
//!
//! The delay provider is injected so tests run the full sequence without
//! wall-clock waits.

use crate::classify::{self, RequestCategory};
use crate::error::AppError;
use crate::state::{
    AgentTask, Message, MessageType, SharedStore, TaskStatus, Trace, UserRequest, COORDINATOR_ID,
    EXECUTOR_ID, PLANNER_ID, RESEARCHER_ID, USER_RECIPIENT,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Pause between an agent finishing and the coordinator handing off
pub const HANDOFF_DELAY: Duration = Duration::from_millis(1000);
/// Simulated research time
pub const RESEARCH_DELAY: Duration = Duration::from_millis(2000);
/// Simulated planning time
pub const PLANNING_DELAY: Duration = Duration::from_millis(2000);
/// Simulated execution time
pub const EXECUTION_DELAY: Duration = Duration::from_millis(3000);
/// Pause before the final response is delivered
pub const DELIVERY_DELAY: Duration = Duration::from_millis(1000);

/// Injectable delay strategy
///
/// The production implementation sleeps on the Tokio timer. A provider may
/// also abort the run by returning an error, which is how tests induce
/// mid-sequence failures.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Pause the conversation for the given duration
    async fn sleep(&self, duration: Duration) -> Result<(), AppError>;
}

/// Wall-clock delays via the Tokio timer, optionally scaled
#[derive(Debug, Clone)]
pub struct TokioDelay {
    scale: f64,
}

impl TokioDelay {
    /// Real-time delays (scale 1.0)
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }

    /// Delays multiplied by `scale`; 0.0 makes every step instant
    pub fn scaled(scale: f64) -> Self {
        Self { scale }
    }
}

impl Default for TokioDelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) -> Result<(), AppError> {
        let scaled = duration.mul_f64(self.scale.max(0.0));
        if !scaled.is_zero() {
            tokio::time::sleep(scaled).await;
        }
        Ok(())
    }
}

/// Delay provider that never waits; used in tests
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) -> Result<(), AppError> {
        Ok(())
    }
}

/// Run the full scripted conversation for one user request
///
/// Emits the fixed trace-label sequence received_request through
/// response_delivered and returns the final solution text. On error the
/// records emitted so far stay in the store; the caller is responsible for
/// marking the request failed.
pub async fn run_conversation(
    store: &SharedStore,
    delay: &dyn Delay,
    request: &UserRequest,
) -> Result<String, AppError> {
    let content = request.content.as_str();
    let category = classify::classify(content);
    info!(request_id = %request.id, ?category, "starting scripted conversation");

    // Step 1: the request arrives at the coordinator
    {
        let mut store = store.write().await;
        store.add_message(Message::new(
            USER_RECIPIENT,
            COORDINATOR_ID,
            content,
            MessageType::Request,
        ));
        store.add_trace(Trace::new(
            COORDINATOR_ID,
            "received_request",
            &format!("Received: {content}"),
        ));
        store.add_trace(Trace::new(
            COORDINATOR_ID,
            "analyzing_request",
            "Analyzing user request",
        ));
    }

    // Step 2: research
    let findings = run_phase(
        store,
        delay,
        &Phase {
            agent_id: RESEARCHER_ID,
            task_description: "Research relevant information",
            assignment: format!("I need you to research information related to: {content}"),
            started_action: "research_started",
            started_details: "Beginning information gathering",
            completed_action: "research_completed",
            completed_details: "Completed information gathering",
            work_delay: RESEARCH_DELAY,
            output: classify::research_findings(category, content),
        },
    )
    .await?;

    // Step 3: planning
    delay.sleep(HANDOFF_DELAY).await?;
    let plan = run_phase(
        store,
        delay,
        &Phase {
            agent_id: PLANNER_ID,
            task_description: "Create execution plan",
            assignment: format!("Based on these research findings, create a plan: {findings}"),
            started_action: "planning_started",
            started_details: "Creating execution plan",
            completed_action: "planning_completed",
            completed_details: "Completed execution plan",
            work_delay: PLANNING_DELAY,
            output: classify::execution_plan(category, content),
        },
    )
    .await?;

    // Step 4: execution
    delay.sleep(HANDOFF_DELAY).await?;
    let solution = run_phase(
        store,
        delay,
        &Phase {
            agent_id: EXECUTOR_ID,
            task_description: "Execute plan and generate solution",
            assignment: format!("Please execute this plan: {plan}"),
            started_action: "execution_started",
            started_details: "Implementing solution",
            completed_action: "execution_completed",
            completed_details: "Completed implementation",
            work_delay: EXECUTION_DELAY,
            output: classify::solution(category, content),
        },
    )
    .await?;

    // Step 5: review and delivery
    delay.sleep(HANDOFF_DELAY).await?;
    {
        let mut store = store.write().await;
        store.add_trace(Trace::new(
            COORDINATOR_ID,
            "reviewing_solution",
            "Reviewing proposed solution",
        ));
        store.add_trace(Trace::new(
            COORDINATOR_ID,
            "solution_approved",
            "Approved final solution",
        ));
        store.add_message(Message::new(
            COORDINATOR_ID,
            EXECUTOR_ID,
            "Solution approved. Deliver the response to the user.",
            MessageType::Internal,
        ));
    }
    delay.sleep(DELIVERY_DELAY).await?;
    {
        let mut store = store.write().await;
        store.add_message(Message::new(
            EXECUTOR_ID,
            USER_RECIPIENT,
            &solution,
            MessageType::Response,
        ));
        store.add_trace(Trace::new(
            COORDINATOR_ID,
            "response_delivered",
            "Delivered final response to user",
        ));
    }

    info!(request_id = %request.id, "conversation finished");
    Ok(solution)
}

// One assign / work / report phase of the conversation.
struct Phase {
    agent_id: &'static str,
    task_description: &'static str,
    assignment: String,
    started_action: &'static str,
    started_details: &'static str,
    completed_action: &'static str,
    completed_details: &'static str,
    work_delay: Duration,
    output: String,
}

async fn run_phase(
    store: &SharedStore,
    delay: &dyn Delay,
    phase: &Phase,
) -> Result<String, AppError> {
    let task = {
        let mut store = store.write().await;
        let task = store.add_task(AgentTask::new(phase.agent_id, phase.task_description));
        store.add_message(Message::new(
            COORDINATOR_ID,
            phase.agent_id,
            &phase.assignment,
            MessageType::Internal,
        ));
        store.add_trace(Trace::new(
            phase.agent_id,
            phase.started_action,
            phase.started_details,
        ));
        store.update_task(&task.id, TaskStatus::InProgress, None);
        task
    };

    delay.sleep(phase.work_delay).await?;

    {
        let mut store = store.write().await;
        store.update_task(&task.id, TaskStatus::Completed, Some(phase.output.clone()));
        store.add_trace(Trace::new(
            phase.agent_id,
            phase.completed_action,
            phase.completed_details,
        ));
        store.add_message(Message::new(
            phase.agent_id,
            COORDINATOR_ID,
            &phase.output,
            MessageType::Internal,
        ));
    }

    Ok(phase.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::shared_store;

    #[tokio::test]
    async fn test_trace_labels_in_order() {
        let store = shared_store();
        let request = UserRequest::new("tell me about sourdough");
        run_conversation(&store, &NoDelay, &request).await.unwrap();

        let actions: Vec<String> = store
            .read()
            .await
            .traces()
            .iter()
            .map(|t| t.action.clone())
            .collect();
        assert_eq!(
            actions,
            vec![
                "received_request",
                "analyzing_request",
                "research_started",
                "research_completed",
                "planning_started",
                "planning_completed",
                "execution_started",
                "execution_completed",
                "reviewing_solution",
                "solution_approved",
                "response_delivered",
            ]
        );
    }

    #[tokio::test]
    async fn test_final_message_is_response_to_user() {
        let store = shared_store();
        let request = UserRequest::new("anything at all");
        let solution = run_conversation(&store, &NoDelay, &request).await.unwrap();

        let messages = store.read().await.messages();
        let last = messages.last().unwrap();
        assert_eq!(last.to, USER_RECIPIENT);
        assert_eq!(last.message_type, MessageType::Response);
        assert_eq!(last.content, solution);
    }

    #[tokio::test]
    async fn test_every_task_reaches_completed() {
        let store = shared_store();
        let request = UserRequest::new("plan a road trip");
        run_conversation(&store, &NoDelay, &request).await.unwrap();

        let tasks = store.read().await.tasks();
        assert_eq!(tasks.len(), 3);
        for task in &tasks {
            assert_eq!(task.status, TaskStatus::Completed);
            assert!(task.completed_at.is_some());
            assert!(task.result.is_some());
        }
        let assignees: Vec<&str> = tasks.iter().map(|t| t.assigned_to.as_str()).collect();
        assert_eq!(assignees, vec![RESEARCHER_ID, PLANNER_ID, EXECUTOR_ID]);
    }
}

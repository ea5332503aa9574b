//! Static agent roster
//!
//! The four role-labeled agents are fixed for the lifetime of the process.

use crate::state::models::{Agent, AgentRole};

/// Well-known id of the coordinator agent
pub const COORDINATOR_ID: &str = "coordinator-1";
/// Well-known id of the researcher agent
pub const RESEARCHER_ID: &str = "researcher-1";
/// Well-known id of the planner agent
pub const PLANNER_ID: &str = "planner-1";
/// Well-known id of the executor agent
pub const EXECUTOR_ID: &str = "executor-1";

/// Build the fixed four-agent roster
pub fn default_agents() -> Vec<Agent> {
    vec![
        Agent::new(
            COORDINATOR_ID,
            "Coordinator",
            AgentRole::Coordinator,
            &["task delegation", "review", "communication"],
        ),
        Agent::new(
            RESEARCHER_ID,
            "Researcher",
            AgentRole::Researcher,
            &["information gathering", "analysis", "summarization"],
        ),
        Agent::new(
            PLANNER_ID,
            "Planner",
            AgentRole::Planner,
            &["strategy", "decomposition", "scheduling"],
        ),
        Agent::new(
            EXECUTOR_ID,
            "Executor",
            AgentRole::Executor,
            &["implementation", "synthesis", "delivery"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_has_one_agent_per_role() {
        let agents = default_agents();
        assert_eq!(agents.len(), 4);
        for role in [
            AgentRole::Coordinator,
            AgentRole::Researcher,
            AgentRole::Planner,
            AgentRole::Executor,
        ] {
            assert_eq!(agents.iter().filter(|a| a.role == role).count(), 1);
        }
    }

    #[test]
    fn test_roster_ids_are_stable() {
        let agents = default_agents();
        assert_eq!(agents[0].id, COORDINATOR_ID);
        assert_eq!(agents[1].id, RESEARCHER_ID);
        assert_eq!(agents[2].id, PLANNER_ID);
        assert_eq!(agents[3].id, EXECUTOR_ID);
    }
}

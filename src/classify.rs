//! Request classification and canned content templates
//!
//! The simulated conversation picks its text payloads by classifying the
//! user request into a closed set of categories. Classification is plain
//! case-insensitive substring matching; there is no analysis behind it.

use serde::{Deserialize, Serialize};

/// Content category of a user request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestCategory {
    /// Learning Android development
    AndroidDev,
    /// Recovering from a layoff
    CareerTransition,
    /// Finding a new job
    JobSearch,
    /// Anything else
    General,
}

/// Classify a request by substring tests, first match wins
///
/// Order matters: "laid off and need a job" is a career transition, not a
/// plain job search.
pub fn classify(content: &str) -> RequestCategory {
    let lowered = content.to_lowercase();
    if lowered.contains("android") {
        RequestCategory::AndroidDev
    } else if lowered.contains("laid off") {
        RequestCategory::CareerTransition
    } else if lowered.contains("job") {
        RequestCategory::JobSearch
    } else {
        RequestCategory::General
    }
}

/// Research findings template for a category
pub fn research_findings(category: RequestCategory, content: &str) -> String {
    match category {
        RequestCategory::AndroidDev => format!(
            "Research findings for '{content}':\n\
             - Kotlin is the recommended language for new Android projects\n\
             - Jetpack Compose has replaced XML layouts as the default UI toolkit\n\
             - Google's official codelabs cover fundamentals through app architecture\n\
             - A realistic fundamentals timeline for a newcomer is 4-6 weeks of daily practice"
        ),
        RequestCategory::CareerTransition => format!(
            "Research findings for '{content}':\n\
             - Most candidates land a comparable role within 3-5 months of a layoff\n\
             - Referrals convert to interviews at several times the rate of cold applications\n\
             - Severance and unemployment filings have strict deadlines worth checking first\n\
             - Targeted upskilling outperforms broad certificate collecting"
        ),
        RequestCategory::JobSearch => format!(
            "Research findings for '{content}':\n\
             - Tailored resumes and cover letters materially raise response rates\n\
             - 70-80% of openings are filled through networking before being posted\n\
             - Tracking applications in one place prevents duplicate or stale follow-ups\n\
             - Interview practice with a peer doubles offer rates in published surveys"
        ),
        RequestCategory::General => format!(
            "Research findings for '{content}':\n\
             - Found key insight 1\n\
             - Discovered relevant data point 2\n\
             - Identified related concept 3"
        ),
    }
}

/// Execution plan template for a category
pub fn execution_plan(category: RequestCategory, content: &str) -> String {
    match category {
        RequestCategory::AndroidDev => format!(
            "Plan for '{content}':\n\
             1. Week 1: install Android Studio, finish the Kotlin basics track\n\
             2. Weeks 2-3: build two small Compose apps following the official codelabs\n\
             3. Week 4: add persistence and networking to one app, publish it to GitHub\n\
             4. Ongoing: one hour of daily practice plus a weekly review of progress"
        ),
        RequestCategory::CareerTransition => format!(
            "Plan for '{content}':\n\
             1. Handle logistics first: severance paperwork, unemployment filing, budget review\n\
             2. Refresh resume and online profiles around the strongest recent work\n\
             3. Reach out to former colleagues before applying cold\n\
             4. Set a sustainable weekly cadence of applications, practice, and rest"
        ),
        RequestCategory::JobSearch => format!(
            "Plan for '{content}':\n\
             1. Define the target role and a shortlist of companies\n\
             2. Tailor one resume variant per role family\n\
             3. Apply in small weekly batches and log every contact\n\
             4. Schedule mock interviews once responses begin arriving"
        ),
        RequestCategory::General => format!(
            "Plan for '{content}':\n\
             1. First step of implementation\n\
             2. Second step with details\n\
             3. Final integration approach"
        ),
    }
}

/// Final solution template for a category
pub fn solution(category: RequestCategory, content: &str) -> String {
    match category {
        RequestCategory::AndroidDev => format!(
            "Final solution for '{content}':\n\n\
             Here is a structured path into Android development:\n\n\
             1. Foundation: Kotlin basics and Android Studio setup (week 1)\n\
             2. Core skills: two small Jetpack Compose apps built from the official codelabs (weeks 2-3)\n\
             3. Depth: persistence, networking, and app architecture applied to one of those apps (week 4)\n\
             4. Habit: daily practice with a weekly retrospective to keep momentum\n\n\
             Following this sequence takes you from zero to a publishable portfolio app."
        ),
        RequestCategory::CareerTransition => format!(
            "Final solution for '{content}':\n\n\
             A layoff recovery plan in three phases:\n\n\
             1. Stabilize: complete severance and unemployment logistics, set a budget\n\
             2. Position: rebuild your resume and profiles around recent, concrete wins\n\
             3. Re-enter: lean on warm referrals first, then targeted applications at a steady weekly pace\n\n\
             Treating the search as a structured project keeps it finite and manageable."
        ),
        RequestCategory::JobSearch => format!(
            "Final solution for '{content}':\n\n\
             A focused job-search playbook:\n\n\
             1. Target: a named role family and a shortlist of companies\n\
             2. Materials: one tailored resume variant per role family\n\
             3. Pipeline: small weekly application batches, every contact logged\n\
             4. Practice: mock interviews as soon as responses arrive\n\n\
             Consistency across these four tracks is what converts effort into offers."
        ),
        RequestCategory::General => format!(
            "Final solution for '{content}':\n\n\
             Based on our analysis, here is the complete solution:\n\n\
             1. Key insight: [Details from research]\n\
             2. Recommended approach: [Strategy from plan]\n\
             3. Implementation steps: [Specific actions]\n\n\
             This solution addresses all aspects of your request."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(
            classify("I want to learn Android development"),
            RequestCategory::AndroidDev
        );
        assert_eq!(
            classify("I was laid off last month"),
            RequestCategory::CareerTransition
        );
        assert_eq!(classify("help me find a new JOB"), RequestCategory::JobSearch);
        assert_eq!(classify("plan my garden"), RequestCategory::General);
    }

    #[test]
    fn test_classify_precedence() {
        // Android beats job, laid off beats job
        assert_eq!(
            classify("job options in android development"),
            RequestCategory::AndroidDev
        );
        assert_eq!(
            classify("laid off, need a job"),
            RequestCategory::CareerTransition
        );
    }

    #[test]
    fn test_templates_embed_request_text() {
        let category = classify("plan my garden");
        for text in [
            research_findings(category, "plan my garden"),
            execution_plan(category, "plan my garden"),
            solution(category, "plan my garden"),
        ] {
            assert!(text.contains("plan my garden"));
        }
    }
}

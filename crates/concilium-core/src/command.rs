//! Agent invocation descriptors.
//!
//! A [`CommandSpec`] is everything needed to start an agent: program,
//! ordered arguments and environment overrides. Agent-specific builders live
//! in their agent modules:
//! - [`crate::agents::claude::ClaudePlanConfig`]

use std::collections::BTreeMap;

/// An immutable description of an agent command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run (a name looked up on PATH, or an absolute path)
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Environment variables set on top of the ambient environment
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    /// Create a spec with no environment overrides.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: BTreeMap::new(),
        }
    }

    /// Add an environment override.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The full environment for this command, given an ambient snapshot.
    pub fn merged_env<I, K, V>(&self, ambient: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        merged_env(ambient, &self.env)
    }
}

/// Apply `overrides` on top of an ambient environment snapshot.
///
/// On key collision the override wins.
pub fn merged_env<I, K, V>(ambient: I, overrides: &BTreeMap<String, String>) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut env: BTreeMap<String, String> = ambient
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    env.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}

/// UTF-8 snapshot of the current process environment, for previewing what a
/// command will see with [`CommandSpec::merged_env`].
///
/// Variables that are not valid UTF-8 are skipped, so this is lossy.
/// [`AgentProcess`](crate::spawn::AgentProcess) inherits the real environment
/// instead of spawning from this snapshot.
pub fn ambient_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

const RESEARCH_INSTRUCTIONS: &str = "\
You are one member of a research council. Your only job is to PROPOSE a plan. \
Someone else will decide whether and how to carry it out.

## RULES

1. Do NOT create, edit, move or delete any file. Not even a small fix.
2. Do NOT run commands, execute code or change any state (no installs, no commits, no builds).
3. Do NOT implement the solution. Code in your answer is illustration for the plan, never something to save to disk.
4. You MAY use read-only tools (reading files, grep, glob, web search) to research the codebase.

## WHAT TO RETURN

Return a detailed implementation plan written in markdown, directly in your response. Cover:

- The current state of the relevant code, with file paths
- A step-by-step strategy, with file paths and line references
- Proposed changes as clearly labeled snippets
- Risks, edge cases and trade-offs
- How the change should be tested

Your response is the deliverable. Write nothing to disk.

## USER REQUEST

";

/// Wrap a user prompt in read-only research instructions.
///
/// The prompt is appended unchanged as the final section.
pub fn wrap_prompt_for_research(prompt: &str) -> String {
    format!("{RESEARCH_INSTRUCTIONS}{prompt}")
}

//! Claude plan-mode command configuration.

use crate::command::{wrap_prompt_for_research, CommandSpec};

/// Flags for a read-only, streaming, single-shot planning run.
///
/// Order matters to callers that compare command lines, so it is fixed here.
pub const PLAN_MODE_FLAGS: &[&str] = &[
    "--verbose",
    "--print",
    "--output-format",
    "stream-json",
    "--permission-mode",
    "plan",
    "--include-partial-messages",
    "--no-session-persistence",
    "--disallowedTools",
    "Write",
    "Edit",
    "NotebookEdit",
];

/// Configuration options for a Claude planning run.
#[derive(Debug, Clone, Default)]
pub struct ClaudePlanConfig {
    /// Claude binary; `claude` on PATH when unset or blank
    pub binary_path: Option<String>,
    pub prompt: String,
    pub model: Option<String>,
}

impl ClaudePlanConfig {
    /// Build the CommandSpec for the Claude CLI.
    ///
    /// Flags come first, then `--model` if one was given, and the wrapped
    /// prompt is always the last argument.
    pub fn build(self) -> CommandSpec {
        let program = self
            .binary_path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "claude".to_string());

        let mut args: Vec<String> = PLAN_MODE_FLAGS.iter().map(|f| f.to_string()).collect();

        if let Some(ref model) = self.model {
            let model = model.trim();
            if !model.is_empty() {
                args.push("--model".to_string());
                args.push(model.to_string());
            }
        }

        args.push(wrap_prompt_for_research(&self.prompt));

        CommandSpec::new(program, args)
    }
}

/// Build the read-only planning command for `prompt`.
pub fn build_claude_command(prompt: &str, model: Option<&str>) -> CommandSpec {
    ClaudePlanConfig {
        binary_path: None,
        prompt: prompt.to_string(),
        model: model.map(str::to_string),
    }
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_flags_in_order() {
        let spec = build_claude_command("Explain the parser", None);

        assert_eq!(spec.program, "claude");
        assert_eq!(spec.args.len(), PLAN_MODE_FLAGS.len() + 1);
        assert_eq!(&spec.args[..PLAN_MODE_FLAGS.len()], PLAN_MODE_FLAGS);
        assert_eq!(
            spec.args.last().unwrap(),
            &wrap_prompt_for_research("Explain the parser")
        );
        assert!(spec.env.is_empty());
    }

    #[test]
    fn model_goes_before_prompt() {
        let spec = build_claude_command("Plan it", Some("  opus  "));
        let n = PLAN_MODE_FLAGS.len();

        assert_eq!(spec.args.len(), n + 3);
        assert_eq!(spec.args[n], "--model");
        assert_eq!(spec.args[n + 1], "opus");
        assert_eq!(spec.args[n + 2], wrap_prompt_for_research("Plan it"));
    }

    #[test]
    fn blank_model_is_ignored() {
        let spec = build_claude_command("Plan it", Some("   "));
        assert!(!spec.args.contains(&"--model".to_string()));
        assert_eq!(spec.args.len(), PLAN_MODE_FLAGS.len() + 1);
    }

    #[test]
    fn mutating_tools_are_disallowed() {
        let spec = build_claude_command("x", None);
        let idx = spec
            .args
            .iter()
            .position(|a| a == "--disallowedTools")
            .unwrap();
        assert_eq!(&spec.args[idx + 1..idx + 4], ["Write", "Edit", "NotebookEdit"]);
    }

    #[test]
    fn custom_binary_path() {
        let spec = ClaudePlanConfig {
            binary_path: Some("/opt/claude/bin/claude".to_string()),
            prompt: "x".to_string(),
            model: None,
        }
        .build();
        assert_eq!(spec.program, "/opt/claude/bin/claude");
    }

    #[test]
    fn blank_binary_path_falls_back() {
        let spec = ClaudePlanConfig {
            binary_path: Some(" ".to_string()),
            ..Default::default()
        }
        .build();
        assert_eq!(spec.program, "claude");
    }
}

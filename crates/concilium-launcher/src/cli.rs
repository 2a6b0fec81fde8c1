use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use concilium_core::{
    AgentExit, AgentKind, AgentProcess, ClaudePlanConfig, ParsedEvent, ProcessEvent,
    StreamNormalizer,
};

use crate::error::Result;
use crate::launch::{self, LaunchPaths};

#[derive(Parser, Debug)]
#[command(name = "concilium")]
#[command(about = "Multi-LLM deliberation platform", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub launch: LaunchArgs,
}

/// Options for launching the desktop app.
#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Project directory (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Force development mode even when a packaged binary exists
    #[arg(long)]
    pub dev: bool,

    /// Desktop app root (defaults to the directory of this executable)
    #[arg(long, env = "CONCILIUM_DESKTOP_ROOT")]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize agent output read from stdin into JSON lines
    Normalize {
        /// Agent that produced the output (claude, opencode, codex, ...)
        #[arg(long)]
        agent: AgentKind,
    },

    /// Run a read-only Claude planning session and stream its events
    Plan {
        /// What to plan
        prompt: String,

        /// Model to request
        #[arg(long)]
        model: Option<String>,

        /// Claude binary (defaults to `claude` on PATH)
        #[arg(long)]
        binary: Option<PathBuf>,

        /// Directory to run the agent in
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
}

/// Run the parsed command line and return the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Some(Commands::Normalize { agent }) => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            normalize(agent, stdin.lock(), stdout.lock())?;
            Ok(0)
        }
        Some(Commands::Plan {
            prompt,
            model,
            binary,
            cwd,
        }) => plan(prompt, model, binary, cwd.as_deref()),
        None => {
            let cwd = std::env::current_dir()?;
            let project_dir = launch::resolve_project_dir(cli.launch.path.as_deref(), &cwd)?;
            let root = match cli.launch.root {
                Some(root) => root,
                None => launch::default_root()?,
            };
            launch::launch(&LaunchPaths::resolve(&root), &project_dir, cli.launch.dev)
        }
    }
}

/// Stream `input` through a normalizer and write one JSON event per line.
pub fn normalize(kind: AgentKind, mut input: impl BufRead, mut output: impl Write) -> Result<()> {
    let mut normalizer = StreamNormalizer::new(kind);
    let mut chunk = Vec::new();

    loop {
        chunk.clear();
        if input.read_until(b'\n', &mut chunk)? == 0 {
            break;
        }
        let events = normalizer.feed(&String::from_utf8_lossy(&chunk));
        write_events(&mut output, &events)?;
    }

    write_events(&mut output, &normalizer.flush())?;
    output.flush()?;
    Ok(())
}

fn plan(
    prompt: String,
    model: Option<String>,
    binary: Option<PathBuf>,
    cwd: Option<&Path>,
) -> Result<i32> {
    let spec = ClaudePlanConfig {
        binary_path: binary.map(|p| p.to_string_lossy().into_owned()),
        prompt,
        model,
    }
    .build();

    let process = AgentProcess::spawn(AgentKind::Claude, &spec, cwd)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut exit_code = 0;

    while let Some(event) = process.recv() {
        match event {
            ProcessEvent::Events(events) => {
                write_events(&mut out, &events)?;
                out.flush()?;
            }
            ProcessEvent::Stderr(line) => eprintln!("{line}"),
            ProcessEvent::Exit(exit) => exit_code = exit_code_for(&exit),
        }
    }

    Ok(exit_code)
}

/// Shell convention: a signalled child exits with 128 + signal.
fn exit_code_for(exit: &AgentExit) -> i32 {
    match exit.signal {
        Some(signal) => 128 + signal,
        None => exit.code,
    }
}

fn write_events(out: &mut impl Write, events: &[ParsedEvent]) -> Result<()> {
    for event in events {
        serde_json::to_writer(&mut *out, event)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn normalize_to_values(kind: AgentKind, input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        normalize(kind, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    mod parsing {
        use super::*;

        #[test]
        fn bare_invocation_launches() {
            let cli = Cli::try_parse_from(["concilium"]).unwrap();
            assert!(cli.command.is_none());
            assert!(cli.launch.path.is_none());
            assert!(!cli.launch.dev);
        }

        #[test]
        fn path_and_dev_flag() {
            let cli = Cli::try_parse_from(["concilium", "../project", "--dev"]).unwrap();
            assert_eq!(cli.launch.path, Some(PathBuf::from("../project")));
            assert!(cli.launch.dev);
        }

        #[test]
        fn normalize_subcommand() {
            let cli = Cli::try_parse_from(["concilium", "normalize", "--agent", "OpenCode"]).unwrap();
            match cli.command {
                Some(Commands::Normalize { agent }) => assert_eq!(agent, AgentKind::OpenCode),
                other => panic!("unexpected command: {other:?}"),
            }
        }

        #[test]
        fn unknown_agent_is_accepted() {
            let cli = Cli::try_parse_from(["concilium", "normalize", "--agent", "gemini"]).unwrap();
            assert!(matches!(
                cli.command,
                Some(Commands::Normalize { agent: AgentKind::Other(_) })
            ));
        }

        #[test]
        fn plan_subcommand() {
            let cli = Cli::try_parse_from([
                "concilium", "plan", "Add caching", "--model", "opus", "--cwd", "/tmp",
            ])
            .unwrap();
            match cli.command {
                Some(Commands::Plan {
                    prompt, model, cwd, binary,
                }) => {
                    assert_eq!(prompt, "Add caching");
                    assert_eq!(model.as_deref(), Some("opus"));
                    assert_eq!(cwd, Some(PathBuf::from("/tmp")));
                    assert!(binary.is_none());
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }

        #[test]
        fn launch_args_conflict_with_subcommands() {
            assert!(Cli::try_parse_from(["concilium", "--dev", "normalize", "--agent", "codex"]).is_err());
        }
    }

    mod normalize_output {
        use super::*;

        #[test]
        fn writes_one_json_line_per_event() {
            let input = concat!(
                r#"{"type":"step_start","part":{}}"#,
                "\n",
                r#"{"type":"text","part":{"text":"hello"}}"#,
                "\n",
            );
            let values = normalize_to_values(AgentKind::OpenCode, input);

            assert_eq!(
                values,
                vec![
                    json!({"eventType": "status", "text": "Step started"}),
                    json!({"eventType": "text", "text": "hello"}),
                ]
            );
        }

        #[test]
        fn trailing_line_without_newline_is_flushed() {
            let values = normalize_to_values(AgentKind::Codex, "one\ntwo");
            assert_eq!(values.len(), 2);
            assert_eq!(values[1]["text"], "two");
        }

        #[test]
        fn cumulative_usage_is_serialized() {
            let input = r#"{"type":"result","subtype":"success","result":"done","usage":{"input_tokens":5,"output_tokens":2}}"#;
            let values = normalize_to_values(AgentKind::Claude, input);

            assert_eq!(
                values,
                vec![json!({
                    "eventType": "text",
                    "text": "done",
                    "tokenUsage": {"inputTokens": 5, "outputTokens": 2, "totalCost": null},
                    "tokenUsageCumulative": true
                })]
            );
        }

        #[test]
        fn empty_input_writes_nothing() {
            assert!(normalize_to_values(AgentKind::Claude, "\n\n").is_empty());
        }
    }

    #[test]
    fn signalled_exit_maps_to_shell_code() {
        assert_eq!(exit_code_for(&AgentExit { code: 0, signal: Some(2) }), 130);
        assert_eq!(exit_code_for(&AgentExit { code: 4, signal: None }), 4);
    }
}

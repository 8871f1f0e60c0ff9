//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::AlgebraService;
use crate::cli::args::{Cli, Commands, ConfigCommands, Order, PairArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, PolicyKind, Settings};
use crate::domain::{ChildPolicy, NodeRef, SearchKind, Tree, UniqueChildren, Unrestricted};
use crate::exitcode;
use crate::infrastructure::ServiceContainer;

/// Instantiates a policy-generic command for the configured policy.
macro_rules! with_policy {
    ($policy:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $policy {
            PolicyKind::Unrestricted => $func::<Unrestricted>($($arg),*),
            PolicyKind::Unique => $func::<UniqueChildren>($($arg),*),
        }
    };
}

#[derive(Debug, Clone, Copy)]
enum SetOp {
    Union,
    Intersection,
    Difference,
}

impl SetOp {
    fn empty_message(self) -> &'static str {
        match self {
            SetOp::Union => "roots do not match, no union",
            SetOp::Intersection => "roots do not match, no intersection",
            SetOp::Difference => "difference removed the whole tree",
        }
    }
}

/// Runs the parsed command and returns the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see 'settree --help'".to_string(),
        ));
    };
    if let Commands::Completion { shell } = command {
        return _completion(*shell);
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.unique {
        settings.policy = PolicyKind::Unique;
    }
    if !settings.color {
        output::disable_colors();
    }
    debug!("settings: {:?}", settings);

    let container = ServiceContainer::new(settings);
    let algebra = &container.algebra;
    let policy = container.settings.policy;

    match command {
        Commands::Show { file, order } => with_policy!(policy, _show(algebra, file, *order)),
        Commands::Union(pair) => with_policy!(policy, _set_op(algebra, pair, SetOp::Union)),
        Commands::Intersect(pair) => {
            with_policy!(policy, _set_op(algebra, pair, SetOp::Intersection))
        }
        Commands::Diff(pair) => with_policy!(policy, _set_op(algebra, pair, SetOp::Difference)),
        Commands::Similarity { left, right } => {
            with_policy!(policy, _similarity(algebra, left, right))
        }
        Commands::Config { command } => _config(&container.settings, cli.config.as_deref(), command),
        Commands::Completion { shell } => _completion(*shell),
    }
}

#[instrument(skip(algebra), fields(policy = P::NAME))]
fn _show<P: ChildPolicy>(algebra: &AlgebraService, file: &Path, order: Order) -> CliResult<i32> {
    let tree = algebra.load::<P>(file)?;
    let root = tree.root();
    let nodes: Vec<NodeRef<'_, String, P>> = match order {
        Order::Tree => {
            output::info(&tree);
            return Ok(exitcode::OK);
        }
        Order::Bfs => root.search(SearchKind::BreadthFirst).collect(),
        Order::Dfs => root.search(SearchKind::DepthFirst).collect(),
        Order::Post => root.post_order().collect(),
    };
    for node in nodes {
        output::info(node.value());
    }
    Ok(exitcode::OK)
}

#[instrument(skip(algebra), fields(policy = P::NAME))]
fn _set_op<P: ChildPolicy>(algebra: &AlgebraService, pair: &PairArgs, op: SetOp) -> CliResult<i32> {
    let result = match op {
        SetOp::Union => algebra.union::<P>(&pair.left, &pair.right)?,
        SetOp::Intersection => algebra.intersection::<P>(&pair.left, &pair.right)?,
        SetOp::Difference => algebra.difference::<P>(&pair.left, &pair.right)?,
    };
    emit(algebra, result, pair.output.as_deref(), op.empty_message())
}

/// Prints or saves an operation's result; an absent tree exits with `NO_RESULT`.
fn emit<P>(
    algebra: &AlgebraService,
    result: Option<Tree<String, P>>,
    output_path: Option<&Path>,
    empty_message: &str,
) -> CliResult<i32> {
    let Some(tree) = result else {
        output::warning(empty_message);
        return Ok(exitcode::NO_RESULT);
    };
    match output_path {
        Some(path) => {
            algebra.save(&tree, path)?;
            output::action("Written", &path.display());
        }
        None => output::info(&tree),
    }
    Ok(exitcode::OK)
}

#[instrument(skip(algebra), fields(policy = P::NAME))]
fn _similarity<P: ChildPolicy>(algebra: &AlgebraService, left: &Path, right: &Path) -> CliResult<i32> {
    let score = algebra.similarity::<P>(left, right)?;
    output::info(&score);
    Ok(exitcode::OK)
}

fn _config(settings: &Settings, local: Option<&Path>, command: &ConfigCommands) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            output::header("# effective configuration");
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let local = match local {
                Some(path) => path.to_path_buf(),
                None => std::env::current_dir()
                    .map(|dir| local_config_path(&dir))
                    .map_err(|e| CliError::InvalidArgs(format!("current directory: {e}")))?,
            };
            let candidates = global_config_path().into_iter().chain(std::iter::once(local));
            for path in candidates {
                if path.exists() {
                    output::success_detail(&path.display());
                } else {
                    output::failure(&path.display());
                }
            }
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(exitcode::OK)
}

fn _completion(shell: Shell) -> CliResult<i32> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(exitcode::OK)
}

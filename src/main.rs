use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use log::{debug, LevelFilter};

use fastcommit::cli::{
    self, config_cmd, env_cmd, history_cmd, upgrade, version_cmd, CommitArgs, RunContext, TagArgs,
};
use fastcommit::config::{self, ENV_CONFIG, ENV_DEBUG};
use fastcommit::git::{Git2Repository, Repository};
use fastcommit::github::ReleaseClient;
use fastcommit::llm::OpenAiClient;
use fastcommit::ui::{self, TerminalPrompter};

/// Releases fetched for the upgrade command
const RELEASES_PER_PAGE: usize = 30;

#[derive(Parser)]
#[command(
    name = "fastcommit",
    version,
    about = "Draft commit messages with an LLM, commit, push and cut version tags"
)]
struct Cli {
    #[arg(short, long, global = true, env = ENV_CONFIG, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = ENV_DEBUG,
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        help = "Enable debug logging"
    )]
    debug: bool,

    #[command(flatten)]
    commit: CommitFlags,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Clone, Default)]
struct CommitFlags {
    #[arg(long, help = "Commit a timestamped quick update without the model")]
    fast: bool,

    #[arg(long = "prompt", help = "Print the prompt sent to the model")]
    show_prompt: bool,

    #[arg(long, help = "Commit without pushing")]
    no_push: bool,

    #[arg(short, long, help = "Stage untracked files too")]
    all: bool,
}

impl CommitFlags {
    fn any(&self) -> bool {
        self.fast || self.show_prompt || self.no_push || self.all
    }

    fn merge(self, other: CommitFlags) -> CommitFlags {
        CommitFlags {
            fast: self.fast || other.fast,
            show_prompt: self.show_prompt || other.show_prompt,
            no_push: self.no_push || other.no_push,
            all: self.all || other.all,
        }
    }
}

impl From<CommitFlags> for CommitArgs {
    fn from(flags: CommitFlags) -> Self {
        CommitArgs {
            fast: flags.fast,
            show_prompt: flags.show_prompt,
            no_push: flags.no_push,
            all: flags.all,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Generate a commit message, commit and push (default)
    Commit(CommitFlags),

    /// Create the next version tag and push it
    Tag {
        #[arg(long, help = "Channel to tag on (alpha, beta, rc, release, ...)")]
        channel: Option<String>,

        #[arg(short, long, help = "Accept the proposed tag without editing")]
        yes: bool,

        #[arg(long, help = "Preview the tag without creating it")]
        dry_run: bool,
    },

    /// Browse published releases
    Upgrade {
        #[command(subcommand)]
        action: Option<UpgradeAction>,
    },

    /// Show the configuration file
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },

    /// List supported environment variables
    Env,

    /// Search the shell history
    History {
        /// Fuzzy filter; without one an interactive selector opens
        query: Vec<String>,
    },

    /// Print version information
    Version,
}

#[derive(Subcommand)]
enum UpgradeAction {
    /// Table of all release assets
    List,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Open the configuration file in an editor
    Edit {
        /// Editor command, e.g. `vim` or `code -w`
        editor: Option<String>,
    },
}

fn main() {
    // the local env file may set FASTCOMMIT_DEBUG and FASTCOMMIT_CONFIG,
    // so it is loaded before arguments are read
    let repo = Git2Repository::open(".");
    let local_env = match &repo {
        Ok(repo) => repo.root().and_then(|root| config::load_local_env(&root)),
        Err(_) => Ok(None),
    };

    let cli = Cli::parse();
    init_logger(cli.debug);

    let result = local_env.map_err(anyhow::Error::from).and_then(|loaded| {
        if let Some(path) = loaded {
            debug!("local env: {}", path.display());
        }
        run(cli, repo)
    });

    if let Err(e) = result {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// `info` by default, `debug` with `--debug`; `RUST_LOG` overrides both.
fn init_logger(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(LevelFilter::Warn);
    builder.filter_module("fastcommit", level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn run(args: Cli, repo: fastcommit::Result<Git2Repository>) -> Result<()> {
    if let Err(e) = &repo {
        debug!("no repository: {}", e);
    }

    let mut repo_info = None;
    if let Ok(repo) = &repo {
        repo_info = Some((repo.root()?, repo.current_branch()?));
    }

    let config_path = config::resolve_config_path(args.config.as_deref())?;
    let mut config = config::load_or_init(&config_path)?;
    config.apply_env();

    let mut ctx = RunContext::new(config, config_path);
    if let Some((root, branch)) = repo_info {
        ctx = ctx.with_repo(root, branch);
    }

    let command = match args.command {
        None => Command::Commit(args.commit),
        Some(Command::Commit(flags)) => Command::Commit(args.commit.merge(flags)),
        Some(_) if args.commit.any() => {
            bail!("--fast, --prompt, --no-push and --all only apply to the commit command")
        }
        Some(command) => command,
    };
    let mut prompter = TerminalPrompter::new();

    match command {
        Command::Commit(flags) => {
            if !std::io::stdin().is_terminal() {
                bail!("stdin is not a terminal");
            }
            let repo = repo.map_err(|e| anyhow!("not inside a git repository: {}", e))?;
            let openai = ctx.config.openai.clone();

            cli::run_commit(
                &ctx,
                &flags.into(),
                &repo,
                || OpenAiClient::new(&openai),
                &mut prompter,
            )?;
        }
        Command::Tag {
            channel,
            yes,
            dry_run,
        } => {
            let repo = repo.map_err(|e| anyhow!("not inside a git repository: {}", e))?;
            let args = TagArgs {
                channel,
                yes,
                dry_run,
            };

            cli::run_tag(&ctx, &args, &repo, &mut prompter)?;
        }
        Command::Upgrade { action } => {
            let upgrade_config = &ctx.config.upgrade;
            let client = ReleaseClient::new(&upgrade_config.owner, &upgrade_config.repo)?;
            let releases = ui::spin("fetch releases", || client.list(RELEASES_PER_PAGE))?;

            match action {
                Some(UpgradeAction::List) => upgrade::run_list(&releases),
                None => {
                    upgrade::run_upgrade(&releases, &mut prompter)?;
                }
            }
        }
        Command::Config { action } => match action {
            Some(ConfigAction::Edit { editor }) => config_cmd::run_edit(&ctx, editor.as_deref())?,
            None => config_cmd::run_show(&ctx)?,
        },
        Command::Env => env_cmd::run_env(ctx.repo_root.as_deref()),
        Command::History { query } => {
            let query = query.join(" ");
            let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
            history_cmd::run_history(&ctx, Some(&query), interactive, &mut prompter)?;
        }
        Command::Version => version_cmd::run_version(ctx.repo_root.as_deref()),
    }

    Ok(())
}

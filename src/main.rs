use clap::{ArgGroup, Parser, Subcommand};
use is_terminal::IsTerminal;
use std::process::ExitCode;
use twig::areas::repository::Repository;
use twig::commands::plumbing::cat_file::CatFileMode;
use twig::commands::porcelain::reset::ResetMode;

const LOG_ENV: &str = "TWIG_LOG";

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A minimal content-addressed version control system",
    long_about = "twig tracks snapshots of a directory tree in a local object store. \
    It supports staging, commits, branches and three-way merges with conflict markers.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the .twig directory in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "hash-object",
        about = "Compute the blob id of a file and optionally store it"
    )]
    HashObject {
        #[arg(short, long, help = "Write the blob to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "cat-file",
        about = "Print the content or kind of an object",
        group(ArgGroup::new("mode").required(true).args(["pretty", "show_type"]))
    )]
    CatFile {
        #[arg(short = 'p', help = "Pretty-print the object content")]
        pretty: bool,
        #[arg(short = 't', help = "Print the object kind")]
        show_type: bool,
        #[arg(index = 1, help = "The object id")]
        object: String,
    },
    #[command(name = "write-tree", about = "Store the index as a tree and print its id")]
    WriteTree,
    #[command(
        name = "add",
        about = "Stage files",
        long_about = "This command stages the given files; directories are staged recursively."
    )]
    Add {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    #[command(name = "rm", about = "Unstage files and remove them from the working tree")]
    Rm {
        #[arg(long, help = "Only remove the path from the index")]
        cached: bool,
        #[arg(index = 1)]
        path: String,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the staged snapshot as a new commit on the current branch."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show first-parent history of the current branch")]
    Log,
    #[command(name = "branch", about = "List, create or delete branches")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(short, long, value_name = "BRANCH", conflicts_with = "name")]
        delete: Option<String>,
    },
    #[command(name = "checkout", about = "Switch to another branch")]
    Checkout {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(
        name = "merge",
        about = "Merge another branch into the current one",
        long_about = "This command merges the given branch into the current branch. \
        When the merge stops on conflicts, resolve them and commit, or run 'merge --abort'."
    )]
    Merge {
        #[arg(index = 1, required_unless_present = "abort")]
        branch: Option<String>,
        #[arg(long, conflicts_with = "branch", help = "Abandon a conflicted merge")]
        abort: bool,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status,
    #[command(
        name = "reset",
        about = "Move the current branch to a commit",
        group(ArgGroup::new("mode").args(["soft", "mixed", "hard"]))
    )]
    Reset {
        #[arg(long, help = "Move the branch only")]
        soft: bool,
        #[arg(long, help = "Also reset the index (default)")]
        mixed: bool,
        #[arg(long, help = "Also reset the index and the working tree")]
        hard: bool,
        #[arg(index = 1)]
        commit: String,
    },
    #[command(name = "config", about = "Get or set a configuration value")]
    Config {
        #[arg(index = 1, help = "A dotted key such as user.name")]
        key: String,
        #[arg(index = 2)]
        value: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    colored::control::set_override(std::io::stdout().is_terminal());

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn open_repository(path: Option<&str>) -> anyhow::Result<Repository> {
    match path {
        Some(path) => Repository::new(path, Box::new(std::io::stdout())),
        None => {
            let pwd = std::env::current_dir()?;
            Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    let repository = || open_repository(None);

    match command {
        Commands::Init { path } => open_repository(path.as_deref())?.init(),
        Commands::HashObject { write, file } => repository()?.hash_object(&file, write),
        Commands::CatFile {
            pretty: _,
            show_type,
            object,
        } => {
            let mode = if show_type {
                CatFileMode::Type
            } else {
                CatFileMode::Pretty
            };
            repository()?.cat_file(&object, mode)
        }
        Commands::WriteTree => repository()?.write_tree(),
        Commands::Add { paths } => repository()?.add(&paths),
        Commands::Rm { cached, path } => repository()?.rm(&path, cached),
        Commands::Commit { message } => repository()?.commit(&message),
        Commands::Log => repository()?.log(),
        Commands::Branch { name, delete } => match (name, delete) {
            (_, Some(branch)) => repository()?.delete_branch(&branch),
            (Some(branch), None) => repository()?.create_branch(&branch),
            (None, None) => repository()?.list_branches(),
        },
        Commands::Checkout { branch } => repository()?.checkout(&branch),
        Commands::Merge { branch, abort } => match branch {
            Some(branch) if !abort => repository()?.merge(&branch),
            _ => repository()?.merge_abort(),
        },
        Commands::Status => repository()?.status(),
        Commands::Reset {
            soft,
            mixed: _,
            hard,
            commit,
        } => {
            let mode = match (soft, hard) {
                (true, _) => ResetMode::Soft,
                (_, true) => ResetMode::Hard,
                _ => ResetMode::Mixed,
            };
            repository()?.reset(&commit, mode)
        }
        Commands::Config { key, value } => repository()?.config_command(&key, value.as_deref()),
    }
}

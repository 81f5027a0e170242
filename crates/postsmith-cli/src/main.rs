#![forbid(unsafe_code)]

mod cmd;
mod keywords;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "postsmith: front-matter editor for static blog posts",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Blog project root; overrides POSTSMITH_PROJECT and the config file.
    #[arg(long, global = true, value_name = "PATH")]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Posts",
        about = "Create a new post",
        long_about = "Create a new post under the project's posts directory. The file name is derived from the date and title.",
        after_help = "EXAMPLES:\n    # Create a post dated now\n    postsmith new --title \"Hello, World\" --tags \"rust cli\"\n\n    # Create a post with a body and an explicit date\n    postsmith new --title \"Trip notes\" --date 2024-3-5 --body-file notes.md\n\n    # Emit machine-readable output\n    postsmith new --title \"Hello\" --json"
    )]
    New(cmd::new::NewArgs),

    #[command(
        next_help_heading = "Posts",
        about = "Update a post's front matter",
        long_about = "Load a post, apply the given field changes, and rewrite its front matter in canonical form. The body is kept unless --body-file is given.",
        after_help = "EXAMPLES:\n    # Rename a post\n    postsmith edit _posts/2024-3-5-Hello.md --title \"Hello again\"\n\n    # Normalize a legacy header without changing any field\n    postsmith edit _posts/2019-4-1-old.md\n\n    # Replace tags with suggestions from a script\n    postsmith edit _posts/2024-3-5-Hello.md --suggest-tags ./keywords.sh"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Posts",
        about = "Show a post's front matter",
        long_about = "Decode a post's front matter and print the fields and any decode warnings.",
        after_help = "EXAMPLES:\n    # Show a post\n    postsmith show _posts/2024-3-5-Hello.md\n\n    # Emit machine-readable output\n    postsmith show _posts/2024-3-5-Hello.md --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Project",
        about = "List known authors",
        long_about = "List the author names in the project's author roster.",
        after_help = "EXAMPLES:\n    # List authors\n    postsmith authors --project ~/blog"
    )]
    Authors,

    #[command(
        next_help_heading = "Project",
        about = "Show or change configuration",
        after_help = "EXAMPLES:\n    # Show the config in effect\n    postsmith config show\n\n    # Remember the blog project\n    postsmith config set-project ~/blog"
    )]
    Config(cmd::config::ConfigArgs),

    #[command(
        next_help_heading = "Project",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    postsmith completions bash\n\n    # Generate zsh completions\n    postsmith completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("POSTSMITH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "postsmith=debug,info"
        } else {
            "postsmith=info,warn"
        })
    });

    let format = env::var("POSTSMITH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ctx = cmd::Context::load(cli.project.as_deref(), output)?;
    debug!(command = ?cli.command, "dispatching");

    match &cli.command {
        Commands::New(args) => cmd::new::run_new(args, &ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, &ctx),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::Authors => cmd::authors::run_authors(&ctx),
        Commands::Config(args) => cmd::config::run_config(args, &ctx),
        // Handled before config is loaded.
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["postsmith", "--json", "authors"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::parse_from(["postsmith", "show", "a.md", "--project", "/srv/blog", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.project, Some(PathBuf::from("/srv/blog")));
        assert!(matches!(cli.command, Commands::Show(_)));
    }

    #[test]
    fn new_requires_no_positional_arguments() {
        let cli = Cli::parse_from(["postsmith", "new", "--title", "Hello"]);
        let Commands::New(args) = cli.command else {
            panic!("expected new");
        };
        assert_eq!(args.fields.title.as_deref(), Some("Hello"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}

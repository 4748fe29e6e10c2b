use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use capsule_core::storage::ContentType;
use capsule_core::VERSION;

/// Time Capsule - seal messages, photos and videos until a chosen time
#[derive(Parser)]
#[command(name = "timecapsule")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the capsule catalog and ciphertext files
    #[arg(short, long, global = true, env = "TIMECAPSULE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output, warnings only in logs)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the config file and initialize the capsule store
    Init(InitArgs),

    /// Seal a new capsule
    Create(CreateArgs),

    /// Unlock every capsule that is due now
    Unlock(UnlockArgs),

    /// List all capsules and their status
    Check(CheckArgs),

    /// Keep unlocking due capsules until interrupted
    Autounlock(AutounlockArgs),

    /// Verify the catalog and ciphertext files
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `create` command
#[derive(Args)]
pub struct CreateArgs {
    /// Capsule title
    #[arg(short, long)]
    pub title: Option<String>,

    /// When the capsule may be opened (e.g. 2h, 3d, 2030-01-01T09:00)
    #[arg(short, long, value_name = "WHEN")]
    pub unlock: Option<String>,

    /// Content type
    #[arg(long = "type", value_enum, default_value_t = ContentKind::Text)]
    pub content_type: ContentKind,

    /// Message body for text capsules
    #[arg(short, long, conflicts_with = "file")]
    pub message: Option<String>,

    /// File to seal (required for photo and video)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Read the password from the first line of stdin
    #[arg(long)]
    pub password_stdin: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `unlock` command
#[derive(Args)]
pub struct UnlockArgs {
    /// Copy unlocked photos and videos here instead of opening a viewer
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Output a JSON report
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `check` command
#[derive(Args)]
pub struct CheckArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `autounlock` command
#[derive(Args)]
pub struct AutounlockArgs {
    /// Seconds between checks (defaults to the config value)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Copy unlocked photos and videos here instead of opening a viewer
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Content type accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentKind {
    Text,
    Photo,
    Video,
}

impl From<ContentKind> for ContentType {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Text => ContentType::Text,
            ContentKind::Photo => ContentType::Photo,
            ContentKind::Video => ContentType::Video,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "timecapsule",
            "--data-dir",
            "/tmp/caps",
            "create",
            "--title",
            "hello",
            "--unlock",
            "2h",
            "--type",
            "photo",
            "--file",
            "pic.jpg",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/caps")));
        match cli.command {
            Some(Commands::Create(args)) => {
                assert_eq!(args.title.as_deref(), Some("hello"));
                assert_eq!(args.unlock.as_deref(), Some("2h"));
                assert_eq!(ContentType::from(args.content_type), ContentType::Photo);
                assert_eq!(args.file, Some(PathBuf::from("pic.jpg")));
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_message_conflicts_with_file() {
        let result = Cli::try_parse_from([
            "timecapsule",
            "create",
            "--message",
            "hi",
            "--file",
            "a.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_interval_must_be_positive() {
        assert!(Cli::try_parse_from(["timecapsule", "autounlock", "--interval", "0"]).is_err());
        assert!(Cli::try_parse_from(["timecapsule", "autounlock", "--interval", "5"]).is_ok());
    }
}

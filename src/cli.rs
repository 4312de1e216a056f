//! CLI argument parsing for the hr-import binary.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "hr-import", about = "GOSI and worker-registry spreadsheet importer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the NATS worker (default if no subcommand given)
    Serve,
    /// Run database migrations and exit
    Migrate,
    /// Import one spreadsheet and print the batch result as JSON
    Import {
        /// Which export the file is
        #[arg(value_enum)]
        kind: ImportKind,
        /// File reference (`/files/...`, `/private/files/...`) or local path
        file_url: String,
        /// Process every row but roll back instead of committing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportKind {
    /// GOSI subscriber export
    Gosi,
    /// Foreign-worker registry export
    Worker,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_migrate_command_parses() {
        let cli = Cli::parse_from(["hr-import", "migrate"]);
        assert!(matches!(cli.command, Some(Command::Migrate)));
    }

    #[test]
    fn test_cli_no_command_defaults_to_none() {
        let cli = Cli::parse_from(["hr-import"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_import_command_parses() {
        let cli = Cli::parse_from(["hr-import", "import", "gosi", "/files/gosi.xlsx", "--dry-run"]);
        match cli.command {
            Some(Command::Import { kind, file_url, dry_run }) => {
                assert_eq!(kind, ImportKind::Gosi);
                assert_eq!(file_url, "/files/gosi.xlsx");
                assert!(dry_run);
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_cli_import_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["hr-import", "import", "payroll", "/files/x.xlsx"]).is_err());
    }
}

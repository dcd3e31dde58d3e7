// vetter/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vetter")]
#[command(about = "Definition-driven check & rewrite engine for delimited and fixed-width datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Checks a dataset, writes the rewritten dataset and the violation report
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Check definition set id
        #[arg(long, short)]
        definition: i64,

        /// Dataset id of the dataset to check
        #[arg(long, short)]
        target: String,

        /// Dataset id of a reference dataset (repeatable)
        #[arg(long, short)]
        reference: Vec<String>,

        /// Output dataset name (default: <target>_checked)
        #[arg(long)]
        output: Option<String>,

        /// Violation report name (default: <target>_violations)
        #[arg(long)]
        report: Option<String>,
    },

    /// 📋 Compiles a definition set and lists its checks
    Rules {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Check definition set id
        #[arg(long, short)]
        definition: i64,

        /// Dataset id whose metadata the checks address
        #[arg(long, short)]
        target: String,

        /// Dataset id of a reference dataset (repeatable)
        #[arg(long, short)]
        reference: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["vetter", "run", "--definition", "1", "--target", "survey"]);
        match args.command {
            Commands::Run {
                project_dir,
                definition,
                target,
                reference,
                output,
                report,
            } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                assert_eq!(definition, 1);
                assert_eq!(target, "survey");
                assert!(reference.is_empty());
                assert_eq!(output, None);
                assert_eq!(report, None);
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_run_references() -> Result<()> {
        let args = Cli::parse_from([
            "vetter",
            "run",
            "-d",
            "2",
            "-t",
            "survey",
            "--reference",
            "towns",
            "-r",
            "regions",
            "--output",
            "clean",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Run {
                project_dir,
                reference,
                output,
                ..
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(reference, vec!["towns".to_string(), "regions".to_string()]);
                assert_eq!(output, Some("clean".to_string()));
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_rules() -> Result<()> {
        let args = Cli::parse_from(["vetter", "rules", "-d", "3", "-t", "survey"]);
        match args.command {
            Commands::Rules {
                definition, target, ..
            } => {
                assert_eq!(definition, 3);
                assert_eq!(target, "survey");
                Ok(())
            }
            _ => bail!("Expected Rules command"),
        }
    }

    #[test]
    fn test_cli_requires_definition() {
        assert!(Cli::try_parse_from(["vetter", "run", "--target", "survey"]).is_err());
    }
}

//! CLI schema for the `comar-audit` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::models::{CapaStatus, Category, FindingStatus, Severity};

fn parse_severity(value: &str) -> Result<Severity, String> {
    Severity::parse(value)
        .ok_or_else(|| format!("expected one of: {}", names(Severity::ALL.map(|s| s.as_str()))))
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value)
        .ok_or_else(|| format!("expected one of: {}", names(Category::ALL.map(|c| c.as_str()))))
}

fn parse_finding_status(value: &str) -> Result<FindingStatus, String> {
    FindingStatus::parse(value).ok_or_else(|| "expected Open or Resolved".to_string())
}

fn parse_capa_status(value: &str) -> Result<CapaStatus, String> {
    CapaStatus::parse(value)
        .ok_or_else(|| format!("expected one of: {}", names(CapaStatus::ALL.map(|s| s.as_str()))))
}

fn names<const N: usize>(values: [&str; N]) -> String {
    values.join(", ")
}

#[derive(Parser, Debug)]
#[command(name = "comar-audit")]
#[command(about = "Track COMAR inspection findings and their corrective action plans")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
    /// Directory holding the database (overrides COMAR_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage findings
    Finding {
        #[command(subcommand)]
        action: FindingAction,
    },
    /// Manage CAPAs
    Capa {
        #[command(subcommand)]
        action: CapaAction,
    },
    /// Dashboard counts and recent activity
    Summary {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the stored document as JSON
    Export,
}

#[derive(Subcommand, Debug)]
pub enum FindingAction {
    /// Add a single finding
    Add(FindingFields),
    /// Add one finding per line (from a file, or stdin when omitted)
    Bulk {
        file: Option<PathBuf>,
        #[arg(long, default_value = "Minor", value_parser = parse_severity)]
        severity: Severity,
        #[arg(long, default_value = "Other", value_parser = parse_category)]
        category: Category,
    },
    /// Import findings from a CSV file with a header row
    Import { file: PathBuf },
    /// Edit fields of an existing finding
    Edit {
        id: String,
        #[command(flatten)]
        fields: FindingEdit,
    },
    /// Flip a finding between Open and Resolved
    Toggle { id: String },
    /// Delete a finding (its CAPA is kept)
    Delete { id: String },
    /// List findings
    List {
        /// Only open findings
        #[arg(long)]
        open: bool,
    },
}

#[derive(Args, Debug)]
pub struct FindingFields {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub comar_ref: String,
    #[arg(long, default_value = "Minor", value_parser = parse_severity)]
    pub severity: Severity,
    #[arg(long, default_value = "Other", value_parser = parse_category)]
    pub category: Category,
    #[arg(long, default_value = "")]
    pub notes: String,
    #[arg(long, default_value = "")]
    pub page_ref: String,
}

#[derive(Args, Debug)]
pub struct FindingEdit {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub comar_ref: Option<String>,
    #[arg(long, value_parser = parse_severity)]
    pub severity: Option<Severity>,
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub page_ref: Option<String>,
    #[arg(long, value_parser = parse_finding_status)]
    pub status: Option<FindingStatus>,
}

#[derive(Subcommand, Debug)]
pub enum CapaAction {
    /// Create a CAPA for a finding without one
    Create {
        /// Finding to link
        #[arg(long = "finding", default_value = "")]
        finding_id: String,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        action: String,
        #[arg(long, default_value = "")]
        root_cause: String,
        #[arg(long, default_value = "")]
        responsible: String,
        /// Due date, YYYY-MM-DD
        #[arg(long, default_value = "")]
        due: String,
    },
    /// Edit fields of an existing CAPA
    Edit {
        id: String,
        #[arg(long)]
        summary: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        root_cause: Option<String>,
        /// Empty string clears the person
        #[arg(long)]
        responsible: Option<String>,
        /// YYYY-MM-DD; empty string clears the date
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_parser = parse_capa_status)]
        status: Option<CapaStatus>,
        #[arg(long)]
        verification_notes: Option<String>,
    },
    /// Delete a CAPA and unlink its finding
    Delete { id: String },
    /// List CAPAs
    List,
    /// Findings that can still receive a CAPA
    Candidates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_finding_add_defaults() {
        let cli =
            Cli::try_parse_from(["comar-audit", "finding", "add", "--title", "Exit blocked"])
                .unwrap();
        let Command::Finding {
            action: FindingAction::Add(fields),
        } = cli.command
        else {
            panic!("expected finding add");
        };
        assert_eq!(fields.title, "Exit blocked");
        assert_eq!(fields.severity, Severity::Minor);
        assert_eq!(fields.category, Category::Other);
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["comar-audit", "summary", "--data-dir", "/tmp/x", "-v"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn parse_rejects_unknown_severity() {
        let result = Cli::try_parse_from([
            "comar-audit",
            "finding",
            "bulk",
            "--severity",
            "Catastrophic",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_capa_status_with_space() {
        let cli = Cli::try_parse_from([
            "comar-audit",
            "capa",
            "edit",
            "c-1",
            "--status",
            "In Progress",
        ])
        .unwrap();
        let Command::Capa {
            action: CapaAction::Edit { status, .. },
        } = cli.command
        else {
            panic!("expected capa edit");
        };
        assert_eq!(status, Some(CapaStatus::InProgress));
    }
}

//! Command-line interface for `ooedit`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ooedit::editor::{
    DocumentWriter, EditOptions, EditRequest, MetadataMode, RunError, parse_assignment,
};
use ooedit::outline::fields;
use ooedit::{Error, ErrorKind};
use std::path::PathBuf;

/// Exit status for a failure of `kind`.
pub fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Validation => 2,
        ErrorKind::Access | ErrorKind::Write => 3,
        ErrorKind::Format => 4,
    }
}

pub const EXIT_INTERRUPTED: u8 = 1;
pub const EXIT_OTHER: u8 = 4;

/// Edit metadata and placeholder text in OmniOutliner documents
#[derive(Parser, Debug)]
#[command(
    name = "ooedit",
    version,
    about = "Edit metadata and placeholder text in OmniOutliner documents",
    long_about = "Edit OmniOutliner 5 documents without opening them in OmniOutliner.\n\
                  Sets document metadata fields (Authors, Comments, Projects, ...) and replaces\n\
                  placeholder tokens such as {{project}} in the outline text."
)]
pub struct Cli {
    /// YAML file with editing options
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a debug trace to DEST ("-" for the terminal)
    #[arg(long, global = true, value_name = "DEST")]
    pub debug: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set metadata fields and replace placeholders
    Edit(EditArgs),
    /// Print metadata fields
    Show(ShowArgs),
    /// List the placeholders used in the outline text
    Tokens(TokensArgs),
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Document to edit
    #[arg(value_name = "DOC")]
    pub document: PathBuf,

    /// Set metadata field KEY (inspector label or kMDItem name) to VALUE
    #[arg(short = 'm', long = "meta", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub metadata: Vec<(String, String)>,

    /// Replace placeholder KEY with VALUE in the outline text
    #[arg(short = 't', long = "text", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub text: Vec<(String, String)>,

    /// Add to list fields such as Authors instead of replacing them
    #[arg(short, long)]
    pub append: bool,

    /// Write a new document instead of modifying DOC
    #[arg(short, long, value_name = "PATH", conflicts_with = "backup")]
    pub save_as: Option<PathBuf>,

    /// Keep the previous version of DOC next to it
    #[arg(short, long)]
    pub backup: bool,

    /// Use metadata keys exactly as given
    #[arg(long)]
    pub raw_keys: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Document to read
    #[arg(value_name = "DOC")]
    pub document: PathBuf,

    /// Fields to print; all fields when omitted
    #[arg(value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Dump all metadata as YAML
    #[arg(long, conflicts_with = "fields")]
    pub yaml: bool,
}

#[derive(Args, Debug)]
pub struct TokensArgs {
    /// Document to read
    #[arg(value_name = "DOC")]
    pub document: PathBuf,
}

fn parse_pair(arg: &str) -> std::result::Result<(String, String), String> {
    parse_assignment(arg).map_err(|e| e.to_string())
}

/// Map a failure to the process exit status.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(run) = err.downcast_ref::<RunError>() {
        return exit_status(run.kind());
    }
    if let Some(err) = err.downcast_ref::<Error>() {
        return exit_status(err.kind());
    }
    EXIT_OTHER
}

/// Execute the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    let options = match &cli.config {
        Some(path) => EditOptions::from_file(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => EditOptions::default(),
    };
    let writer = DocumentWriter::new(options)?;

    match &cli.command {
        Command::Edit(args) => edit(&writer, args),
        Command::Show(args) => show(&writer, args),
        Command::Tokens(args) => tokens(&writer, args),
    }
}

fn edit(writer: &DocumentWriter, args: &EditArgs) -> Result<()> {
    let mut builder = EditRequest::builder(&args.document)
        .raw_keys(args.raw_keys)
        .metadata_mode(if args.append {
            MetadataMode::Append
        } else {
            MetadataMode::Replace
        });
    builder = match &args.save_as {
        Some(path) => builder.save_as(path),
        None => builder.in_place(args.backup),
    };
    for (key, value) in &args.metadata {
        builder = builder.metadata(key, value);
    }
    for (key, value) in &args.text {
        builder = builder.substitute(key, value);
    }
    let request = builder.build()?;

    let outcome = writer.run(&request)?;
    println!(
        "{}: {} metadata field(s) changed, {} placeholder(s) replaced",
        outcome.path.display(),
        outcome.metadata_updated,
        outcome.replacements
    );
    if let Some(backup) = &outcome.backup {
        println!("previous version kept at {}", backup.display());
    }
    Ok(())
}

fn show(writer: &DocumentWriter, args: &ShowArgs) -> Result<()> {
    let document = writer.open(&args.document)?;
    let store = document.metadata();

    if args.yaml {
        let yaml = serde_saphyr::to_string(store)
            .map_err(|e| anyhow::anyhow!("rendering metadata as YAML: {}", e))?;
        print!("{}", yaml);
        return Ok(());
    }

    match args.fields.as_slice() {
        [] => {
            for (key, value) in store.iter() {
                println!("{}: {}", display_name(key), value);
            }
        },
        [field] => {
            if let Some(value) = store.get(fields::canonical_key(field)) {
                println!("{}", value);
            }
        },
        many => {
            for field in many {
                let key = fields::canonical_key(field);
                let value = store.get(key).map(|v| v.to_string()).unwrap_or_default();
                println!("{}: {}", display_name(key), value);
            }
        },
    }
    Ok(())
}

fn tokens(writer: &DocumentWriter, args: &TokensArgs) -> Result<()> {
    let document = writer.open(&args.document)?;
    for key in document.placeholders(writer.syntax())? {
        println!("{}", key);
    }
    Ok(())
}

// Inspector label for known fields, the raw key otherwise
fn display_name(key: &str) -> &str {
    fields::by_key(key).map_or(key, |field| field.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_edit() {
        let cli = Cli::try_parse_from([
            "ooedit",
            "edit",
            "plan.ooutline",
            "-m",
            "Comments=hello there",
            "-t",
            "project=Alpha",
            "--backup",
        ])
        .unwrap();
        let Command::Edit(args) = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(args.metadata, [("Comments".to_string(), "hello there".to_string())]);
        assert_eq!(args.text, [("project".to_string(), "Alpha".to_string())]);
        assert!(args.backup);
        assert!(args.save_as.is_none());
    }

    #[test]
    fn test_save_as_conflicts_with_backup() {
        let err = Cli::try_parse_from([
            "ooedit",
            "edit",
            "plan.ooutline",
            "-t",
            "a=b",
            "--save-as",
            "out.ooutline",
            "--backup",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_bad_pair_is_rejected() {
        assert!(Cli::try_parse_from(["ooedit", "edit", "plan.ooutline", "-m", "novalue"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let validation = anyhow::Error::new(Error::Validation("x".into()));
        assert_eq!(exit_code(&validation), 2);

        let access = anyhow::Error::new(Error::access("a.ooutline", "gone")).context("opening");
        assert_eq!(exit_code(&access), 3);

        let format = anyhow::Error::new(RunError {
            stage: ooedit::editor::Stage::Load,
            error: Error::Format("bad".into()),
        });
        assert_eq!(exit_code(&format), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), EXIT_OTHER);
    }
}

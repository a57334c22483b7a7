//! Command-line tool for FLT documents.
//!
//! Usage:
//!   flt check `<file>`                                  - Parse and summarise a document
//!   flt fmt `<file>` [--write]                          - Re-render in canonical form
//!   flt text `<file>` [--kind `<kind>`]                   - Print the text ranges of one kind
//!   flt dc `<file>` `<term>`                              - Print Dublin Core values
//!   flt replace `<file>` `<pattern>` `<replacement>` [...]  - Search and replace within ranges

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use flt_config::Config;
use flt_engine::{Document, Map, PointKind, escape};
use regex::Regex;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Check, format and edit FLT documents
#[derive(Parser, Debug)]
#[command(name = "flt", version, about = "Check, format and edit FLT documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a document and print a summary
    Check {
        file: PathBuf,
    },

    /// Re-render a document in canonical form
    Fmt {
        file: PathBuf,

        /// Rewrite the file instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },

    /// Print every range of one kind with its offset and length
    Text {
        file: PathBuf,

        /// line, section, paragraph, note, cell or heading
        #[arg(short, long)]
        kind: Option<PointKind>,
    },

    /// Print the values of a Dublin Core term
    Dc {
        file: PathBuf,
        term: String,
    },

    /// Replace regex matches inside each range of one kind
    Replace {
        file: PathBuf,
        pattern: String,

        /// Replacement template; `$1`, `$&` and `$$` are expanded
        replacement: String,

        /// line, section, paragraph, note, cell or heading
        #[arg(short, long)]
        kind: Option<PointKind>,

        /// Replace every match instead of the first in each range
        #[arg(short, long)]
        all: bool,

        /// Rewrite the file instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?.unwrap_or_default();

    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.parse_filters(&config.log_level);
    }
    logger.init();
    log::debug!("config path: {}", Config::config_path().display());

    let stdout = io::stdout();
    run(cli.command, &config, &mut stdout.lock())
}

fn run(command: Command, config: &Config, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Check { file } => check(&file, out),
        Command::Fmt { file, write } => fmt(&file, write, config, out),
        Command::Text { file, kind } => text(&file, kind.unwrap_or(config.default_kind), out),
        Command::Dc { file, term } => dc(&file, &term, out),
        Command::Replace {
            file,
            pattern,
            replacement,
            kind,
            all,
            write,
        } => {
            let pattern = Regex::new(&pattern).context("Invalid pattern")?;
            let options = ReplaceOptions {
                kind: kind.unwrap_or(config.default_kind),
                all,
                write,
            };
            replace(&file, &pattern, &replacement, options, config, out)
        }
    }
}

fn load(file: &Path) -> Result<Document> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let doc = Document::parse(&source)
        .with_context(|| format!("{} is not a valid FLT document", file.display()))?;
    if !doc.is_supported_version() {
        log::warn!(
            "{}: unsupported format version {}",
            file.display(),
            doc.version()
        );
    }
    Ok(doc)
}

/// Write `rendered` over `file`, copying the original to the backup directory first.
fn write_back(file: &Path, rendered: &str, config: &Config) -> Result<()> {
    if let Some(backup_dir) = &config.backup_dir {
        let name = file
            .file_name()
            .with_context(|| format!("{} has no file name", file.display()))?;
        std::fs::create_dir_all(backup_dir)?;
        let backup = backup_dir.join(name);
        std::fs::copy(file, &backup)
            .with_context(|| format!("Failed to back up {}", file.display()))?;
        log::info!("backed up {} to {}", file.display(), backup.display());
    }
    std::fs::write(file, format!("{rendered}\n"))
        .with_context(|| format!("Failed to write {}", file.display()))?;
    Ok(())
}

fn check(file: &Path, out: &mut impl Write) -> Result<()> {
    let doc = load(file)?;
    let map = Map::new(&doc);
    writeln!(
        out,
        "{}: ok (version {}, features {}, {} lines, {} bytes of text)",
        file.display(),
        doc.version(),
        doc.features(),
        doc.lines().len(),
        map.len()
    )?;
    for kind in PointKind::ALL {
        writeln!(out, "  {kind}: {}", map.points(kind).len())?;
    }
    Ok(())
}

fn fmt(file: &Path, write: bool, config: &Config, out: &mut impl Write) -> Result<()> {
    let doc = load(file)?;
    let rendered = doc.render();

    if config.verify_roundtrip {
        let again = Document::parse(&rendered).context("Rendered output does not parse")?;
        if again.render() != rendered {
            bail!("Rendered output of {} is not stable", file.display());
        }
    }

    if write {
        write_back(file, &rendered, config)
    } else {
        writeln!(out, "{rendered}")?;
        Ok(())
    }
}

fn text(file: &Path, kind: PointKind, out: &mut impl Write) -> Result<()> {
    let doc = load(file)?;
    let map = Map::new(&doc);
    for point in map.points(kind) {
        writeln!(
            out,
            "{}\t{}\t{}",
            point.offset(),
            point.length(),
            escape(&point.text(&doc)?)
        )?;
    }
    Ok(())
}

fn dc(file: &Path, term: &str, out: &mut impl Write) -> Result<()> {
    let doc = load(file)?;
    for value in doc.get_dc(term)? {
        writeln!(out, "{}", escape(value))?;
    }
    Ok(())
}

struct ReplaceOptions {
    kind: PointKind,
    all: bool,
    write: bool,
}

fn replace(
    file: &Path,
    pattern: &Regex,
    template: &str,
    options: ReplaceOptions,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let mut doc = load(file)?;
    let map = Map::new(&doc);

    let mut count = 0;
    for point in map.points(options.kind) {
        count += if options.all {
            point.replace_all(&mut doc, pattern, template)?
        } else {
            point.replace(&mut doc, pattern, template)?
        };
    }
    log::info!("{count} replacements in {} {} ranges", map.points(options.kind).len(), options.kind);

    let rendered = doc.render();
    if options.write {
        write_back(file, &rendered, config)?;
        writeln!(out, "{count}")?;
    } else {
        writeln!(out, "{rendered}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const STORY: &str = "0003 3 title Tides\n0003 3 subject sea\n0001 The tide \n0001 came in.\n0002 2\n0001 The tide went out.";

    fn story(dir: &TempDir) -> PathBuf {
        let file = dir.path().join("story.flt");
        std::fs::write(&file, STORY).unwrap();
        file
    }

    fn output(command: Command, config: &Config) -> Result<String> {
        let mut out = Vec::new();
        run(command, config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["flt", "replace", "a.flt", "x", "y", "--kind", "note", "--all"])
            .unwrap();
        match cli.command {
            Command::Replace {
                kind, all, write, ..
            } => {
                assert_eq!(kind, Some(PointKind::Note));
                assert!(all);
                assert!(!write);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["flt", "text", "a.flt", "--kind", "chapter"]).is_err());
    }

    #[test]
    fn test_check() {
        let dir = TempDir::new().unwrap();
        let file = story(&dir);
        let out = output(Command::Check { file }, &Config::default()).unwrap();
        assert!(out.contains(": ok (version 1, features 1, 6 lines, 35 bytes of text)"));
        assert!(out.contains("  paragraph: 2\n"));
    }

    #[test]
    fn test_check_reports_line_number() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("broken.flt");
        std::fs::write(&file, "0001 fine\nzz not hex\n").unwrap();

        let err = output(Command::Check { file }, &Config::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Line 2: Malformed line structure"));
    }

    #[test]
    fn test_text_by_kind() {
        let dir = TempDir::new().unwrap();
        let file = story(&dir);
        let out = output(
            Command::Text {
                file,
                kind: Some(PointKind::Paragraph),
            },
            &Config::default(),
        )
        .unwrap();
        assert_eq!(out, "0\t17\tThe tide came in.\n17\t18\tThe tide went out.\n");
    }

    #[test]
    fn test_dc_values() {
        let dir = TempDir::new().unwrap();
        let file = story(&dir);
        let out = output(
            Command::Dc {
                file: file.clone(),
                term: "title".to_string(),
            },
            &Config::default(),
        )
        .unwrap();
        assert_eq!(out, "Tides\n");

        let err = output(
            Command::Dc {
                file,
                term: "author".to_string(),
            },
            &Config::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid dublin core term"));
    }

    #[test]
    fn test_fmt_write_with_backup() {
        let dir = TempDir::new().unwrap();
        let file = story(&dir);
        let config = Config {
            backup_dir: Some(dir.path().join("backups")),
            ..Config::default()
        };

        output(Command::Fmt { file: file.clone(), write: true }, &config).unwrap();

        let written = std::fs::read_to_string(&file).unwrap();
        assert!(written.starts_with("0003 0 text/vnd.ficlab.flt\n"));
        assert!(written.contains("0003 3 subject sea\n0003 3 title Tides\n"));
        let backup = std::fs::read_to_string(dir.path().join("backups/story.flt")).unwrap();
        assert_eq!(backup, STORY);
    }

    #[test]
    fn test_replace_across_lines() {
        let dir = TempDir::new().unwrap();
        let file = story(&dir);
        let out = output(
            Command::Replace {
                file: file.clone(),
                pattern: r"tide\s+came".to_string(),
                replacement: "sea rolled".to_string(),
                kind: None,
                all: true,
                write: true,
            },
            &Config::default(),
        )
        .unwrap();
        assert_eq!(out, "1\n");

        let doc = Document::parse(&std::fs::read_to_string(&file).unwrap()).unwrap();
        let texts: Vec<&str> = doc
            .lines()
            .iter()
            .filter_map(|l| l.as_text())
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(texts, vec!["The sea rolled", " in.", "The tide went out."]);
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = TempDir::new().unwrap();
        let file = story(&dir);
        let err = output(
            Command::Replace {
                file,
                pattern: "(".to_string(),
                replacement: String::new(),
                kind: None,
                all: false,
                write: false,
            },
            &Config::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid pattern");
    }
}

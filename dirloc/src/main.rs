//! # dirloc
//!
//! A CLI for counting lines of code per file and per directory.
//!
//! ## Overview
//!
//! dirloc is built on top of dirloclib. It counts the lines of the given
//! files and directories, optionally skipping blank lines and comment lines
//! (recognised per file extension), and reports per-directory totals with
//! the non-recursive share of each directory.
//!
//! ## Usage
//!
//! ```bash
//! # Count the current directory (top level only)
//! dirloc
//!
//! # Count a tree, ignoring blanks and comments, with a per-directory breakdown
//! dirloc -d src -r -l -c -vv
//!
//! # Only Python and Rust files, excluding generated code
//! dirloc -d . -r -t py,rs -x generated/ -x .pb.rs
//!
//! # Extra targets from glob patterns, exclude list from a JSON file
//! dirloc -r -i "*.js" -x ignore.json
//!
//! # Machine-readable output
//! dirloc -d src -r --output json
//! ```

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dirloclib::{
    default_excludes, expand_pattern_args, load_comment_styles, CommentStyleTable, CountOptions,
    Query,
};
use log::debug;

use render::{render_failures, render_json, render_text, OutputMode};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("dirloc")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Count lines of code per file and per directory")
        .arg(
            Arg::new("directory")
                .short('d')
                .long("directory")
                .action(ArgAction::Append)
                .help("Directory to count (can be specified multiple times)"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .action(ArgAction::Append)
                .help("File to count (can be specified multiple times)"),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .action(ArgAction::SetTrue)
                .help("Descend into subdirectories"),
        )
        .arg(
            Arg::new("include")
                .short('i')
                .long("include")
                .action(ArgAction::Append)
                .help("Count paths matching glob pattern, or patterns from a .json file"),
        )
        .arg(
            Arg::new("exclude")
                .short('x')
                .long("exclude")
                .action(ArgAction::Append)
                .help("Skip paths matching pattern, or patterns from a .json file"),
        )
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .action(ArgAction::Append)
                .value_delimiter(',')
                .help("Only count files with these extensions (comma-separated)"),
        )
        .arg(
            Arg::new("skip-empty-lines")
                .short('l')
                .long("skip-empty-lines")
                .action(ArgAction::SetTrue)
                .help("Do not count blank lines"),
        )
        .arg(
            Arg::new("skip-comments")
                .short('c')
                .long("skip-comments")
                .action(ArgAction::SetTrue)
                .help("Do not count comment lines"),
        )
        .arg(
            Arg::new("comments-style")
                .long("comments-style")
                .value_name("PATH")
                .help("JSON file with the comment syntax per extension"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Show more detail (-v: non-recursive counts, -vv: full tree)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format"),
        )
}

fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Load the comment-style table, from `--comments-style` or the built-in one
fn load_table(matches: &ArgMatches) -> Result<CommentStyleTable> {
    match matches.get_one::<String>("comments-style") {
        Some(path) => load_comment_styles(path)
            .with_context(|| format!("cannot use comment styles from '{}'", path)),
        None => Ok(CommentStyleTable::builtin()?),
    }
}

/// Build the query from matches, resolving pattern files against `cwd`
fn build_query(matches: &ArgMatches, cwd: &Path) -> Result<Query> {
    let include = expand_pattern_args(strings(matches, "include"), cwd)?;
    let mut exclude = expand_pattern_args(strings(matches, "exclude"), cwd)?;
    if exclude.is_empty() {
        exclude = default_excludes()?;
    }

    let mut dirs: Vec<PathBuf> = strings(matches, "directory")
        .into_iter()
        .map(PathBuf::from)
        .collect();
    let files: Vec<PathBuf> = strings(matches, "file")
        .into_iter()
        .map(PathBuf::from)
        .collect();
    if dirs.is_empty() && files.is_empty() && include.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    let mut options = CountOptions::new()
        .recursive(matches.get_flag("recursive"))
        .exclude_empty_lines(matches.get_flag("skip-empty-lines"))
        .exclude_comments(matches.get_flag("skip-comments"));
    let types = strings(matches, "type");
    if !types.is_empty() {
        options = options.file_types(types);
    }

    Ok(Query {
        dirs,
        files,
        include,
        exclude,
        options,
        root: None,
    })
}

/// Run a count; `Ok(false)` means some target failed
fn run(matches: &ArgMatches) -> Result<bool> {
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let table = load_table(matches)?;
    let query = build_query(matches, &cwd)?;
    debug!("running {:?}", query);

    let result = query.run(&table)?;

    let mode = matches
        .get_one::<String>("output")
        .map(|s| OutputMode::from_arg(s))
        .unwrap_or(OutputMode::Text);
    match mode {
        OutputMode::Json => println!("{}", render_json(&result)?),
        OutputMode::Text => print!("{}", render_text(&result, matches.get_count("verbose"))),
    }
    eprint!("{}", render_failures(&result));

    Ok(result.is_complete())
}

fn main() -> ExitCode {
    setup_logging();
    let matches = build_command().get_matches();

    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["dirloc"];
        argv.extend(args);
        build_command().try_get_matches_from(argv).unwrap()
    }

    #[test]
    fn test_command_is_consistent() {
        build_command().debug_assert();
    }

    #[test]
    fn test_defaults_to_current_directory() {
        let cwd = std::env::current_dir().unwrap();
        let query = build_query(&parse(&[]), &cwd).unwrap();

        assert_eq!(query.dirs, vec![PathBuf::from(".")]);
        assert!(query.files.is_empty());
        assert!(!query.options.recursive);
        assert!(query.exclude.iter().any(|p| p == "node_modules/"));
    }

    #[test]
    fn test_files_suppress_default_directory() {
        let cwd = std::env::current_dir().unwrap();
        let query = build_query(&parse(&["-f", "a.rs", "-f", "b.rs"]), &cwd).unwrap();

        assert!(query.dirs.is_empty());
        assert_eq!(query.files, vec![PathBuf::from("a.rs"), PathBuf::from("b.rs")]);
    }

    #[test]
    fn test_flags_map_to_options() {
        let cwd = std::env::current_dir().unwrap();
        let query = build_query(
            &parse(&["-d", "src", "-r", "-l", "-c", "-t", "py,rs", "-x", "gen/"]),
            &cwd,
        )
        .unwrap();

        assert!(query.options.recursive);
        assert!(query.options.exclude_empty_lines);
        assert!(query.options.exclude_comments);
        assert_eq!(
            query.options.file_types,
            Some(vec!["py".to_string(), "rs".to_string()])
        );
        assert_eq!(query.exclude, vec!["gen/".to_string()]);
    }

    #[test]
    fn test_verbosity_counts() {
        assert_eq!(parse(&["-vv"]).get_count("verbose"), 2);
        assert_eq!(parse(&[]).get_count("verbose"), 0);
    }
}

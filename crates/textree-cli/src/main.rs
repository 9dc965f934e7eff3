use anyhow::{Context as _, Result, bail};
use std::io::Read;
use std::str::FromStr;
use std::{env, process};
use textree_config::Config;
use textree_model::html::render_document;
use textree_model::{Document, HtmlOptions, TagSet};

const USAGE: &str = "\
Usage: textree <command> <file|-> [args...]
       textree config

Commands:
  print <file>                          reprint in canonical fixture notation
  json <file>                           print the JSON projection
  html <file>                           render HTML using the configured options
  stats <file>                          print atom, boundary and cursor counts
  insert <file> <atom> <text>           insert text at an atom offset
  delete <file> <start> <end>           delete an atom range
  delete-boundary <file> <lb> <rb>      delete between two boundaries
  tag <file> <tag> <lb> <rb>            toggle an inline tag over a boundary range
  block <file> <name> <lb> <rb>         set the block tag of the touched contexts
  indent <file> <amount> <lb> <rb>      indent (or outdent, if negative) a range
  break <file> <boundary>               break the context at a boundary (Enter)
  config                                print the effective configuration as TOML

Use '-' as the file to read the fixture from stdin.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Print,
    Json,
    Html,
    Stats,
    Insert { at: usize, text: String },
    Delete { start: usize, end: usize },
    DeleteBoundary { lb: usize, rb: usize },
    Tag { tag: String, lb: usize, rb: usize },
    Block { name: String, lb: usize, rb: usize },
    Indent { amount: isize, lb: usize, rb: usize },
    Break { boundary: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Invocation {
    /// Print the effective configuration.
    Config,
    /// Run `command` on the fixture in `source` (`-` for stdin).
    Document { command: Command, source: String },
}

fn number<T: FromStr>(args: &[String], idx: usize, name: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = argument(args, idx, name)?;
    raw.parse().with_context(|| format!("invalid {name} '{raw}'"))
}

fn argument<'a>(args: &'a [String], idx: usize, name: &str) -> Result<&'a str> {
    match args.get(idx) {
        Some(arg) => Ok(arg),
        None => bail!("missing argument <{name}>"),
    }
}

impl Invocation {
    /// Parses everything after the program name.
    fn parse(args: &[String]) -> Result<Self> {
        let name = argument(args, 0, "command")?;
        if name == "config" {
            return Ok(Self::Config);
        }
        let source = argument(args, 1, "file")?.to_string();
        let command = match name {
            "print" => Command::Print,
            "json" => Command::Json,
            "html" => Command::Html,
            "stats" => Command::Stats,
            "insert" => Command::Insert {
                at: number(args, 2, "atom")?,
                text: argument(args, 3, "text")?.to_string(),
            },
            "delete" => Command::Delete {
                start: number(args, 2, "start")?,
                end: number(args, 3, "end")?,
            },
            "delete-boundary" => Command::DeleteBoundary {
                lb: number(args, 2, "lb")?,
                rb: number(args, 3, "rb")?,
            },
            "tag" => Command::Tag {
                tag: argument(args, 2, "tag")?.to_string(),
                lb: number(args, 3, "lb")?,
                rb: number(args, 4, "rb")?,
            },
            "block" => Command::Block {
                name: argument(args, 2, "name")?.to_string(),
                lb: number(args, 3, "lb")?,
                rb: number(args, 4, "rb")?,
            },
            "indent" => Command::Indent {
                amount: number(args, 2, "amount")?,
                lb: number(args, 3, "lb")?,
                rb: number(args, 4, "rb")?,
            },
            "break" => Command::Break {
                boundary: number(args, 2, "boundary")?,
            },
            other => bail!("unknown command '{other}'"),
        };
        Ok(Self::Document { command, source })
    }
}

fn execute(command: &Command, document: &Document, options: &HtmlOptions) -> Result<String> {
    let edited = match command {
        Command::Print => document.clone(),
        Command::Json => return Ok(document.to_json()?),
        Command::Html => return Ok(render_document(document, options)),
        Command::Stats => {
            return Ok(format!(
                "contexts: {}\natoms: {}\nboundaries: {}\ncursor positions: {}",
                document.children().len(),
                document.length(),
                document.boundaries_length(),
                document.total_cursor_positions()
            ));
        }
        Command::Insert { at, text } => document.insert(*at, text),
        Command::Delete { start, end } => document.delete(*start, *end),
        Command::DeleteBoundary { lb, rb } => document.delete_boundary(*lb, *rb),
        Command::Tag { tag, lb, rb } => {
            let tags: TagSet = [tag.as_str()].into_iter().collect();
            document.toggle_tags(&tags, *lb, *rb)
        }
        Command::Block { name, lb, rb } => document.update_blocks_named(name, *lb, *rb),
        Command::Indent { amount, lb, rb } => document.indent(*amount, *lb, *rb),
        Command::Break { boundary } => document.context_break_at(*boundary),
    };
    log::debug!(
        "{:?}: {} -> {} boundaries",
        command,
        document.boundaries_length(),
        edited.boundaries_length()
    );
    Ok(edited.to_fixture())
}

fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("failed to read '{source}'"))
}

fn run(args: &[String]) -> Result<String> {
    let invocation = Invocation::parse(args)?;
    let config = Config::load_or_default()?;
    log::info!("Config path: {}", Config::config_path().display());

    let (command, source) = match invocation {
        Invocation::Config => return Ok(config.to_toml()?),
        Invocation::Document { command, source } => (command, source),
    };
    let text = read_source(&source)?;
    let document =
        Document::from_fixture(&text).with_context(|| format!("failed to parse '{source}'"))?;
    execute(&command, &document, &config.html)
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        println!("{USAGE}");
        return;
    }

    match run(&args) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }
}

use std::{collections::BTreeSet, net::SocketAddr, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::{
    capability::Capability,
    layout::{CorpusLayout, DEFAULT_ARCHIVES, DEFAULT_JSON_DIR},
    search::Query,
};

#[derive(Debug, Parser)]
#[command(
    name = "shaderdex",
    about = "Index, tag and search a local corpus of shader metadata"
)]
pub struct Cli {
    /// Override the XDG data directory holding the cache
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Directory of per-shader JSON documents
    #[arg(
        long,
        global = true,
        env = "SHADERDEX_JSON_DIR",
        default_value = DEFAULT_JSON_DIR
    )]
    pub json_dir: PathBuf,

    /// Archive directory with search_results/ and requires_*.txt files
    /// (repeatable; defaults to shaders_071121 and shaders_270321)
    #[arg(
        long = "archive",
        global = true,
        env = "SHADERDEX_ARCHIVES",
        value_delimiter = ','
    )]
    pub archives: Vec<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn layout(&self) -> CorpusLayout {
        let archives = if self.archives.is_empty() {
            DEFAULT_ARCHIVES.iter().map(PathBuf::from).collect()
        } else {
            self.archives.clone()
        };
        CorpusLayout::new(self.json_dir.clone(), archives)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search shaders by metadata and required capabilities
    Search(SearchArgs),
    /// List every indexed shader
    List(ListArgs),
    /// Rebuild the tag mapping and the shader index from disk
    Reindex,
    /// Write mapped tags and inferred requirements into the JSON documents
    Apply,
    /// Print one shader's document
    Show(ShowArgs),
    /// Show cache and corpus statistics
    Status(StatusArgs),
    /// Serve the JSON API over HTTP
    Serve(ServeArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Tag substring (also matches tag files by prefix)
    #[arg(long)]
    pub tags: Option<String>,

    /// Name substring
    #[arg(long)]
    pub name: Option<String>,

    /// Author substring
    #[arg(long)]
    pub author: Option<String>,

    /// Description substring
    #[arg(long)]
    pub description: Option<String>,

    /// Required capabilities, comma separated
    #[arg(long, value_enum, value_delimiter = ',', ignore_case = true)]
    pub requires: Vec<Capability>,

    /// Rebuild the index before searching
    #[arg(long)]
    pub reindex: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    pub fn query(&self) -> Query {
        Query {
            tags: self.tags.clone(),
            name: self.name.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            requires: self.requires.iter().copied().collect::<BTreeSet<_>>(),
        }
    }
}

// -- List --

#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Rebuild the index before listing
    #[arg(long)]
    pub reindex: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Show --

#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Shader id
    pub id: String,

    /// Output compact JSON instead of pretty-printed
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Serve --

#[derive(Debug, Parser)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8081")]
    pub bind: SocketAddr,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "shaderdex",
            &mut std::io::stdout(),
        );
    }
}

/// Print the `search` subcommand's help.
pub fn print_search_help() {
    let mut cmd = Cli::command();
    if let Some(search) = cmd.find_subcommand_mut("search") {
        let _ = search.print_help();
    }
}

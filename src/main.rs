use clap::Parser;
use shaderdex::{
    CacheStore,
    DataDir,
    ShaderSearcher,
    cli::{self, Cli, Command, ListArgs, SearchArgs, ShowArgs},
    error,
    search,
    web,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("SHADERDEX_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let cache = CacheStore::open(&data_dir.cache_db());
    let searcher = ShaderSearcher::new(cli.layout(), cache)
        .with_progress(!cli.quiet);

    match cli.command {
        Command::Search(args) => cmd_search(&searcher, &args)?,
        Command::List(args) => cmd_list(&searcher, &args)?,
        Command::Reindex => cmd_reindex(&searcher),
        Command::Apply => cmd_apply(&searcher),
        Command::Show(args) => cmd_show(&searcher, &args)?,
        Command::Status(args) => cmd_status(&searcher, args.json)?,
        Command::Serve(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(web::serve(searcher, args.bind))?;
        }
        Command::Completions(_) => {}
    }

    Ok(())
}

fn cmd_search(
    searcher: &ShaderSearcher,
    args: &SearchArgs,
) -> error::Result<()> {
    let query = args.query();
    if query.is_empty() {
        cli::print_search_help();
        return Ok(());
    }

    let results = searcher.search(&query, args.reindex);
    if args.json {
        search::format_json(&results)?;
    } else {
        search::format_human(&results);
    }
    Ok(())
}

fn cmd_list(searcher: &ShaderSearcher, args: &ListArgs) -> error::Result<()> {
    let records = searcher.list_all(args.reindex);

    if args.json {
        search::format_json(&records)?;
    } else if records.is_empty() {
        println!("No shaders indexed.");
    } else {
        for r in &records {
            println!("{}\t{}\t{}", r.id, r.name, r.username);
        }
    }
    Ok(())
}

fn cmd_reindex(searcher: &ShaderSearcher) {
    let tags = searcher.load_tags(true);
    let index = searcher.load_index(true).index;
    println!("Indexed {} shaders and {} tags", index.len(), tags.len());
}

fn cmd_apply(searcher: &ShaderSearcher) {
    let report = searcher.apply_inferred_metadata();
    println!("Updated {} JSON files with tag information", report.tags_updated);
    println!(
        "Updated {} JSON files with requires information",
        report.requires_updated
    );
}

fn cmd_show(searcher: &ShaderSearcher, args: &ShowArgs) -> error::Result<()> {
    let document =
        searcher.shader(&args.id).ok_or_else(|| error::Error::NotFound {
            kind: "shader",
            name: args.id.clone(),
        })?;

    if args.json {
        println!("{}", serde_json::to_string(&document)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&document)?);
    }
    Ok(())
}

fn cmd_status(searcher: &ShaderSearcher, json: bool) -> error::Result<()> {
    let status = searcher.status();

    if json {
        println!("{}", serde_json::to_string(&status)?);
        return Ok(());
    }

    let slot = |present: bool| if present { "present" } else { "missing" };
    let count = |n: Option<usize>| {
        n.map_or_else(|| "-".to_string(), |n| n.to_string())
    };

    println!("Cache: {}", status.cache_path.display());
    if !status.persistent {
        println!("  (not persistent)");
    }
    println!("Tag cache: {}", slot(status.tag_slot));
    println!("Shader index: {}", slot(status.index_slot));
    println!("Indexed shaders: {}", count(status.indexed_shaders));
    println!("Tags: {}", count(status.tags));
    println!("Corpus documents: {}", status.corpus_documents);
    Ok(())
}

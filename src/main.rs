use clap::Parser;
use marknote::cli::{
    handle_delete, handle_edit, handle_info, handle_init, handle_list, handle_new, handle_show,
    Cli, Commands,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dir = cli.dir;

    let result = match cli.command {
        Commands::Init => handle_init(dir),
        Commands::New { title, stdin, json } => handle_new(dir, title, stdin, json),
        Commands::List { json } => handle_list(dir, json),
        Commands::Show { id, json, html } => handle_show(dir, id, json, html),
        Commands::Edit {
            id,
            title,
            stdin,
            json,
        } => handle_edit(dir, id, title, stdin, json),
        Commands::Delete { id, force } => handle_delete(dir, id, force),
        Commands::Info => handle_info(dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

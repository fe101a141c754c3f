use clap::Parser;
use sybase_middleware::prelude::*;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dump Sybase table schemas as JSON")]
struct Args {
    #[arg(long, env = "SYBASE_HOST", default_value = "localhost")]
    host: String,
    #[arg(long, env = "SYBASE_PORT")]
    port: Option<u16>,
    #[arg(long, env = "SYBASE_DATABASE")]
    database: String,
    #[arg(long, env = "SYBASE_USERNAME", default_value = "sa")]
    username: String,
    #[arg(long, env = "SYBASE_PASSWORD", default_value = "", hide_env_values = true)]
    password: String,
    /// Only dump these tables (repeatable).
    #[arg(long = "table")]
    tables: Vec<String>,
    #[arg(long)]
    pretty: bool,
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    if let Err(err) = run(args).await {
        eprintln!("sybase-schema: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), SybaseDbError> {
    let options = SybaseOptions::builder(args.host, args.database, args.username, args.password)
        .port(args.port)
        .application_name(Some("sybase-schema".to_string()))
        .finish();

    let mut adapter = SybaseAdapter::connect_tds(options).await?;
    let dump = adapter.schema_dump(&args.tables).await;
    adapter.disconnect().await;
    let dump = dump?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&dump)
    } else {
        serde_json::to_string(&dump)
    }
    .map_err(|e| SybaseDbError::Other(format!("failed to serialize schema: {e}")))?;
    println!("{json}");
    Ok(())
}

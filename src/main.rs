use anyhow::bail;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagdesk::config::Config;
use tagdesk::store::TagStore;
use tagdesk::{build_app, cli, db};

const USAGE: &str = "usage: tagdesk [serve | create-operator <name> [email] | import-tags <file> | suggest <name>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagdesk=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let pool = db::init_pool(&config.database_url).await?;
    let store = TagStore::new(pool.clone(), config.tag_name_max_len);

    match args.first().map(String::as_str) {
        None | Some("serve") => {
            let addr = config.bind_addr;
            let app = build_app(pool, config).await?;
            let listener = TcpListener::bind(addr).await?;

            tracing::info!("listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        Some("create-operator") => {
            let Some(name) = args.get(1) else { bail!(USAGE) };
            cli::create_operator(&pool, name, args.get(2).map(String::as_str)).await?;
        }
        Some("import-tags") => {
            let Some(path) = args.get(1) else { bail!(USAGE) };
            cli::import_tags(&store, path).await?;
        }
        Some("suggest") => {
            let Some(candidate) = args.get(1) else { bail!(USAGE) };
            cli::print_suggestions(&store, candidate, &config.suggest).await?;
        }
        Some(other) => bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}

use std::time::Duration;

use clap::Parser;
use ebook_backend_mock::{MockServer, Scenario};

#[derive(Parser, Debug)]
#[clap(name = "ebook-backend-mock", about = "Stand-in for the ebook generation backend")]
struct Cli {
    #[clap(long, default_value = "127.0.0.1:8000")]
    bind_addr: String,

    #[clap(long, default_value_t = 15, help = "Seconds each generation takes")]
    duration_secs: u64,

    #[clap(long, help = "Fail every generation with this detail message")]
    fail_with: Option<String>,

    #[clap(long, help = "Report the artifact path under this field instead of pdf_path")]
    path_field: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let scenario = Scenario {
        duration: Duration::from_secs(cli.duration_secs),
        failure: cli.fail_with,
        path_field: cli.path_field,
    };

    tracing::info!("Starting ebook backend mock on {}", cli.bind_addr);
    MockServer::new(scenario).serve(&cli.bind_addr).await
}

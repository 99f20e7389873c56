use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = pixelfx::cli::Cli::parse();
    pixelfx::init_logger(cli.verbose);

    pixelfx::cli::run(cli).await
}

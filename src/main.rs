use clap::Parser;

#[tokio::main]
async fn main() {
    let args = chipi::cli::Args::parse();
    if let Err(e) = chipi::cli::run(args).await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

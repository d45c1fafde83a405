use clap::Parser;

use tinderbox::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = tinderbox::run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

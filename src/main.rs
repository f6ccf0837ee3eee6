// Soku CSS Minimizer
// Entry point with clean separation of concerns

use soku_css_minimizer::cli::CliHandler;

#[tokio::main]
async fn main() {
    let handler = CliHandler::new();

    if let Err(e) = handler.run().await {
        eprintln!("{}", e.format_detailed());
        std::process::exit(1);
    }
}

//! srgraph CLI entry point.

fn main() {
    if let Err(e) = srgraph_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

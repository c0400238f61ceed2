//! IMG.LY image editor CLI tool
//!
//! Command-line interface applying adjustments, filters, mask compositing and
//! box overlays with the imgly-editor library.

#[cfg(feature = "cli")]
use imgly_editor::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}

//! Postprocess, in place, the SVG files given on the command line.
//! Set `RUST_LOG=debug` to follow the processing.

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let files: Vec<_> = std::env::args_os().skip(1).collect();
    if files.is_empty() {
        eprintln!("Usage: mplwp FILE.svg...");
        return ExitCode::FAILURE
    }
    for f in files {
        match mplwp::postprocess(&f) {
            Ok(report) => println!("{}: {}", f.to_string_lossy(), report),
            Err(e) => {
                eprintln!("{}: {}", f.to_string_lossy(), e);
                return ExitCode::FAILURE
            }
        }
    }
    ExitCode::SUCCESS
}

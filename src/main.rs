use clap::Parser;
use mediasort::cli::{Args, run_cli};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Failures are reported on stderr only; the exit code stays 0.
    if let Err(e) = run_cli(&args.into_config()) {
        log::warn!("{}", e);
    }
}

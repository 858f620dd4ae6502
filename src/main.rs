use anyhow::Result;
use par_annotate::cli;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // Routes log::info!() etc. to /tmp/par_annotate_debug.log; mirrors to
    // stderr when RUST_LOG is set. CLI --log-level beats RUST_LOG beats config.
    par_annotate::debug::init_log_bridge(options.log_level);

    let config = cli::load_config(options.config.as_ref())?;
    par_annotate::debug::apply_config_level(config.log_level.to_level_filter(), options.log_level);
    log::info!("Starting par-annotate {}", par_annotate::VERSION);

    if let Err(e) = cli::run(options.task, &config) {
        eprintln!("par-annotate: error: {e:#}");
        return Err(e);
    }
    Ok(())
}

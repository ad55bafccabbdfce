// src/main.rs

use examsim::{cli, logging, run};

fn main() {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("examsim error: failed to start the async runtime: {err}");
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run_main());

    // A console read may still be parked on a blocking thread; don't wait
    // for it.
    runtime.shutdown_background();

    if let Err(err) = result {
        eprintln!("examsim error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}

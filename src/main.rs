use anyhow::bail;
use std::path::Path;

/// Data check for an ENAS run results directory. The run root comes from the
/// first command-line argument or the `RUN_RESULTS_PATH` environment variable.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let root = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("RUN_RESULTS_PATH").ok());
    let Some(root) = root else {
        bail!(
            "no run results directory; pass it as an argument or set RUN_RESULTS_PATH"
        );
    };

    log::info!("checking ENAS run results in {root}");
    let report = evovis::validate_run(Path::new(&root));

    if report.is_ok() {
        println!("All run artifacts look structurally sound.");
        return Ok(());
    }

    for message in report.messages() {
        println!("{message}");
    }
    bail!("{} issue(s) found in {root}", report.len());
}

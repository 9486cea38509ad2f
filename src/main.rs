use std::process::ExitCode;

use sensenet::logging::init_logging;
use sensenet::uci::options::UciOptions;
use sensenet::uci::run_uci_loop;

fn main() -> ExitCode {
    init_logging();

    let options = match std::env::args().nth(1) {
        Some(path) => UciOptions::new(path),
        None => UciOptions::default(),
    };

    match run_uci_loop(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("console I/O failed: {e}");
            ExitCode::FAILURE
        }
    }
}

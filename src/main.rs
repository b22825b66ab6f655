use std::process::ExitCode;

use voxel_ngin::{Settings, flow};

fn main() -> ExitCode {
    match flow::run(Settings::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

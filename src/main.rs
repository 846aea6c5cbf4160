use std::process::ExitCode;

use learning_wgpu::device::GpuInit;
use learning_wgpu::logging::{LoggingConfig, init_logging};
use learning_wgpu::window::{Runtime, RuntimeConfig};

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match Runtime::run(RuntimeConfig::default(), GpuInit::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(fatal) => {
            log::error!("{fatal}");
            ExitCode::from(fatal.exit_code())
        }
    }
}

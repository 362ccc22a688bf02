// Copyright (c) The nunit-adapter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use nunit_adapter_cli::NUnitAdapterApp;

fn main() -> Result<()> {
    color_eyre::install()?;

    let app = NUnitAdapterApp::parse();
    let output = app.init_output();

    let mut stdout = std::io::stdout().lock();
    match app.exec(output, &mut stdout) {
        Ok(()) => Ok(()),
        Err(error) => {
            error.display_to_stderr();
            std::process::exit(error.process_exit_code())
        }
    }
}

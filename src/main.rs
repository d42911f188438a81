use clap::{Arg, Command as ClapCommand, ArgAction};
use std::process;
use log::error;

use bandsplit::utils::logger::Logger;
use bandsplit::commands::{CommandFactory, BandsplitCommandFactory};

fn main() {
    let matches = ClapCommand::new("bandsplit")
        .version("0.1.0")
        .about("Split multi-band TIFF/GeoTIFF rasters into single-band files")
        .arg(
            Arg::new("input")
                .help("Input raster file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .help("Directory receiving the band_<N>.tif files")
                .value_name("DIR")
                .default_value("bands")
                .required(false),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .help("Inspect file structure instead of splitting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_file = "bandsplit.log";
    let logger = match Logger::new(log_file) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = Logger::init_global_logger("bandsplit-global.log") {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    if matches.get_flag("verbose") {
        Logger::enable_verbose();
    }

    let factory = BandsplitCommandFactory::new();

    let command_result = factory.create_command(&matches, &logger);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}

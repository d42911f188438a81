//! CLI command implementations
//!
//! This module contains implementations of the commands supported
//! by the CLI application using the Command pattern.

pub mod command_traits;
pub mod split_command;
pub mod info_command;

pub use command_traits::{Command, CommandFactory};
pub use split_command::SplitCommand;
pub use info_command::InfoCommand;

use clap::ArgMatches;
use crate::utils::logger::Logger;
use crate::tiff::errors::TiffResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct BandsplitCommandFactory;

impl BandsplitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        BandsplitCommandFactory
    }
}

impl Default for BandsplitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for BandsplitCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> TiffResult<Box<dyn Command + 'a>> {
        // Splitting is the default; --info switches to inspection
        if args.get_flag("info") {
            Ok(Box::new(InfoCommand::new(args, logger)?))
        } else {
            Ok(Box::new(SplitCommand::new(args, logger)?))
        }
    }
}

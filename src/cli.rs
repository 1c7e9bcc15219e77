//! Argument parsing shared by the binaries

use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;

/// Exit status for unusable arguments and failed runs
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Parse the process arguments.
///
/// Help and version output are printed to stdout and yield a successful exit
/// code; any other parse error is printed to stderr and yields
/// [`FAILURE_EXIT_CODE`].
pub fn parse_args<P: Parser>() -> Result<P, ExitCode> {
    parse_args_from(std::env::args_os())
}

pub fn parse_args_from<P, I, T>(args: I) -> Result<P, ExitCode>
where
    P: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    P::try_parse_from(args).map_err(|e| {
        let code = usage_exit_code(&e);
        let _ = e.print();
        ExitCode::from(code)
    })
}

fn usage_exit_code(error: &clap::Error) -> u8 {
    if error.use_stderr() { FAILURE_EXIT_CODE } else { 0 }
}

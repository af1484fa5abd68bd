use super::VERSION;
use clap::{App, Arg, ArgMatches};
use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_PATH: &str = "output.svg";

fn cli_app() -> App<'static, 'static> {
    let arg_input = Arg::with_name("input")
        .help("heap capacity log, e.g. the output of jstat -gccapacity")
        .short("i")
        .long("input")
        .value_name("FILE")
        .takes_value(true)
        .required(true);
    let arg_output = Arg::with_name("outputPath")
        .help("directory for young_gen.png and old_gen.png")
        .short("o")
        .long("outputPath")
        .value_name("PATH")
        .takes_value(true)
        .default_value(DEFAULT_OUTPUT_PATH);
    App::new("heapgen_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the young and old generation capacity over time")
        .arg(arg_input)
        .arg(arg_output)
}

fn paths_from(cli_args: &ArgMatches) -> (PathBuf, PathBuf) {
    let input = PathBuf::from(cli_args.value_of_os("input").unwrap_or_default());
    let output_path = PathBuf::from(
        cli_args
            .value_of_os("outputPath")
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.as_ref()),
    );
    (input, output_path)
}

/// Takes the CLI arguments that control the plotting of the heap capacity,
/// returns the input file and the output directory.
/// Exits with the usage message on invalid arguments.
pub fn parse_cli() -> (PathBuf, PathBuf) {
    let cli_args = cli_app().get_matches();
    paths_from(&cli_args)
}

/// Same as `parse_cli`, on an explicit argument list (first item is the binary name).
pub fn parse_cli_from<I, T>(args: I) -> Result<(PathBuf, PathBuf), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = cli_app().get_matches_from_safe(args)?;
    Ok(paths_from(&cli_args))
}

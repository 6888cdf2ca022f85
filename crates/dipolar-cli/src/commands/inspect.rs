use crate::cli::InspectArgs;
use crate::config;
use crate::error::{CliError, Result};
use dipolar::core::io::{dipole_file::DipoleFile, traits::PointFile};
use tracing::info;

/// Loads the input with the requested record options and prints what a `compute` run
/// over it would evaluate.
pub fn run(args: InspectArgs) -> Result<()> {
    let options = config::load_options(&args.records);
    info!("Inspecting {:?} with {:?}", &args.input, options);

    let (store, load_report) =
        DipoleFile::read_from_path(&args.input, &options).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    println!("Input:    {}", args.input.display());
    println!("Dipoles:  {}", store.len());
    println!("Pairs:    {}", store.pair_count());
    if load_report.skipped_lines.is_empty() {
        println!("Skipped:  none");
    } else {
        let lines: Vec<String> = load_report
            .skipped_lines
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "Skipped:  {} line(s): {}",
            load_report.skipped_lines.len(),
            lines.join(", ")
        );
    }
    Ok(())
}

use crate::cli::ComputeArgs;
use crate::config::{self, AppConfig};
use crate::error::{CliError, Result};
use crate::ui::{CliProgressHandler, UiEvent};
use dipolar::{
    core::io::{dipole_file::DipoleFile, report::ReportWriter, traits::PointFile},
    core::models::dipole::PointStore,
    engine::{progress::ProgressReporter, state::EnergyReport, tasks::direct_sum},
    workflows::total_energy::Coordinator,
};
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Relative tolerance between the pipeline total and the direct sum.
const VERIFY_TOLERANCE: f64 = 1e-9;

pub async fn run(
    args: ComputeArgs,
    threads: Option<usize>,
    ui_sender: mpsc::Sender<UiEvent>,
) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = config::build_config(&args, threads)?;

    let store = Arc::new(load_store(&config)?);
    println!(
        "Loaded {} dipoles from {} ({} pairs).",
        store.len(),
        config.input_path.display(),
        store.pair_count()
    );

    let file = File::create(&config.output_path)?;
    let mut sink = ReportWriter::new(BufWriter::new(file));
    let reporter =
        ProgressReporter::with_callback(CliProgressHandler::new(ui_sender).get_callback());

    let coordinator = Coordinator::new(config.pipeline.clone());
    let abort = coordinator.abort_handle();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping the pipeline.");
            abort.abort();
        }
    });

    info!("Invoking the total energy workflow...");
    let outcome = coordinator.run(store.clone(), &reporter, &mut sink).await;
    interrupt.abort();
    let report = outcome?;

    println!(
        "Total energy: {:e} J over {} pairs in {:?}.",
        report.total, report.steps, report.elapsed
    );
    println!(
        "✓ Report ({} sampled pairs) written to: {}",
        report.checkpoints.len(),
        config.output_path.display()
    );

    if config.verify {
        verify_total(&store, &config, &report)?;
    }

    Ok(())
}

fn load_store(config: &AppConfig) -> Result<PointStore> {
    info!("Loading dipoles from {:?}", &config.input_path);
    let (store, load_report) =
        DipoleFile::read_from_path(&config.input_path, &config.load).map_err(|e| {
            CliError::FileParsing {
                path: config.input_path.clone(),
                source: e.into(),
            }
        })?;

    if !load_report.skipped_lines.is_empty() {
        warn!(
            "Skipped {} malformed line(s) in {}.",
            load_report.skipped_lines.len(),
            config.input_path.display()
        );
    }
    Ok(store)
}

fn verify_total(store: &PointStore, config: &AppConfig, report: &EnergyReport) -> Result<()> {
    info!("Cross-checking against a direct summation...");
    let direct = tokio::task::block_in_place(|| {
        direct_sum::run(store, &config.pipeline.constants)
    })?;

    if !totals_agree(report.total, direct) {
        return Err(CliError::Verification {
            pipeline: report.total,
            direct,
        });
    }
    println!("✓ Direct summation agrees: {:e} J", direct);
    Ok(())
}

fn totals_agree(pipeline: f64, direct: f64) -> bool {
    let scale = pipeline.abs().max(direct.abs());
    (pipeline - direct).abs() <= scale * VERIFY_TOLERANCE
}

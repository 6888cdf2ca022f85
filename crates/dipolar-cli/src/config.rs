mod defaults;
mod file;
mod models;

pub use models::AppConfig;

use crate::cli::{ComputeArgs, RecordArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use dipolar::core::io::dipole_file::{LoadOptions, MalformedRecordPolicy, RecordLimit};
use dipolar::engine::config::PipelineConfigBuilder;
use file::{FileConfig, FileInputConfig};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Resolves the settings for `compute`.
///
/// Precedence, highest first: command-line flags, `--set` values, the config file, then
/// the built-in defaults.
pub fn build_config(args: &ComputeArgs, threads: Option<usize>) -> Result<AppConfig> {
    let defaults = DefaultsConfig::with_threads(threads);

    let mut file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(&mut file_config, &args.set_values)?;

    let load = merge_load_options(
        &args.records,
        file_config.input.unwrap_or_default(),
        &defaults,
    );

    let pipeline_file = file_config.pipeline.unwrap_or_default();
    let pipeline = PipelineConfigBuilder::new()
        .workers(
            args.workers
                .or(pipeline_file.workers)
                .unwrap_or(defaults.workers),
        )
        .pair_queue_capacity(
            args.pair_queue_capacity
                .or(pipeline_file.pair_queue_capacity)
                .unwrap_or(defaults.pair_queue_capacity),
        )
        .result_queue_capacity(
            args.result_queue_capacity
                .or(pipeline_file.result_queue_capacity)
                .unwrap_or(defaults.result_queue_capacity),
        )
        .write_step(
            args.write_step
                .or(pipeline_file.write_step)
                .unwrap_or(defaults.write_step),
        )
        .shutdown_grace(Duration::from_millis(
            pipeline_file
                .shutdown_grace_ms
                .unwrap_or(defaults.shutdown_grace_ms),
        ))
        .constants(file_config.constants.unwrap_or_default())
        .build()?;

    debug!("Resolved pipeline configuration: {:?}", pipeline);

    Ok(AppConfig {
        input_path: args.input.clone(),
        output_path: args.output.clone(),
        load,
        pipeline,
        verify: args.verify,
    })
}

/// Record selection for subcommands that only read the input.
pub fn load_options(records: &RecordArgs) -> LoadOptions {
    merge_load_options(records, FileInputConfig::default(), &DefaultsConfig::default())
}

fn merge_load_options(
    records: &RecordArgs,
    file: FileInputConfig,
    defaults: &DefaultsConfig,
) -> LoadOptions {
    let limit = match records.limit.or(file.limit) {
        Some(n) => RecordLimit::Prefix(n),
        None => RecordLimit::All,
    };
    let skip = records.skip_malformed
        || file.skip_malformed.unwrap_or(defaults.skip_malformed);

    LoadOptions {
        limit,
        malformed: if skip {
            MalformedRecordPolicy::Skip
        } else {
            MalformedRecordPolicy::Reject
        },
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid value for {}: '{}' ({} expected)",
            key,
            value,
            std::any::type_name::<T>()
        ))
    })
}

fn apply_set_values(config: &mut FileConfig, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "input.limit" => {
                config.input.get_or_insert_with(Default::default).limit =
                    Some(parse_value(key, value)?);
            }
            "input.skip-malformed" => {
                config.input.get_or_insert_with(Default::default).skip_malformed =
                    Some(parse_value(key, value)?);
            }
            "pipeline.workers" => {
                config.pipeline.get_or_insert_with(Default::default).workers =
                    Some(parse_value(key, value)?);
            }
            "pipeline.pair-queue-capacity" => {
                config
                    .pipeline
                    .get_or_insert_with(Default::default)
                    .pair_queue_capacity = Some(parse_value(key, value)?);
            }
            "pipeline.result-queue-capacity" => {
                config
                    .pipeline
                    .get_or_insert_with(Default::default)
                    .result_queue_capacity = Some(parse_value(key, value)?);
            }
            "pipeline.write-step" => {
                config.pipeline.get_or_insert_with(Default::default).write_step =
                    Some(parse_value(key, value)?);
            }
            "pipeline.shutdown-grace-ms" => {
                config
                    .pipeline
                    .get_or_insert_with(Default::default)
                    .shutdown_grace_ms = Some(parse_value(key, value)?);
            }
            "constants.mu-0" => {
                config.constants.get_or_insert_with(Default::default).mu_0 =
                    parse_value(key, value)?;
            }
            "constants.mu-e" => {
                config.constants.get_or_insert_with(Default::default).mu_e =
                    parse_value(key, value)?;
            }
            "constants.spin-factor" => {
                config.constants.get_or_insert_with(Default::default).spin_factor =
                    parse_value(key, value)?;
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use dipolar::core::physics::constants::{MU_0, PhysicalConstants};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("dipolar.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn compute_args(extra: &[&str]) -> ComputeArgs {
        let mut argv = vec!["dipolar", "compute", "-i", "data", "-o", "out"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Compute(args) => args,
            _ => panic!("Expected 'compute' subcommand"),
        }
    }

    fn with_config(path: &Path, extra: &[&str]) -> ComputeArgs {
        let path = path.to_str().unwrap();
        let mut argv = vec!["-c", path];
        argv.extend_from_slice(extra);
        compute_args(&argv)
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let config = build_config(&compute_args(&[]), Some(3)).unwrap();

        assert_eq!(config.input_path, PathBuf::from("data"));
        assert_eq!(config.output_path, PathBuf::from("out"));
        assert_eq!(config.load, LoadOptions::default());
        assert_eq!(config.pipeline.workers, 3);
        assert_eq!(config.pipeline.pair_queue_capacity, 10_000);
        assert_eq!(config.pipeline.result_queue_capacity, 10_000);
        assert_eq!(config.pipeline.write_step, 100);
        assert_eq!(config.pipeline.shutdown_grace, Duration::from_secs(2));
        assert_eq!(config.pipeline.constants, PhysicalConstants::default());
        assert!(!config.verify);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [input]
            limit = 10000
            skip-malformed = true

            [pipeline]
            workers = 16
            pair-queue-capacity = 64
            write-step = 25
            shutdown-grace-ms = 500

            [constants]
            spin-factor = 1.0
            "#,
        );

        let config = build_config(&with_config(&path, &[]), Some(2)).unwrap();

        assert_eq!(config.load.limit, RecordLimit::Prefix(10_000));
        assert_eq!(config.load.malformed, MalformedRecordPolicy::Skip);
        assert_eq!(config.pipeline.workers, 16);
        assert_eq!(config.pipeline.pair_queue_capacity, 64);
        assert_eq!(config.pipeline.result_queue_capacity, 10_000);
        assert_eq!(config.pipeline.write_step, 25);
        assert_eq!(config.pipeline.shutdown_grace, Duration::from_millis(500));
        assert_eq!(config.pipeline.constants.spin_factor, 1.0);
        assert_eq!(config.pipeline.constants.mu_0, MU_0);
    }

    #[test]
    fn set_values_override_file_and_cli_overrides_both() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [pipeline]
            workers = 16
            write-step = 25
            "#,
        );

        let args = with_config(
            &path,
            &[
                "--workers",
                "4",
                "-S",
                "pipeline.workers=8",
                "-S",
                "pipeline.write-step=50",
                "-S",
                "input.limit=7",
            ],
        );
        let config = build_config(&args, None).unwrap();

        assert_eq!(config.pipeline.workers, 4);
        assert_eq!(config.pipeline.write_step, 50);
        assert_eq!(config.load.limit, RecordLimit::Prefix(7));
    }

    #[test]
    fn cli_record_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[input]\nlimit = 100\n");

        let config =
            build_config(&with_config(&path, &["-n", "5", "--skip-malformed"]), None).unwrap();

        assert_eq!(config.load.limit, RecordLimit::Prefix(5));
        assert_eq!(config.load.malformed, MalformedRecordPolicy::Skip);
    }

    #[test]
    fn unknown_file_key_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[pipeline]\nthreads = 4\n");

        let result = build_config(&with_config(&path, &[]), None);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn malformed_or_unknown_set_values_are_rejected() {
        let result = build_config(&compute_args(&["-S", "pipeline.workers"]), None);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("KEY=VALUE")));

        let result = build_config(&compute_args(&["-S", "pipeline.threads=4"]), None);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("Unsupported")));

        let result = build_config(&compute_args(&["-S", "pipeline.workers=many"]), None);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("pipeline.workers")));
    }

    #[test]
    fn invalid_pipeline_values_surface_as_config_errors() {
        let result = build_config(&compute_args(&["--workers", "0"]), None);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("workers")));

        let result = build_config(&compute_args(&["-S", "constants.spin-factor=0"]), None);
        assert!(matches!(result, Err(CliError::Config(_))));

        let result = build_config(
            &compute_args(&["--pair-queue", "4611686018427387904"]),
            None,
        );
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("must not exceed")));
    }

    #[test]
    fn load_options_follow_record_flags() {
        let options = load_options(&RecordArgs {
            limit: Some(3),
            skip_malformed: false,
        });
        assert_eq!(options.limit, RecordLimit::Prefix(3));
        assert_eq!(options.malformed, MalformedRecordPolicy::Reject);

        assert_eq!(load_options(&RecordArgs::default()), LoadOptions::default());
    }
}

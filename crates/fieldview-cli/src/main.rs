// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod source;

use anyhow::{Context, Result, anyhow};
use config::Config;
use fieldview_app::{DatasetKind, DatasetRegistry, ViewCommand, ViewController};
use source::{DemoSource, JsonFileSource};
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `fieldview --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    if options.print_data_path {
        match resolve_data_path(&options, &config) {
            Some(path) => println!("{}", path.display()),
            None => println!("(none)"),
        }
        return Ok(());
    }

    if let Some(log_path) = config.log_path() {
        logging::init(&log_path, config.log_level())?;
    }

    let mut controller = build_controller(&options, &config)?;
    if options.check_only {
        for kind in DatasetKind::ALL {
            let records = controller.registry().dataset(kind).len();
            info!(dataset = %kind, records, "startup check");
        }
        return Ok(());
    }

    fieldview_tui::run_app(&mut controller)
}

fn resolve_data_path(options: &CliOptions, config: &Config) -> Option<PathBuf> {
    options.data_path.clone().or_else(|| config.data_path())
}

fn load_registry(options: &CliOptions, config: &Config) -> Result<DatasetRegistry> {
    if options.demo {
        return DatasetRegistry::from_source(&mut DemoSource::default());
    }

    let path = resolve_data_path(options, config).ok_or_else(|| {
        anyhow!(
            "no data file configured; pass --data <path>, set [data].path or FIELDVIEW_DATA_PATH, or run with --demo"
        )
    })?;
    DatasetRegistry::from_source(&mut JsonFileSource::new(&path)).with_context(|| {
        format!(
            "load data from {} -- if this path is wrong, set [data].path or FIELDVIEW_DATA_PATH",
            path.display()
        )
    })
}

fn build_controller(options: &CliOptions, config: &Config) -> Result<ViewController> {
    let registry = load_registry(options, config)?;
    let mut controller = ViewController::new(registry);
    if let Some(kind) = config.initial_dataset() {
        controller.dispatch(ViewCommand::SelectDataset(kind));
        controller.dispatch(ViewCommand::ClearStatus);
    }
    info!(
        dataset = %controller.state().active,
        demo = options.demo,
        "datasets loaded"
    );
    Ok(controller)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    data_path: Option<PathBuf>,
    print_config_path: bool,
    print_data_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        data_path: None,
        print_config_path: false,
        print_data_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--data" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--data requires a JSON file path"))?;
                options.data_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-data-path" => {
                options.print_data_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.demo && options.data_path.is_some() {
        return Err(anyhow!(
            "--demo and --data are mutually exclusive; pick one data source"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("fieldview");
    println!("  --config <path>          Use a specific config path");
    println!("  --data <path>            Load datasets from a JSON file");
    println!("  --demo                   Launch with generated demo data");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-data-path        Print resolved data file path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + data, then exit");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, build_controller, parse_cli_args, resolve_data_path};
    use crate::config::Config;
    use anyhow::Result;
    use fieldview_app::DatasetKind;
    use fieldview_testkit::{sample_data_json, write_data_file};
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/fieldview-config.toml")
    }

    fn config_from(content: &str) -> Result<(tempfile::TempDir, Config)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        let config = Config::load(&path)?;
        Ok((temp, config))
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                data_path: None,
                print_config_path: false,
                print_data_path: false,
                demo: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_and_data_paths() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml", "--data", "/srv/data.json"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        assert_eq!(options.data_path, Some(PathBuf::from("/srv/data.json")));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--data"], default_options_path())
            .expect_err("missing data value should fail");
        assert!(error.to_string().contains("--data requires"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_rejects_demo_with_data() {
        let error = parse_cli_args(vec!["--demo", "--data", "x.json"], default_options_path())
            .expect_err("conflicting sources should fail");
        assert!(error.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(!options.print_data_path);
        assert!(!options.demo);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_and_help() -> Result<()> {
        let options = parse_cli_args(vec!["--demo", "-h"], default_options_path())?;
        assert!(options.demo);
        assert!(options.show_help);
        Ok(())
    }

    #[test]
    fn cli_data_path_overrides_config() -> Result<()> {
        let (_temp, config) = config_from("version = 1\n[data]\npath = \"/from/config.json\"\n")?;
        let options = parse_cli_args(vec!["--data", "/from/cli.json"], default_options_path())?;
        assert_eq!(
            resolve_data_path(&options, &config),
            Some(PathBuf::from("/from/cli.json"))
        );
        Ok(())
    }

    #[test]
    fn controller_starts_on_configured_dataset() -> Result<()> {
        let (_data_dir, data_path) = write_data_file(&sample_data_json())?;
        let (_temp, config) = config_from("version = 1\n[ui]\ninitial_dataset = \"pages\"\n")?;
        let options = parse_cli_args(
            vec!["--data".to_owned(), data_path.display().to_string()],
            default_options_path(),
        )?;

        let controller = build_controller(&options, &config)?;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.dataset, DatasetKind::Pages);
        assert_eq!(snapshot.search_field, "slug");
        assert_eq!(snapshot.rows[0].cells, vec!["Home", "/", "09.05.2023"]);
        assert!(snapshot.status_line.is_none());
        Ok(())
    }

    #[test]
    fn demo_controller_needs_no_data_file() -> Result<()> {
        let (_temp, config) = config_from("version = 1\n")?;
        let options = parse_cli_args(vec!["--demo"], default_options_path())?;
        let controller = build_controller(&options, &config)?;
        assert_eq!(controller.snapshot().dataset, DatasetKind::Products);
        assert!(!controller.snapshot().rows.is_empty());
        Ok(())
    }
}

use std::path::Path;
use std::sync::Arc;

use crate::budget::bonus_percent;
use crate::catalog::{
    load_catalog_dir, validate_catalog, Catalog, ValidationSeverity, DEFAULT_CATALOG_DIR,
};
use crate::config::{bind_addr, EngineConfig};
use crate::engine::FleetEngine;
use crate::parallel::{load_scenario, load_scenario_dir, run_scenarios, Scenario, WorkerPool};
use crate::persistence::DurableState;
use crate::report::write_trace_file;
use crate::server;

const USAGE: &str = "usage: wardroom <serve|simulate|validate|curve> [--catalog <dir>]
  serve    [--state <file.json>]
  simulate <scenario.yaml|dir> [--workers <n>] [--csv <file>] [--table]
  validate [catalog-dir]
  curve    <used> <maximum>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Simulate,
    Validate,
    Curve,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("simulate") => Some(Command::Simulate),
        Some("validate") => Some(Command::Validate),
        Some("curve") => Some(Command::Curve),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    match command {
        Command::Serve => handle_serve(args, config),
        Command::Simulate => handle_simulate(args, &config),
        Command::Validate => handle_validate(args),
        Command::Curve => handle_curve(args, &config),
    }
}

fn handle_serve(args: &[String], config: EngineConfig) -> i32 {
    let Some(catalog) = load_catalog(args) else {
        return 1;
    };
    let engine = match flag_value(args, "--state") {
        Some(path) if Path::new(path).exists() => {
            match DurableState::load(path).and_then(|state| state.restore(config, catalog)) {
                Ok(engine) => engine,
                Err(err) => {
                    eprintln!("failed to restore '{path}': {err}");
                    return 1;
                }
            }
        }
        _ => FleetEngine::new(config, catalog),
    };

    let bind_addr = bind_addr();
    match server::run_server(&bind_addr, engine) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_simulate(args: &[String], config: &EngineConfig) -> i32 {
    let Some(target) = positional(args, 2) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let loaded = if Path::new(target).is_dir() {
        load_scenario_dir(target)
    } else {
        load_scenario(target).map(|scenario| vec![scenario])
    };
    let scenarios: Vec<Scenario> = match loaded {
        Ok(scenarios) => scenarios,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    let Some(catalog) = load_catalog(args) else {
        return 1;
    };
    let workers = parse_usize_arg(flag_value(args, "--workers"), "workers", 0);
    let results = run_scenarios(&scenarios, config, catalog, &WorkerPool::with_workers(workers));

    let mut outcomes = Vec::with_capacity(results.len());
    let mut failed = false;
    for result in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                eprintln!("{err}");
                failed = true;
            }
        }
    }

    if let Some(path) = flag_value(args, "--csv") {
        let runs = outcomes
            .iter()
            .map(|outcome| (outcome.name.as_str(), outcome.ticks.as_slice()));
        if let Err(err) = write_trace_file(path, runs) {
            eprintln!("failed to write trace '{path}': {err}");
            return 1;
        }
    }

    if args.iter().any(|arg| arg == "--table") {
        println!("scenario\tticks\tused\tmaximum\tbonus_percent\tfailures\trejected");
        for outcome in &outcomes {
            println!(
                "{}\t{}\t{:.3}\t{:.3}\t{:.3}\t{}\t{}",
                outcome.name,
                outcome.ticks.len(),
                outcome.final_budget.used,
                outcome.final_budget.maximum,
                outcome.final_budget.bonus_percent,
                outcome.hook_failures,
                outcome.rejected_events.len()
            );
        }
    } else {
        match serde_json::to_string_pretty(&outcomes) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize scenario outcomes: {err}");
                return 1;
            }
        }
    }

    if failed {
        1
    } else {
        0
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let dir = positional(args, 2)
        .or_else(|| flag_value(args, "--catalog"))
        .unwrap_or(DEFAULT_CATALOG_DIR);

    let files = match load_catalog_dir(dir) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    let report = validate_catalog(&files);
    for diag in &report.diagnostics {
        match diag.severity {
            ValidationSeverity::Error => eprintln!("- {diag}"),
            _ => println!("- {diag}"),
        }
    }
    if report.has_errors() {
        eprintln!("validation failed: {} error(s)", report.error_count());
        1
    } else {
        println!("validation passed: {dir} ({} file(s))", files.len());
        0
    }
}

fn handle_curve(args: &[String], config: &EngineConfig) -> i32 {
    let (Some(used), Some(maximum)) = (positional(args, 2), positional(args, 3)) else {
        eprintln!("usage: wardroom curve <used> <maximum>");
        return 2;
    };
    let (Ok(used), Ok(maximum)) = (used.parse::<f64>(), maximum.parse::<f64>()) else {
        eprintln!("used and maximum must be numbers");
        return 2;
    };
    println!("{:.3}", bonus_percent(used, maximum, &config.threshold));
    0
}

fn load_catalog(args: &[String]) -> Option<Arc<Catalog>> {
    let dir = flag_value(args, "--catalog").unwrap_or(DEFAULT_CATALOG_DIR);
    match Catalog::load_dir(dir) {
        Ok(catalog) => Some(Arc::new(catalog)),
        Err(err) => {
            eprintln!("failed to load catalog '{dir}': {err}");
            None
        }
    }
}

/// The `index`-th argument, unless it is a flag.
fn positional(args: &[String], index: usize) -> Option<&str> {
    args.get(index)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|index| args.get(index + 1))
        .map(String::as_str)
}

fn parse_usize_arg(raw: Option<&str>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

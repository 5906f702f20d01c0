// Proxy Lab Benchmark Runner v0.1.0: lifecycle invariants under scripted and random clicks
// Monte Carlo runs, Poisson click traffic, seedable PRNG, optional per-step event trace
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- SCRIPT           # Filter by name, label or category
//   cargo run --release --bin bench -- --time-series    # Write JSONL event traces
//   cargo run --release --bin bench -- --seed 42        # Custom base seed
//   RUST_LOG=proxy_lab_engine=debug cargo run --bin bench -- SCRIPT_COLD_MISS --runs 1

mod report;
mod scenarios;
mod monte_carlo;
mod traffic;
mod metrics;
mod time_series;

use report::*;
use scenarios::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::error;
use tracing_subscriber::EnvFilter;

const PASS_THRESHOLD: f64 = 0.9;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    time_series: bool,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        time_series: false,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30).max(1);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let ts_dir = cli.time_series.then(|| std::path::PathBuf::from("bench-results/time-series"));

    println!("\n  Proxy Lab Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<28} {:>5} {:>7} {:>9} {:>8} {:>9} {:>5} {:>7}",
        "Scenario", "Pass%", "Done", "Hit%", "Ignored", "Latency", "Viol", "Time");
    println!("  {}", "-".repeat(88));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();
    let mut invariants = InvariantSummary::default();

    for scenario in &to_run {
        let report = match monte_carlo::run_monte_carlo(scenario, cli.runs, cli.seed, ts_dir.as_deref()) {
            Ok(report) => report,
            Err(e) => {
                error!(scenario = scenario.name, error = %e, "scenario config rejected");
                std::process::exit(1);
            }
        };

        for run in &report.individual_runs {
            invariants.add(&run.violations);
        }

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= PASS_THRESHOLD { "PASS" } else { "FAIL" };

        println!("  {:<28} {:>4}% {:>7.1} {:>8.1}% {:>8.1} {:>7.1}ms {:>5.0} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.completed.mean,
            report.hit_ratio.mean * 100.0,
            report.ignored_submits.mean,
            report.avg_latency_ms.mean,
            report.violations.max,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(88));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    let verdict = |n: u32| if n == 0 { "HOLDS".to_string() } else { format!("{} violation(s)", n) };
    println!("  Invariants:");
    println!("    Single flight:        {}", verdict(invariants.single_flight));
    println!("    TTL countdown:        {}", verdict(invariants.ttl_countdown));
    println!("    Write-through:        {}", verdict(invariants.write_through));
    println!("    Purge:                {}", verdict(invariants.purge));
    println!("    Entry consistency:    {}\n", verdict(invariants.inconsistent_entry));

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);
    let invariants_hold = invariants.all_hold();

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        invariants,
        scenarios: mc_reports,
    };

    let dir = std::path::Path::new("bench-results");
    let path = dir.join(format!("bench-{}.json", timestamp));
    let written = std::fs::create_dir_all(dir)
        .and_then(|_| serde_json::to_string_pretty(&report).map_err(std::io::Error::from))
        .and_then(|json| std::fs::write(&path, json));
    match written {
        Ok(()) => println!("  Results saved to: {}\n", path.display()),
        Err(e) => error!(path = %path.display(), error = %e, "failed to write bench report"),
    }

    if failed > 0 || !invariants_hold {
        std::process::exit(1);
    }
}

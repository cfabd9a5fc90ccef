//! portscout binary entry point.

use anyhow::{bail, Context};
use clap::Parser;
use console::style;
use portscout::cli::{self, Args};
use portscout::scanner::{EngineConfig, ScanEngine};
use portscout::{output, ports};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --verbose surfaces per-port debug events (closed ports, probe errors).
    let default_filter = if args.verbose {
        "portscout=debug"
    } else {
        "portscout=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let port_list = ports::expand(&args.ports);
    if port_list.is_empty() {
        bail!("invalid port range: {}", args.ports);
    }

    let target = cli::resolve_target(&args.host).await?;

    output::print_scan_header(
        &args.host,
        args.protocol,
        &args.ports,
        port_list.len(),
        args.workers,
        args.timeout,
    );

    let show_progress = !args.no_progress;
    let mut config = EngineConfig::new(target, port_list)
        .with_workers(args.workers)
        .with_timeout(Duration::from_millis(args.timeout));
    if let Some(rate) = args.rate {
        config = config.with_rate(rate);
    }
    if show_progress {
        config = config.with_progress();
    }

    let engine = ScanEngine::for_protocol(config, args.protocol);

    // Ctrl-C stops the dispatcher; in-flight probes finish or time out.
    let cancel = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Cancelling scan...", style("[!]").red().bold());
            cancel.cancel();
        }
    });

    let outcome = engine.run().await.context("scan failed")?;

    println!("{}", output::separator());

    if outcome.findings.is_empty() {
        println!("{} No open ports found", style("[*]").cyan());
    } else {
        println!(
            "{} Found {} open port(s)",
            style("[+]").green().bold(),
            outcome.findings.len()
        );
        println!();
        for finding in &outcome.findings {
            output::print_finding(finding);
        }

        let path = output::save_findings(&outcome.findings, args.format, &args.output)?;
        println!(
            "{} Results saved to: {}",
            style("[+]").green().bold(),
            path.display()
        );
    }

    if args.report {
        let report_path = PathBuf::from(format!("{}_report.json", args.output));
        output::save_report(
            &outcome.findings,
            &outcome.stats,
            &args.host,
            args.protocol,
            &report_path,
        )?;
        println!(
            "{} Report saved to: {}",
            style("[+]").green().bold(),
            report_path.display()
        );
    }

    output::print_stats(&outcome.stats);

    Ok(())
}

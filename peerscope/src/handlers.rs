use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use peerscope_core::{
    ExploreOptions, ExploreProgressCallback, ExploreSummary, Explorer, ExplorerConfig,
    InstanceClient, InstanceProfile, ReportFormat, execute_explore, parse_host, render_report,
    save_report,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

// Helper functions for the explore handler

/// Collect seeds from positional hosts and an optional hosts file
pub fn load_hosts_from_source(
    hosts: &[String],
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>> {
    let mut seeds = hosts.to_vec();
    if let Some(path) = hosts_file {
        seeds.extend(load_hosts_from_file(path)?);
    }

    if seeds.is_empty() {
        bail!("Either a HOST or --hosts-file must be provided");
    }
    Ok(seeds)
}

/// Load seed hosts from a newline-delimited file. Blank lines and `#`
/// comments are skipped, invalid hosts are skipped with a warning.
pub fn load_hosts_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let hosts: Vec<String> = content.lines().filter_map(parse_host_line).collect();

    if hosts.is_empty() {
        bail!("No valid hosts found in {}", path.display());
    }

    Ok(hosts)
}

/// Parse a single hosts-file line into a host key
pub fn parse_host_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    match parse_host(line) {
        Ok(host) => Some(host),
        Err(_) => {
            eprintln!("{} Skipping invalid host '{}'", "⚠".yellow(), line);
            None
        }
    }
}

/// Map `-v` occurrences onto a log level. Quiet by default so reports on
/// stdout stay readable.
pub fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_max_level(log_level(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn build_explorer_config(
    exclusions: &[String],
    no_default_exclusions: bool,
    seed: Option<u64>,
) -> ExplorerConfig {
    let mut config = ExplorerConfig::default();
    if no_default_exclusions {
        config = config.without_exclusions();
    }
    for pattern in exclusions {
        config = config.with_exclusion(pattern.as_str());
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    config
}

fn build_client(args: &ArgMatches) -> Result<InstanceClient> {
    let timeout = *args.get_one::<u64>("timeout").unwrap_or(&10);
    let client = InstanceClient::with_timeout(timeout).context("Failed to build HTTP client")?;
    Ok(if args.get_flag("plain-http") {
        client.with_plain_http()
    } else {
        client
    })
}

pub fn print_banner() {
    eprintln!(
        "{} {}",
        "peerscope".bright_magenta().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    eprintln!("{}", "incremental federation explorer".dimmed());
    eprintln!();
}

fn divider() -> ColoredString {
    "═".repeat(60).bright_blue().bold()
}

/// Decoration goes to stderr; stdout carries only the report.
fn print_divider() {
    eprintln!("{}", divider());
}

pub async fn handle_explore(sub_matches: &ArgMatches) -> Result<ExploreSummary> {
    let hosts: Vec<String> = sub_matches
        .get_many::<String>("HOST")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&1);
    let concurrency = *sub_matches.get_one::<usize>("concurrency").unwrap_or(&8);
    let max_expansions = *sub_matches.get_one::<usize>("max-expansions").unwrap_or(&50);
    let exclusions: Vec<String> = sub_matches
        .get_many::<String>("exclude")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let no_default_exclusions = sub_matches.get_flag("no-default-exclusions");
    let seed = sub_matches.get_one::<u64>("seed").copied();
    let output = sub_matches.get_one::<String>("output");
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let seeds = load_hosts_from_source(&hosts, hosts_file)?;
    let config = build_explorer_config(&exclusions, no_default_exclusions, seed);
    let explorer = Explorer::new(build_client(sub_matches)?, config)?;

    print_divider();
    eprintln!("{}", "  FEDERATION EXPLORE".bright_white().bold());
    print_divider();
    eprintln!(
        "{} Seeds: {}",
        "→".blue(),
        seeds.len().to_string().bright_white()
    );
    eprintln!(
        "{} Depth: {}  Concurrency: {}  Budget: {}",
        "→".blue(),
        depth.to_string().bright_white(),
        concurrency.to_string().bright_white(),
        max_expansions.to_string().bright_white()
    );
    eprintln!(
        "{} Exclusion patterns: {}",
        "→".blue(),
        explorer.filter().len().to_string().bright_white()
    );
    eprintln!();

    let options = ExploreOptions {
        seeds,
        depth,
        concurrency,
        max_expansions,
        show_progress: true,
    };

    let progress_callback: ExploreProgressCallback = Arc::new(|msg: String| {
        if msg.starts_with("[!]") {
            eprintln!("{}", msg.yellow());
        }
    });

    let summary = execute_explore(&explorer, options, Some(progress_callback)).await?;

    eprintln!(
        "\n{} Explore complete! {} succeeded, {} failed, {} skipped\n",
        "✓".green().bold(),
        summary.succeeded.len().to_string().green(),
        summary.failed.len().to_string().red(),
        summary.skipped
    );

    let snapshot = explorer.snapshot().await;
    let report = render_report(&snapshot, Some(&summary), format)?;

    match output {
        Some(path) => {
            let expanded = shellexpand::tilde(path);
            let path = Path::new(expanded.as_ref());
            save_report(path, &report)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            eprintln!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            );
        }
        None => print!("{}", report),
    }

    Ok(summary)
}

pub async fn handle_inspect(sub_matches: &ArgMatches) -> Result<()> {
    let Some(host) = sub_matches.get_one::<String>("HOST") else {
        bail!("A HOST to inspect must be provided");
    };

    let explorer = Explorer::new(build_client(sub_matches)?, ExplorerConfig::default())?;
    let profile = explorer.inspect(host).await?;
    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &InstanceProfile) {
    println!("{}", divider());
    let title = if profile.title.is_empty() {
        profile.uri.as_str()
    } else {
        profile.title.as_str()
    };
    println!("  {}", title.bright_white().bold());
    println!("{}", divider());

    println!("{} {}", "URI:".blue(), profile.uri);
    if let Some(ref version) = profile.version {
        println!("{} {}", "Version:".blue(), version);
    }
    if let Some(ref email) = profile.email {
        println!("{} {}", "Contact:".blue(), email);
    }
    if let Some(stats) = profile.stats {
        println!(
            "{} {} users, {} posts, {} known domains",
            "Stats:".blue(),
            stats.user_count.to_string().cyan(),
            stats.status_count.to_string().cyan(),
            stats.domain_count.to_string().cyan()
        );
    }
    if !profile.languages.is_empty() {
        println!("{} {}", "Languages:".blue(), profile.languages.join(", "));
    }
    if let Some(ref thumbnail) = profile.thumbnail {
        println!("{} {}", "Thumbnail:".blue(), thumbnail);
    }
    if !profile.description.is_empty() {
        println!();
        println!("{}", profile.description);
    }
    println!();
}

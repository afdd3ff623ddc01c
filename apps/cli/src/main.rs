#![deny(warnings)]

//! Headless calculator: reads event quantities from the command line and
//! prints the reward breakdown, summary and stellarite spending plan.
//!
//! Usage:
//!   tasha [--config FILE] [--budget N] [--current N] [--days N]
//!         [--pack ID=QTY]... [--json] [CATEGORY=AMOUNT]...

use anyhow::{Context, Result};
use chrono::Local;
use std::path::PathBuf;
use tasha_config::EventTableFile;
use tasha_core::{CategoryState, EventConfig};
use tasha_runtime::{recompute, EventSummary, PackPurchase, PlayerInputs};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    amounts: Vec<(String, u64)>,
    packs: Vec<(String, u64)>,
    budget: u64,
    current: u64,
    days: Option<u64>,
    json: bool,
    version: bool,
}

/// Lenient quantity parsing: negatives clamp to zero, numbers past `u64::MAX`
/// clamp to the maximum, anything non-numeric reads as zero.
fn parse_count(s: &str) -> u64 {
    let s = s.trim();
    if let Ok(v) = s.parse::<u64>() {
        return v;
    }
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    if negative {
        0
    } else {
        u64::MAX
    }
}

fn parse_pair(s: &str) -> Option<(String, u64)> {
    let (key, value) = s.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), parse_count(value)))
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Args {
    let mut out = Args::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => out.config = it.next().map(PathBuf::from),
            "--budget" => out.budget = it.next().map(|s| parse_count(&s)).unwrap_or(0),
            "--current" => out.current = it.next().map(|s| parse_count(&s)).unwrap_or(0),
            "--days" => out.days = it.next().map(|s| parse_count(&s)),
            "--pack" => {
                if let Some(p) = it.next().as_deref().and_then(parse_pair) {
                    out.packs.push(p);
                }
            }
            "--json" => out.json = true,
            "--version" | "-V" => out.version = true,
            other => match parse_pair(other) {
                Some(pair) => out.amounts.push(pair),
                None => warn!(argument = other, "ignoring unrecognized argument"),
            },
        }
    }
    out
}

fn group(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn render(event: &EventConfig, s: &EventSummary) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} (v{})", event.name, event.version));
    lines.push(format!("{:<10} {:>8} {:>8} {:>8}", "category", "amount", "PP", "tasha"));
    for b in &s.breakdown {
        lines.push(format!(
            "{:<10} {:>8} {:>8} {:>8}",
            b.category.as_str(),
            group(b.raw_amount),
            group(b.conversion.points),
            group(b.conversion.reward)
        ));
    }
    lines.push(String::new());
    lines.push(format!("Total PP: {}", group(s.total_points)));
    if s.points_overflow {
        lines.push(format!(
            "Warning: PP overflow (> {})",
            group(event.points_cap)
        ));
    }
    lines.push(format!("Base tasha: {}", group(s.base_reward)));
    lines.push(format!("Daily tasha: {}", group(s.daily_reward)));
    lines.push(format!("Package tasha: {}", group(s.package_reward)));
    for p in s.packs.iter().filter(|p| p.quantity > 0) {
        let cost = if p.premium_cost > 0 {
            format!("{} stellarite -> ", group(p.premium_cost))
        } else {
            String::new()
        };
        lines.push(format!("  {} x{}: {}+{} tasha", p.id, p.quantity, cost, group(p.reward)));
    }
    lines.push(format!("Current tasha: {}", group(s.current_reward)));
    lines.push("-".repeat(38));
    lines.push(format!("Total possible: {}", group(s.total_possible)));
    lines.push(String::new());
    lines.push("Spend plan:".to_string());
    lines.push(s.plan.to_string());
    lines.join("\n")
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1));
    if args.version {
        println!(
            "tasha {} ({} {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }

    let event = match &args.config {
        Some(path) => EventTableFile::open(path)
            .with_context(|| format!("loading event table {}", path.display()))?
            .into_event(),
        None => EventConfig::reference(),
    };
    let days_left = args
        .days
        .or_else(|| event.days_left(Local::now().date_naive()))
        .unwrap_or(0);
    info!(event = %event.name, days_left, budget = args.budget, "calculating");

    let inputs = PlayerInputs {
        amounts: args
            .amounts
            .iter()
            .map(|(id, n)| CategoryState::new(id.as_str(), *n))
            .collect(),
        premium_budget: args.budget,
        current_reward: args.current,
        days_left,
        packs: args
            .packs
            .iter()
            .map(|(id, quantity)| PackPurchase {
                id: id.clone(),
                quantity: *quantity,
            })
            .collect(),
    };
    let summary = recompute(&event, &inputs)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render(&event, &summary));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_pairs() {
        let args = parse_args(argv(&[
            "--budget", "1000", "skill=200", "--pack", "pack-499=2", "rune=-5", "--json",
        ]));
        assert_eq!(args.budget, 1000);
        assert_eq!(
            args.amounts,
            vec![("skill".to_string(), 200), ("rune".to_string(), 0)]
        );
        assert_eq!(args.packs, vec![("pack-499".to_string(), 2)]);
        assert!(args.json);
        assert_eq!(args.days, None);
    }

    #[test]
    fn counts_are_sanitized() {
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count(" 7 "), 7);
        assert_eq!(parse_count("-3"), 0);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count("12abc"), 0);
        assert_eq!(parse_count("-"), 0);
        assert_eq!(parse_count("+15"), 15);
        assert_eq!(parse_count("99999999999999999999999"), u64::MAX);
        assert_eq!(parse_count("-99999999999999999999999"), 0);
        assert_eq!(parse_pair("=5"), None);
        assert_eq!(parse_pair("wood"), None);
    }

    #[test]
    fn loads_table_from_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("event.json");
        let mut event = EventConfig::reference();
        event.daily_reward = 100;
        std::fs::write(&path, serde_json::to_string(&event).unwrap()).unwrap();
        let args = parse_args(argv(&["--config", path.to_str().unwrap()]));
        let loaded = EventTableFile::open(args.config.unwrap()).unwrap().into_event();
        assert_eq!(loaded.daily_reward, 100);
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(group(0), "0");
        assert_eq!(group(999), "999");
        assert_eq!(group(9_000), "9,000");
        assert_eq!(group(1_234_567), "1,234,567");
    }

    #[test]
    fn renders_summary_with_overflow_and_plan() {
        let event = EventConfig::reference();
        let inputs = PlayerInputs {
            amounts: vec![CategoryState::new("skill", 1000), CategoryState::new("stellar", 190)],
            premium_budget: 1_000,
            ..PlayerInputs::default()
        };
        let s = recompute(&event, &inputs).unwrap();
        let text = render(&event, &s);
        assert!(text.contains("Total PP: 10,000"));
        assert!(text.contains("Warning: PP overflow (> 9,000)"));
        assert!(text.contains("First: stellar: 10 pulls -> +50 tasha"));
    }
}

use anyhow::Context;
use base64::{engine::general_purpose, Engine as _};
use clap::{Arg, Command};
use log::LevelFilter;
use qr_sentinel::{
    BatchSummary, QrAnalyzer, QrSecurityAnalysis, RiskLevel, ThreatDatabase,
    ThreatDatabaseConfig,
};
use std::io::{self, BufRead};
use std::process;

fn build_cli() -> Command {
    Command::new("qr-sentinel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Security analysis for decoded QR code payloads")
        .long_about("qr-sentinel classifies decoded QR payload text and scores it for:\n\
                    • phishing URLs, lookalike brands, shorteners and homograph hosts\n\
                    • malformed or high-value UPI payment requests\n\
                    • open or weakly encrypted Wi-Fi credentials\n\
                    • malformed contact cards and scam wording\n\n\
                    --file and stdin hold one payload per line. Multi-line payloads\n\
                    such as vCards must be passed as a PAYLOAD argument or base64-encoded\n\
                    with --base64.")
        .arg(
            Arg::new("payload")
                .value_name("PAYLOAD")
                .help("Payload text to analyze (reads --file or stdin when omitted)")
                .num_args(0..)
                .conflicts_with("file"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Read payloads from a file, one per line (see --base64 for multi-line payloads)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("base64")
                .long("base64")
                .help("Payloads are base64-encoded raw bytes, one per line")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("threat-db")
                .short('t')
                .long("threat-db")
                .value_name("FILE")
                .help("Threat database YAML file (built-in database when omitted)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-threat-db")
                .long("generate-threat-db")
                .value_name("FILE")
                .help("Write the built-in threat database as YAML and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-threat-db")
                .long("test-threat-db")
                .help("Validate the threat database and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON analysis per line")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fail-level")
                .long("fail-level")
                .value_name("LEVEL")
                .help("Exit with status 2 if any payload reaches this level (safe, low, medium, high, critical)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging and show the per-check breakdown")
                .action(clap::ArgAction::SetTrue),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    let verbose = matches.get_flag("verbose");
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-threat-db") {
        generate_default_threat_db(generate_path);
        return;
    }

    let fail_level = match matches.get_one::<String>("fail-level") {
        Some(value) => match RiskLevel::parse(value) {
            Some(level) => Some(level),
            None => {
                eprintln!("❌ Unknown risk level: {value}");
                process::exit(1);
            }
        },
        None => None,
    };

    let db = match load_threat_db(matches.get_one::<String>("threat-db")) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Error loading threat database: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-threat-db") {
        let summary = db.summary();
        println!("🔍 Threat database");
        println!("  Malicious domains: {}", summary.malicious_domains);
        println!("  Trusted domains:   {}", summary.trusted_domains);
        println!("  Shortener domains: {}", summary.shortener_domains);
        println!("  Phishing patterns: {}", summary.phishing_patterns);
        println!("  Keywords:          {}", summary.keywords);
        println!("✅ All phishing patterns compiled successfully.");
        return;
    }

    let payloads = match collect_payloads(&matches) {
        Ok(payloads) => payloads,
        Err(e) => {
            eprintln!("❌ Error reading payloads: {e:#}");
            process::exit(1);
        }
    };

    let analyzer = QrAnalyzer::new(db);
    let analyses = analyzer.analyze_batch(&payloads);
    let summary = BatchSummary::from_analyses(&analyses);

    if matches.get_flag("json") {
        for analysis in &analyses {
            match serde_json::to_string(analysis) {
                Ok(line) => println!("{line}"),
                Err(e) => {
                    eprintln!("❌ Failed to serialize analysis: {e}");
                    process::exit(1);
                }
            }
        }
    } else {
        for (payload, analysis) in payloads.iter().zip(&analyses) {
            print_report(payload, analysis, verbose);
        }
        if analyses.len() > 1 {
            print_summary(&summary);
        }
    }

    if let Some(level) = fail_level {
        let flagged = summary.at_least(level);
        if flagged > 0 {
            log::warn!("{flagged} payload(s) at or above {level}");
            process::exit(2);
        }
    }
}

fn load_threat_db(path: Option<&String>) -> anyhow::Result<ThreatDatabase> {
    match path {
        Some(path) => ThreatDatabase::load_from_file(path),
        None => {
            log::debug!("No threat database given, using built-in database");
            Ok(ThreatDatabase::builtin())
        }
    }
}

fn generate_default_threat_db(path: &str) {
    let result = serde_yaml::to_string(&ThreatDatabaseConfig::default())
        .context("Failed to serialize threat database")
        .and_then(|yaml| {
            std::fs::write(path, yaml).with_context(|| format!("Failed to write {path}"))
        });

    match result {
        Ok(()) => {
            println!("Default threat database written to: {path}");
            println!("Edit the domain lists and patterns, then pass it with --threat-db.");
        }
        Err(e) => {
            eprintln!("Error writing threat database: {e:#}");
            process::exit(1);
        }
    }
}

fn collect_payloads(matches: &clap::ArgMatches) -> anyhow::Result<Vec<String>> {
    let raw: Vec<String> = if let Some(values) = matches.get_many::<String>("payload") {
        values.cloned().collect()
    } else if let Some(path) = matches.get_one::<String>("file") {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {path}"))?;
        non_empty_lines(content.lines())
    } else {
        let stdin = io::stdin();
        let lines = stdin
            .lock()
            .lines()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read stdin")?;
        non_empty_lines(lines.iter().map(String::as_str))
    };

    if matches.get_flag("base64") {
        raw.iter().map(|p| decode_base64_payload(p)).collect()
    } else {
        Ok(raw)
    }
}

fn non_empty_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn decode_base64_payload(encoded: &str) -> anyhow::Result<String> {
    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .with_context(|| format!("Invalid base64 payload: {}", truncate_string(encoded, 40)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn print_report(payload: &str, analysis: &QrSecurityAnalysis, verbose: bool) {
    let marker = match analysis.risk_level {
        RiskLevel::Safe => "✅",
        RiskLevel::Low => "🟢",
        RiskLevel::Medium => "🟡",
        RiskLevel::High => "🟠",
        RiskLevel::Critical => "🔴",
    };

    println!("{} {}", marker, truncate_string(payload, 72));
    println!(
        "   Type: {}  Score: {}  Level: {}",
        analysis.data_type, analysis.risk_score, analysis.risk_level
    );
    if let Some(reputation) = analysis.domain_reputation {
        println!(
            "   Reputation: {:?}  Phishing: {}  Malicious: {}  Redirect: {}",
            reputation, analysis.is_phishing, analysis.is_malicious, analysis.has_redirect
        );
    }
    for threat in &analysis.threats {
        println!("   • {threat}");
    }
    if verbose {
        for check in &analysis.checks {
            println!("   [{}] +{}", check.check_name, check.score);
        }
    }
    println!();
}

fn print_summary(summary: &BatchSummary) {
    println!("📊 {} payload(s) analyzed, {} flagged as phishing", summary.total, summary.phishing);
    for level in [
        RiskLevel::Safe,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ] {
        println!("  {:<9} {}", level.as_str(), summary.count(level));
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

// src/cli.rs
//! Command line front end: settings, then `cycles` poll cycles printed to stdout.

use std::{io, path::PathBuf, thread, time::Duration};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};

use crate::{
    config::{consts::DEFAULT_SETTINGS_FILE, options::env_flag, Settings},
    core::net::{HttpFetcher, RetryPolicy},
    logging,
    progress::Progress,
    publish::{OutputFormat, Publisher, WriterPublisher},
    scrape::{read_data, CycleOutcome},
    store::{extract_entity_data, filter_empty_values, retain_unit},
    value::{normalize_unit, Unit},
};

#[derive(Parser, Debug, Clone)]
#[command(name = "uvr_scrape", version, about = "Read a UVR controller's schematic pages and print normalized values")]
pub struct Args {
    /// Settings file (JSON)
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    /// Configuration export of the controller (XML)
    #[arg(long)]
    pub xml: Option<PathBuf>,

    #[arg(long)]
    pub ip: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Debug logging for this crate
    #[arg(long)]
    pub debug: bool,

    /// Number of cycles; 0 runs until interrupted
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Seconds between cycles
    #[arg(long)]
    pub interval: Option<u64>,

    /// Pages fetched in parallel
    #[arg(long)]
    pub workers: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Only print values with this unit (e.g. "°C", "switch", "%")
    #[arg(long)]
    pub unit: Option<String>,

    /// Also print entries without a value
    #[arg(long)]
    pub keep_empty: bool,

    /// Save every fetched page into this directory
    #[arg(long, value_name = "DIR")]
    pub dump_html: Option<PathBuf>,

    /// Header line for CSV/TSV
    #[arg(long)]
    pub headers: bool,
}

impl Args {
    /// Flags win over file, environment and defaults.
    pub fn apply(&self, mut s: Settings) -> Settings {
        if let Some(v) = &self.xml { s.device.xml_filename = v.clone(); }
        if let Some(v) = &self.ip { s.device.ip = v.clone(); }
        if let Some(v) = &self.user { s.device.user = v.clone(); }
        if let Some(v) = &self.password { s.device.password = v.clone(); }
        if let Some(v) = self.cycles { s.poll.cycles = v; }
        if let Some(v) = self.interval { s.poll.interval = Duration::from_secs(v); }
        if let Some(v) = self.workers { s.poll.workers = v.max(1); }
        s.debug |= self.debug;
        s
    }

    /// Whether debug logging is wanted before any settings file is read.
    pub fn debug_requested(&self, env: impl Fn(&str) -> Option<String>) -> bool {
        self.debug || env_flag(env("UVR_DEBUG"))
    }

    pub fn unit_filter(&self) -> Option<Unit> {
        normalize_unit(self.unit.as_deref())
    }
}

/// Progress sink that forwards to the log.
struct LogProgress;

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        log::debug!("cycle start: {total} pages");
    }

    fn page_failed(&mut self, page: usize, reason: &str) {
        log::debug!("page {page} skipped: {reason}");
    }
}

/// Post-processing between the cycle and the publisher.
pub fn shape(mut outcome: CycleOutcome, keep_empty: bool, unit: Option<&Unit>) -> CycleOutcome {
    for page in &outcome.pages {
        log::debug!("page {} values: {:?}", page.page, extract_entity_data(page, unit));
    }
    if !keep_empty {
        outcome.pages = filter_empty_values(outcome.pages);
    }
    if let Some(u) = unit {
        outcome.pages = retain_unit(outcome.pages, u);
    }
    outcome
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug_requested(|name| std::env::var(name).ok()));

    let settings = Settings::load(&args.config).wrap_err("loading settings")?;
    let settings = args.apply(settings);
    settings.validate()?;

    log::info!(
        "{}: polling {} with {} ({} worker(s), every {}s)",
        settings.device_name,
        settings.device.ip,
        settings.device.xml_filename.display(),
        settings.poll.workers,
        settings.poll.interval.as_secs()
    );

    let fetcher = HttpFetcher::new(
        &settings.device.ip,
        &settings.device.user,
        &settings.device.password,
        RetryPolicy::default(),
    )?
    .with_dump_dir(args.dump_html.clone());

    let unit = args.unit_filter();
    let mut publisher = WriterPublisher::new(io::stdout().lock(), args.format).with_headers(args.headers);
    let mut progress = LogProgress;

    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        let outcome = read_data(&settings.device.xml_filename, &fetcher, settings.poll.workers, Some(&mut progress));
        let outcome = shape(outcome, args.keep_empty, unit.as_ref());
        if let Err(e) = publisher.publish(&outcome) {
            log::error!("cycle {cycle}: publishing failed: {e}");
        }

        if settings.poll.cycles != 0 && cycle >= settings.poll.cycles {
            break;
        }
        thread::sleep(settings.poll.interval);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsFile;
    use crate::scrape::FetchStatus;
    use crate::store::PageResult;
    use crate::value::{CanonicalUnit, Observation};

    #[test]
    fn flags_override_settings() {
        let args = Args::parse_from(["uvr_scrape", "--ip", "10.1.1.1", "--cycles", "1", "--workers", "0", "--debug"]);
        let s = args.apply(Settings::default());
        assert_eq!(s.device.ip, "10.1.1.1");
        assert_eq!(s.poll.cycles, 1);
        assert_eq!(s.poll.workers, 1);
        assert!(s.debug);
        assert_eq!(s.device.user, "user");
    }

    #[test]
    fn ip_flag_fills_empty_configured_ip() {
        let f = SettingsFile::parse(r#"{"uvr": {"ip": ""}}"#, std::path::Path::new("config.json")).unwrap();
        let from_file = Settings::resolve(f, |_| None).unwrap();
        assert!(from_file.validate().is_err());

        let args = Args::parse_from(["uvr_scrape", "--ip", "192.168.1.20"]);
        let s = args.apply(from_file);
        assert!(s.validate().is_ok());
        assert_eq!(s.device.ip, "192.168.1.20");
    }

    #[test]
    fn debug_from_flag_or_environment() {
        let quiet = Args::parse_from(["uvr_scrape"]);
        assert!(!quiet.debug_requested(|_| None));
        assert!(quiet.debug_requested(|name| (name == "UVR_DEBUG").then(|| s!("true"))));
        assert!(Args::parse_from(["uvr_scrape", "--debug"]).debug_requested(|_| None));
    }

    #[test]
    fn format_and_unit_flags() {
        let args = Args::parse_from(["uvr_scrape", "--format", "json", "--unit", "c"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.unit_filter(), Some(Unit::from(CanonicalUnit::Celsius)));
    }

    #[test]
    fn shape_filters_empty_and_unit() {
        let mut p = PageResult::new(0);
        p.insert("T1", Observation::with_unit(Some(20.0), CanonicalUnit::Celsius));
        p.insert("P1", Observation::with_unit(Some(1.0), CanonicalUnit::Switch));
        p.insert("T2", Observation::with_unit(None, CanonicalUnit::Celsius));
        let outcome = CycleOutcome { pages: vec![p], status: FetchStatus::default() };

        let all = shape(outcome.clone(), true, None);
        assert_eq!(all.pages[0].len(), 3);

        let celsius = shape(outcome, false, Some(&Unit::from(CanonicalUnit::Celsius)));
        assert_eq!(celsius.pages[0].names().collect::<Vec<_>>(), vec!["T1"]);
    }
}

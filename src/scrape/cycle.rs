// src/scrape/cycle.rs
//! One poll cycle: every page of the device, schema + fetch + extract + reconcile.
//!
//! A failing page is recorded and skipped; only an unusable configuration
//! export stops the cycle before any page is attempted.

use std::{
    path::Path,
    sync::{atomic::{AtomicBool, AtomicUsize, Ordering}, mpsc},
    thread,
};

use serde::Serialize;

use crate::{
    core::net::Fetcher,
    error::{ConfigError, PageError},
    progress::Progress,
    specs::{fragments::extract_fragments, schema::{read_schema, ConfigTree}},
    store::PageResult,
};
use super::reconcile::combine_html_xml;

/// Per-cycle summary. Rebuilt every cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FetchStatus {
    pub pages_attempted: usize,
    pub pages_successful: usize,
    pub pages_failed: usize,
    pub failed_pages: Vec<usize>,
    pub all_successful: bool,
    /// Set when the configuration export could not be loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CycleOutcome {
    /// Successful pages in page order.
    pub pages: Vec<PageResult>,
    pub status: FetchStatus,
}

impl CycleOutcome {
    fn config_failure(err: &ConfigError) -> Self {
        let status = FetchStatus { config_error: Some(err.to_string()), ..Default::default() };
        Self { pages: Vec::new(), status }
    }

    fn record(&mut self, page: usize, res: Result<PageResult, PageError>, progress: Option<&mut (dyn Progress + '_)>) {
        self.status.pages_attempted += 1;
        match res {
            Ok(result) => {
                self.status.pages_successful += 1;
                self.pages.push(result);
                if let Some(p) = progress {
                    p.page_done(page);
                }
            }
            Err(e) => {
                log::error!("page {page}: {e}");
                self.status.pages_failed += 1;
                self.status.failed_pages.push(page);
                if let Some(p) = progress {
                    p.page_failed(page, &e.to_string());
                }
            }
        }
    }

    fn seal(mut self) -> Self {
        self.pages.sort_by_key(|p| p.page);
        self.status.failed_pages.sort_unstable();
        self.status.all_successful = self.status.pages_failed == 0;
        log::info!(
            "cycle done: {}/{} pages ok, failed {:?}",
            self.status.pages_successful,
            self.status.pages_attempted,
            self.status.failed_pages
        );
        self
    }
}

/// Schema, markup, fragments and reconciliation for one page.
pub fn process_page(tree: &ConfigTree, page: usize, fetcher: &dyn Fetcher) -> Result<PageResult, PageError> {
    let schema = read_schema(tree, page)?;
    let markup = fetcher.fetch(page)?;
    let fragments = extract_fragments(&markup);
    log::debug!("page {page}: fragments at {:?}", fragments.positions);
    Ok(combine_html_xml(&schema, &fragments).result)
}

/// Pages `0..page_count` one after another.
pub fn run_cycle(
    tree: &ConfigTree,
    fetcher: &dyn Fetcher,
    mut progress: Option<&mut dyn Progress>,
) -> CycleOutcome {
    let total = tree.page_count();
    if let Some(p) = progress.as_deref_mut() {
        p.begin(total);
    }

    let mut outcome = CycleOutcome::default();
    for page in 0..total {
        if progress.as_deref().is_some_and(|p| p.cancelled()) {
            log::info!("cycle abandoned before page {page}");
            break;
        }
        log::debug!("page {page}/{total}");
        let res = process_page(tree, page, fetcher);
        outcome.record(page, res, progress.as_deref_mut());
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    outcome.seal()
}

/// Same as [`run_cycle`] with up to `workers` pages in flight.
/// Output stays in page order whatever the completion order.
pub fn run_cycle_with_workers(
    tree: &ConfigTree,
    fetcher: &dyn Fetcher,
    workers: usize,
    mut progress: Option<&mut dyn Progress>,
) -> CycleOutcome {
    let total = tree.page_count();
    let workers = workers.min(total).max(1);
    if workers == 1 {
        return run_cycle(tree, fetcher, progress);
    }

    if let Some(p) = progress.as_deref_mut() {
        p.begin(total);
    }

    let counter = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);
    let (res_tx, res_rx) = mpsc::channel::<(usize, Result<PageResult, PageError>)>();
    let mut outcome = CycleOutcome::default();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = res_tx.clone();
            let (counter, stop) = (&counter, &stop);
            scope.spawn(move || loop {
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                let page = counter.fetch_add(1, Ordering::Relaxed);
                if page >= total {
                    break;
                }
                let _ = tx.send((page, process_page(tree, page, fetcher)));
            });
        }
        drop(res_tx); // main thread is sole receiver now

        for (page, res) in res_rx {
            outcome.record(page, res, progress.as_deref_mut());
            if progress.as_deref().is_some_and(|p| p.cancelled()) && !stop.swap(true, Ordering::Relaxed) {
                log::info!("cycle abandoned after page {page}");
            }
        }
    });

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    outcome.seal()
}

/// Load the export at `xml_path` and run one cycle against `fetcher`.
pub fn read_data(
    xml_path: &Path,
    fetcher: &dyn Fetcher,
    workers: usize,
    progress: Option<&mut dyn Progress>,
) -> CycleOutcome {
    match ConfigTree::load(xml_path) {
        Ok(tree) => run_cycle_with_workers(&tree, fetcher, workers, progress),
        Err(e) => {
            log::error!("failed to load configuration export {}: {e}", xml_path.display());
            CycleOutcome::config_failure(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    fn tree(pages: usize) -> ConfigTree {
        let body: String = (0..pages)
            .map(|i| format!(r#"<Seite_{i}><Objekte><Objekt_0 Bezeichnung="p: V{i}" Objekt_Typ="Wert_Obj"/></Objekte></Seite_{i}>"#))
            .collect();
        ConfigTree::parse(&format!("<P><Seiten>{body}</Seiten></P>")).unwrap()
    }

    #[test]
    fn empty_device_is_successful() {
        let fetch = |_: usize| -> Result<String, FetchError> { Ok(s!()) };
        let out = run_cycle(&tree(0), &fetch, None);
        assert!(out.pages.is_empty());
        assert!(out.status.all_successful);
        assert_eq!(out.status.pages_attempted, 0);
    }

    #[test]
    fn failed_fetch_is_isolated() {
        let fetch = |page: usize| -> Result<String, FetchError> {
            if page == 1 { Err(FetchError::Other(s!("boom"))) } else { Ok(format!(r#"<div id="pos0">{page} °C</div>"#)) }
        };
        let out = run_cycle(&tree(3), &fetch, None);
        assert_eq!(out.status.failed_pages, vec![1]);
        assert_eq!(out.status.pages_successful, 2);
        assert!(!out.status.all_successful);
        assert_eq!(out.pages[1].get("V2").and_then(|o| o.value), Some(2.0));
    }

    #[test]
    fn missing_export_is_a_config_failure() {
        let fetch = |_: usize| -> Result<String, FetchError> { Ok(s!()) };
        let out = read_data(Path::new("/nonexistent/uvr/Neu.xml"), &fetch, 1, None);
        assert_eq!(out.status.pages_attempted, 0);
        assert!(!out.status.all_successful);
        assert!(out.status.config_error.is_some());
    }
}

//! The acquisition pipeline.
//!
//! A run lists candidates, then processes them one at a time in discovery
//! order: download, extract, title, name and persist, re-extract from the
//! persisted copy, summarize. Per-document failures are recorded and skipped.
//! Only a listing failure or an uncreatable save directory aborts the run.
//! The sink is called exactly once, after every candidate was handled.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use thiserror::Error;

use gazette_pdf::{resolve_title, sanitize};

use crate::config::{Config, ConfigError};
use crate::fetch::{DocumentFetcher, FetchError};
use crate::naming::{date_stamp, persist, unique_path};
use crate::seen::{SeenStore, SeenStoreError};
use crate::sink::{SinkError, SummarySink};
use crate::summarize::{SummaryRequester, TextGenerator};
use crate::{
    CandidateLink, FetchedDocument, MupdfExtractor, ProgressEvent, RunReport, SkipReason,
    SkippedDocument, Stage, SummaryRecord, TextExtractor,
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("listing failed: {0}")]
    Listing(#[source] FetchError),
    #[error("cannot create save directory {path}: {source}")]
    SaveDir { path: PathBuf, source: io::Error },
    #[error("seen-URL store error: {0}")]
    SeenStore(#[from] SeenStoreError),
    #[error("output sink failed: {source}")]
    Sink {
        source: SinkError,
        /// The finished run whose records the sink could not take.
        report: Box<RunReport>,
    },
}

pub struct AcquisitionPipeline<G> {
    config: Config,
    fetcher: DocumentFetcher,
    extractor: Arc<dyn TextExtractor>,
    summarizer: SummaryRequester<G>,
}

impl<G: TextGenerator> AcquisitionPipeline<G> {
    /// Validate `config` and build the pipeline around `generator`.
    pub fn new(config: Config, generator: G) -> Result<Self, ConfigError> {
        config.validate()?;
        let fetcher = DocumentFetcher::from_config(&config)?;
        Ok(Self {
            config,
            fetcher,
            extractor: Arc::new(MupdfExtractor),
            summarizer: SummaryRequester::new(generator),
        })
    }

    pub fn with_extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.summarizer = self.summarizer.with_system_instruction(instruction);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generator(&self) -> &G {
        self.summarizer.generator()
    }

    /// Run once, stamping files with today's local date.
    pub async fn run<S>(&self, sink: &mut S) -> Result<RunReport, PipelineError>
    where
        S: SummarySink + ?Sized,
    {
        self.run_on(Local::now().date_naive(), sink, |_| {}).await
    }

    /// Run once, stamping files with `date`.
    pub async fn run_on<S, P>(
        &self,
        date: NaiveDate,
        sink: &mut S,
        progress: P,
    ) -> Result<RunReport, PipelineError>
    where
        S: SummarySink + ?Sized,
        P: Fn(ProgressEvent) + Sync,
    {
        let stamp = date_stamp(date);

        let mut seen = match &self.config.seen_store {
            Some(path) => Some(SeenStore::load(path)?),
            None => None,
        };

        log::debug!("stage: {}", Stage::Listing);
        let candidates = self
            .list(date, seen.as_ref())
            .await
            .map_err(PipelineError::Listing)?;
        progress(ProgressEvent::Listed {
            candidates: candidates.len(),
        });

        let mut report = RunReport {
            date_stamp: stamp.clone(),
            candidates_found: candidates.len(),
            ..RunReport::default()
        };

        if candidates.is_empty() {
            log::info!("nothing new at {}", self.config.listing_url);
        } else {
            let save_dir = &self.config.save_dir;
            fs::create_dir_all(save_dir).map_err(|source| PipelineError::SaveDir {
                path: save_dir.clone(),
                source,
            })?;

            let total = candidates.len();
            for (index, candidate) in candidates.iter().enumerate() {
                match self.process(index, total, candidate, &stamp, &progress).await {
                    Ok(record) => {
                        log::info!("[{}/{}] summarized {}", index + 1, total, record.filename);
                        progress(ProgressEvent::Summarized {
                            index,
                            total,
                            filename: record.filename.clone(),
                        });
                        report.records.push(record);
                    }
                    Err(skipped) => {
                        log::warn!(
                            "[{}/{}] skipping {} ({}): {}",
                            index + 1,
                            total,
                            skipped.url,
                            skipped.title.as_deref().unwrap_or("untitled"),
                            skipped.reason
                        );
                        progress(ProgressEvent::Skipped {
                            index,
                            total,
                            url: skipped.url.clone(),
                            reason: skipped.reason.clone(),
                        });
                        report.skipped.push(skipped);
                    }
                }
            }
        }

        log::debug!("stage: {}", Stage::Reporting);
        log::info!(
            "run {}: {} candidate(s), {} summarized, {} skipped",
            stamp,
            report.candidates_found,
            report.succeeded(),
            report.skipped_count()
        );
        if let Err(source) = sink.emit(&report.records) {
            return Err(PipelineError::Sink {
                source,
                report: Box::new(report),
            });
        }

        if let Some(store) = seen.as_mut() {
            for record in &report.records {
                store.insert(record.url.clone());
            }
            if let Err(e) = store.save() {
                log::warn!("could not update seen-URL store: {}", e);
            }
        }

        log::debug!("stage: {}", Stage::Idle);
        Ok(report)
    }

    async fn list(&self, date: NaiveDate, seen: Option<&SeenStore>) -> Result<Vec<CandidateLink>, FetchError> {
        let listing_url = &self.config.listing_url;
        let max = self.config.max_candidates_per_run;

        let links = match (seen, self.config.published_on_run_date) {
            (None, false) => return self.fetcher.list_candidates(listing_url, max).await,
            (_, true) => self.fetcher.list_links_published_on(listing_url, date).await?,
            (_, false) => self.fetcher.list_links(listing_url).await?,
        };

        let mut fresh = match seen {
            Some(store) => {
                let listed = links.len();
                let fresh: Vec<CandidateLink> = links
                    .into_iter()
                    .filter(|link| !store.contains(&link.url))
                    .collect();
                log::info!("{} of {} link(s) not seen before", fresh.len(), listed);
                fresh
            }
            None => links,
        };
        fresh.truncate(max);
        Ok(fresh)
    }

    async fn process<P>(
        &self,
        index: usize,
        total: usize,
        candidate: &CandidateLink,
        stamp: &str,
        progress: &P,
    ) -> Result<SummaryRecord, SkippedDocument>
    where
        P: Fn(ProgressEvent) + Sync,
    {
        let url = candidate.url.as_str();
        let enter = |stage: Stage| {
            log::debug!("[{}/{}] {}: {}", index + 1, total, stage, url);
            progress(ProgressEvent::Stage {
                index,
                total,
                stage,
            });
        };

        enter(Stage::Downloading);
        let bytes = self
            .fetcher
            .download(url)
            .await
            .map_err(|e| skipped(url, None, SkipReason::Network(e.to_string())))?;

        enter(Stage::Extracting);
        let extractor = self.extractor.clone();
        let (bytes, text) = tokio::task::spawn_blocking(move || {
            let text = extractor.extract(&bytes);
            (bytes, text)
        })
        .await
        .map_err(|e| {
            log::warn!("extraction task for {} failed: {}", url, e);
            skipped(url, None, SkipReason::NoText)
        })?;

        enter(Stage::Titling);
        let document = FetchedDocument {
            url: url.to_string(),
            bytes,
            title: resolve_title(&text),
        };
        let title = Some(document.title.as_str());

        enter(Stage::Naming);
        let named = unique_path(&self.config.save_dir, &sanitize(&document.title), stamp);
        persist(&named, &document.bytes)
            .map_err(|e| skipped(url, title, SkipReason::Filesystem(e.to_string())))?;
        log::info!("saved {} as {}", url, named.path.display());

        let extractor = self.extractor.clone();
        let path = named.path.clone();
        let text = tokio::task::spawn_blocking(move || extractor.extract_from_path(&path))
            .await
            .map_err(|e| skipped(url, title, SkipReason::Filesystem(e.to_string())))?
            .map_err(|e| skipped(url, title, SkipReason::Filesystem(e.to_string())))?;

        if self.config.skip_textless && text.trim().is_empty() {
            return Err(skipped(url, title, SkipReason::NoText));
        }

        enter(Stage::Summarizing);
        let summary = self
            .summarizer
            .summarize(
                &text,
                self.config.max_input_chars_for_summary,
                self.config.max_output_tokens,
            )
            .await
            .map_err(|e| skipped(url, title, SkipReason::Generation(e.to_string())))?;

        Ok(SummaryRecord {
            filename: named.filename,
            title: document.title,
            url: document.url,
            summary,
        })
    }
}

fn skipped(url: &str, title: Option<&str>, reason: SkipReason) -> SkippedDocument {
    SkippedDocument {
        url: url.to_string(),
        title: title.map(str::to_string),
        reason,
    }
}

//! One batch run from raw records to statistics.
//!
//! The stages run strictly in sequence: deduplicate, index venues, fetch
//! journal metadata through the cache, rank, summarize, annotate. Apart from
//! parsing BibTeX input, nothing in a run can fail; unresolved identifiers,
//! failed fetches and missing catalogs all surface as counts and reasons in
//! the [`RunReport`].

use crate::cache::{VenueCache, VenueMetadata};
use crate::catalog::cas::CasCatalog;
use crate::catalog::ccf::CcfCatalog;
use crate::dedupe::{DedupeReport, Deduplicator, DeduplicatorConfig};
use crate::fetch::VenueFetcher;
use crate::identifier::VenueIndex;
use crate::ranking::{AggregateSummary, AnnotatedCitation, PaperPercentages, PaperStatistics, VenueRanking};
use crate::{BibtexParser, Citation, CitationParser, RankingOrchestrator, Result, VenueKey, VenueKind};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dedupe: DedupeReport,
    pub rankings: Vec<VenueRanking>,
    pub summary: AggregateSummary,
    pub annotated: Vec<AnnotatedCitation>,
    pub paper_stats: PaperStatistics,
    pub paper_percentages: PaperPercentages,
}

/// Runs the full ranking flow against a pair of loaded catalogs.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    orchestrator: RankingOrchestrator<'a>,
    deduplicator: Deduplicator,
}

impl<'a> Pipeline<'a> {
    pub fn new(ccf: &'a CcfCatalog, cas: &'a CasCatalog) -> Self {
        Self {
            orchestrator: RankingOrchestrator::new(ccf, cas),
            deduplicator: Deduplicator::new(),
        }
    }

    #[must_use]
    pub fn with_dedupe_config(mut self, config: DeduplicatorConfig) -> Self {
        self.deduplicator = self.deduplicator.with_config(config);
        self
    }

    /// Ranks `records`, fetching journal metadata through `cache`.
    pub fn run<F>(&self, records: Vec<Citation>, cache: &mut VenueCache, fetcher: &F) -> RunReport
    where
        F: VenueFetcher + ?Sized,
    {
        let (records, dedupe) = self.deduplicator.deduplicate_with_report(records);
        let index = VenueIndex::build(&records);

        let metadata: HashMap<VenueKey, VenueMetadata> = index
            .keys_of_kind(VenueKind::Journal)
            .map(|key| (key.clone(), cache.get(key.abbr(), fetcher)))
            .collect();
        let fetched = metadata.values().filter(|m| m.success).count();

        let rankings = self.orchestrator.rank(&index, &metadata);
        let summary = self.orchestrator.summarize(&rankings, &index);
        let annotated = self.orchestrator.annotate(&records, &rankings);
        let paper_stats = PaperStatistics::from_annotated(&annotated);
        let paper_percentages = paper_stats.percentages();

        info!(
            papers = paper_stats.total_papers,
            venues = summary.total_venues,
            unresolved = summary.unresolved_papers,
            journals_fetched = fetched,
            journals_total = metadata.len(),
            ccf_matches = summary.ccf_matches,
            cas_matches = summary.cas_matches,
            "ranking run complete"
        );

        RunReport {
            dedupe,
            rankings,
            summary,
            annotated,
            paper_stats,
            paper_percentages,
        }
    }

    /// Parses BibTeX `input` and ranks the records.
    ///
    /// # Errors
    ///
    /// Returns an error only when no records can be parsed from `input`
    pub fn run_bibtex<F>(&self, input: &str, cache: &mut VenueCache, fetcher: &F) -> Result<RunReport>
    where
        F: VenueFetcher + ?Sized,
    {
        let records = BibtexParser::new().parse(input)?;
        info!(records = records.len(), "parsed bibliography");
        Ok(self.run(records, cache, fetcher))
    }
}

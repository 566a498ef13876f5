//! Ranking orchestration and aggregation.
//!
//! [`RankingOrchestrator`] drives both catalogs for every indexed venue and
//! turns the results into three views:
//!
//! - per-venue [`VenueRanking`]s
//! - a venue-level [`AggregateSummary`], where each venue lands in at most one
//!   CCF bucket and one CAS bucket, weighted by its paper count
//! - per-record [`AnnotatedCitation`]s and the [`PaperStatistics`] computed
//!   from them, where union counts are a logical OR per paper

use crate::cache::VenueMetadata;
use crate::catalog::cas::{CasCatalog, CasEntry};
use crate::catalog::ccf::{CcfCatalog, CcfEntry, CcfRank};
use crate::catalog::{MatchResult, RankingCatalog, VenueLookup};
use crate::identifier::{VenueIndex, resolve};
use crate::{Citation, VenueKey, VenueKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Both catalog results for one venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRanking {
    pub key: VenueKey,
    /// Fetched DBLP title, the only name used for name fallback
    pub name: Option<String>,
    /// First venue name written in the records, for display only
    pub venue_name: Option<String>,
    pub issn_list: Vec<String>,
    pub paper_count: usize,
    pub ccf: MatchResult<CcfEntry>,
    pub cas: MatchResult<CasEntry>,
}

/// Per-rank counters for CCF categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl RankCounts {
    pub fn get(&self, rank: CcfRank) -> usize {
        match rank {
            CcfRank::A => self.a,
            CcfRank::B => self.b,
            CcfRank::C => self.c,
        }
    }

    fn add(&mut self, rank: CcfRank, n: usize) {
        match rank {
            CcfRank::A => self.a += n,
            CcfRank::B => self.b += n,
            CcfRank::C => self.c += n,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c
    }
}

/// Per-zone counters for CAS zones 1 to 4.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub zone_1: usize,
    pub zone_2: usize,
    pub zone_3: usize,
    pub zone_4: usize,
}

impl ZoneCounts {
    /// Count for `zone`; zero outside 1 to 4.
    pub fn get(&self, zone: u8) -> usize {
        match zone {
            1 => self.zone_1,
            2 => self.zone_2,
            3 => self.zone_3,
            4 => self.zone_4,
            _ => 0,
        }
    }

    fn add(&mut self, zone: u8, n: usize) {
        match zone {
            1 => self.zone_1 += n,
            2 => self.zone_2 += n,
            3 => self.zone_3 += n,
            4 => self.zone_4 += n,
            _ => {}
        }
    }

    pub fn total(&self) -> usize {
        self.zone_1 + self.zone_2 + self.zone_3 + self.zone_4
    }
}

/// Venue-level statistics.
///
/// `*_venues` counters count venues, `*_papers` counters sum the paper counts
/// of those venues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_venues: usize,
    pub journal_count: usize,
    pub conference_count: usize,
    /// Records that resolved to a venue
    pub total_papers: usize,
    /// Records whose identifier did not resolve
    pub unresolved_papers: usize,

    pub ccf_matches: usize,
    pub ccf_venues: RankCounts,
    pub ccf_papers: RankCounts,
    pub ccf_journal_venues: RankCounts,
    pub ccf_journal_papers: RankCounts,
    pub ccf_conference_venues: RankCounts,
    pub ccf_conference_papers: RankCounts,

    pub cas_matches: usize,
    pub cas_venues: ZoneCounts,
    pub cas_papers: ZoneCounts,
    pub cas_top_venues: usize,
    pub cas_top_papers: usize,
}

/// A record with the rankings of its venue attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedCitation {
    pub citation: Citation,
    pub venue_key: Option<VenueKey>,
    pub ccf: Option<CcfEntry>,
    /// Only ever set for journal venues
    pub cas: Option<CasEntry>,
}

impl AnnotatedCitation {
    pub fn ccf_rank(&self) -> Option<CcfRank> {
        self.ccf.as_ref().and_then(CcfEntry::rank_class)
    }

    pub fn cas_zone(&self) -> Option<u8> {
        self.cas.as_ref().and_then(|entry| entry.zone)
    }

    pub fn is_cas_top(&self) -> bool {
        self.cas.as_ref().is_some_and(CasEntry::is_top)
    }
}

/// Per-paper statistics over annotated records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperStatistics {
    pub total_papers: usize,
    pub ccf: RankCounts,
    pub cas: ZoneCounts,
    pub cas_top: usize,
    /// Papers that are CCF-A or CAS zone 1, each counted once
    pub ccf_a_or_cas_1: usize,
    /// Papers that are CCF-A/B or CAS zone 1/2, each counted once
    pub ccf_ab_or_cas_12: usize,
}

/// [`PaperStatistics`] counts as percentages of the total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperPercentages {
    pub ccf_a: f64,
    pub ccf_b: f64,
    pub ccf_c: f64,
    pub cas_1: f64,
    pub cas_2: f64,
    pub cas_3: f64,
    pub cas_4: f64,
    pub cas_top: f64,
    pub ccf_a_or_cas_1: f64,
    pub ccf_ab_or_cas_12: f64,
}

impl PaperStatistics {
    pub fn from_annotated(records: &[AnnotatedCitation]) -> Self {
        let mut stats = Self {
            total_papers: records.len(),
            ..Default::default()
        };

        for record in records {
            let rank = record.ccf_rank();
            let zone = record.cas_zone();

            if let Some(rank) = rank {
                stats.ccf.add(rank, 1);
            }
            if let Some(zone) = zone {
                stats.cas.add(zone, 1);
            }
            if record.is_cas_top() {
                stats.cas_top += 1;
            }

            if rank == Some(CcfRank::A) || zone == Some(1) {
                stats.ccf_a_or_cas_1 += 1;
            }
            if matches!(rank, Some(CcfRank::A | CcfRank::B)) || matches!(zone, Some(1 | 2)) {
                stats.ccf_ab_or_cas_12 += 1;
            }
        }
        stats
    }

    /// `count` as a percentage of all papers; zero when there are none.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total_papers == 0 {
            0.0
        } else {
            count as f64 / self.total_papers as f64 * 100.0
        }
    }

    pub fn percentages(&self) -> PaperPercentages {
        PaperPercentages {
            ccf_a: self.percentage(self.ccf.a),
            ccf_b: self.percentage(self.ccf.b),
            ccf_c: self.percentage(self.ccf.c),
            cas_1: self.percentage(self.cas.zone_1),
            cas_2: self.percentage(self.cas.zone_2),
            cas_3: self.percentage(self.cas.zone_3),
            cas_4: self.percentage(self.cas.zone_4),
            cas_top: self.percentage(self.cas_top),
            ccf_a_or_cas_1: self.percentage(self.ccf_a_or_cas_1),
            ccf_ab_or_cas_12: self.percentage(self.ccf_ab_or_cas_12),
        }
    }
}

/// Matches indexed venues against the CCF and CAS catalogs.
#[derive(Debug, Clone, Copy)]
pub struct RankingOrchestrator<'a> {
    ccf: &'a CcfCatalog,
    cas: &'a CasCatalog,
}

impl<'a> RankingOrchestrator<'a> {
    pub fn new(ccf: &'a CcfCatalog, cas: &'a CasCatalog) -> Self {
        Self { ccf, cas }
    }

    /// Ranks every venue of `index`, in index order.
    ///
    /// Journals are matched with their fetched title and ISSNs. Conferences
    /// and journals without successful metadata are matched by identifier
    /// only. Venue names written in the records are never matched on.
    pub fn rank(&self, index: &VenueIndex, metadata: &HashMap<VenueKey, VenueMetadata>) -> Vec<VenueRanking> {
        index
            .iter()
            .map(|(key, paper_count)| {
                let fetched = metadata
                    .get(key)
                    .filter(|m| m.success && key.kind() == VenueKind::Journal);
                let name = fetched.and_then(|m| m.title.as_deref());
                let issns: &[String] = fetched.map(|m| m.issn_list.as_slice()).unwrap_or_default();
                let lookup = VenueLookup::new(key).with_name(name).with_issns(issns);
                self.rank_venue(&lookup, paper_count, index.venue_name(key))
            })
            .collect()
    }

    fn rank_venue(&self, lookup: &VenueLookup<'_>, paper_count: usize, venue_name: Option<&str>) -> VenueRanking {
        let key = lookup.key;
        let ccf = self.ccf.match_venue(lookup);
        let cas = self.cas.match_venue(lookup);

        debug!(
            venue = %key,
            ccf = ?ccf.match_type(),
            ccf_reason = ?ccf.reason(),
            cas = ?cas.match_type(),
            cas_reason = ?cas.reason(),
            "ranked venue"
        );

        VenueRanking {
            key: key.clone(),
            name: lookup.name.map(str::to_string),
            venue_name: venue_name.map(str::to_string),
            issn_list: lookup.issns.to_vec(),
            paper_count,
            ccf,
            cas,
        }
    }

    /// Aggregates venue rankings, taking paper counts from `index`.
    pub fn summarize(&self, rankings: &[VenueRanking], index: &VenueIndex) -> AggregateSummary {
        let mut summary = AggregateSummary {
            total_venues: rankings.len(),
            unresolved_papers: index.unresolved(),
            ..Default::default()
        };

        for ranking in rankings {
            let papers = index.count(&ranking.key);
            summary.total_papers += papers;
            let kind = ranking.key.kind();
            match kind {
                VenueKind::Journal => summary.journal_count += 1,
                VenueKind::Conference => summary.conference_count += 1,
            }

            if let Some(entry) = ranking.ccf.entry() {
                summary.ccf_matches += 1;
                if let Some(rank) = entry.rank_class() {
                    summary.ccf_venues.add(rank, 1);
                    summary.ccf_papers.add(rank, papers);
                    let (venues, paper_counts) = match kind {
                        VenueKind::Journal => (&mut summary.ccf_journal_venues, &mut summary.ccf_journal_papers),
                        VenueKind::Conference => {
                            (&mut summary.ccf_conference_venues, &mut summary.ccf_conference_papers)
                        }
                    };
                    venues.add(rank, 1);
                    paper_counts.add(rank, papers);
                }
            }

            if let Some(entry) = ranking.cas.entry() {
                summary.cas_matches += 1;
                if let Some(zone) = entry.zone {
                    summary.cas_venues.add(zone, 1);
                    summary.cas_papers.add(zone, papers);
                }
                if entry.is_top() {
                    summary.cas_top_venues += 1;
                    summary.cas_top_papers += papers;
                }
            }
        }
        summary
    }

    /// Attaches venue rankings to each record.
    ///
    /// Records are looked up by the venue key their identifier resolves to.
    /// CAS data is attached to journal venues only.
    pub fn annotate(&self, records: &[Citation], rankings: &[VenueRanking]) -> Vec<AnnotatedCitation> {
        let by_key: HashMap<&VenueKey, &VenueRanking> =
            rankings.iter().map(|ranking| (&ranking.key, ranking)).collect();

        records
            .iter()
            .map(|citation| {
                let venue_key = resolve(&citation.id);
                let ranking = venue_key.as_ref().and_then(|key| by_key.get(key).copied());
                let ccf = ranking.and_then(|r| r.ccf.entry().cloned());
                let cas = ranking
                    .filter(|r| r.key.kind() == VenueKind::Journal)
                    .and_then(|r| r.cas.entry().cloned());
                AnnotatedCitation {
                    citation: citation.clone(),
                    venue_key,
                    ccf,
                    cas,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntryKind;
    use crate::catalog::{MatchType, NoMatchReason};
    use pretty_assertions::assert_eq;

    const CCF: &str = "\
刊物名称,Journal,CCF推荐类别（国际学术刊物/会议）,CCF推荐类型,网址
IEEE Transactions on Software Engineering,TSE,国际学术刊物,A类,https://dblp.org/db/journals/tse/
World Wide Web,WWWJ,国际学术刊物,C类,https://dblp.org/db/journals/www/
International World Wide Web Conferences,WWW,国际学术会议,A类,https://dblp.org/db/conf/www/
Pattern Recognition,PR,国际学术刊物,B类,https://dblp.org/db/journals/pr/
Obscure Symposium,OS,国际学术会议,X类,https://dblp.org/db/conf/os/
";

    const CAS: &str = "\
Journal,ISSN/EISSN,Top,大类,大类分区,小类1
IEEE TRANSACTIONS ON SOFTWARE ENGINEERING,0098-5589/1939-3520,是,计算机科学,2 [41/519],软件工程
PATTERN RECOGNITION,0031-3203/1873-5142,是,计算机科学,1 [12/519],人工智能
WORLD WIDE WEB,1386-145X/1573-1413,否,计算机科学,3 [200/519],信息系统
";

    fn catalogs() -> (CcfCatalog, CasCatalog) {
        (CcfCatalog::from_csv_str(CCF).unwrap(), CasCatalog::from_csv_str(CAS).unwrap())
    }

    fn record(id: &str, title: &str) -> Citation {
        let key = resolve(id);
        Citation {
            id: id.to_string(),
            title: title.to_string(),
            entry_kind: match key.as_ref().map(VenueKey::kind) {
                Some(VenueKind::Conference) => EntryKind::InProceedings,
                _ => EntryKind::Article,
            },
            ..Default::default()
        }
    }

    fn metadata(title: &str, issns: &[&str]) -> VenueMetadata {
        VenueMetadata {
            title: Some(title.to_string()),
            issn_list: issns.iter().map(|s| s.to_string()).collect(),
            success: true,
        }
    }

    fn fixture() -> (Vec<Citation>, VenueIndex, HashMap<VenueKey, VenueMetadata>) {
        let records = vec![
            record("DBLP:journals/tse/A1", "Paper 1"),
            record("DBLP:journals/tse/A2", "Paper 2"),
            record("DBLP:journals/www/B1", "Paper 3"),
            record("DBLP:conf/www/C1", "Paper 4"),
            record("DBLP:journals/pr/D1", "Paper 5"),
            record("DBLP:conf/os/E1", "Paper 6"),
            record("local-key", "Paper 7"),
        ];
        let index = VenueIndex::build(&records);
        let metadata = HashMap::from([
            (
                VenueKey::Journal("tse".into()),
                metadata("IEEE Transactions on Software Engineering", &["0098-5589"]),
            ),
            (VenueKey::Journal("www".into()), metadata("World Wide Web", &["1386-145X"])),
            (VenueKey::Journal("pr".into()), metadata("Pattern Recognition", &["0031-3203"])),
        ]);
        (records, index, metadata)
    }

    #[test]
    fn test_rank_keeps_kinds_apart() {
        let (ccf, cas) = catalogs();
        let (_, index, metadata) = fixture();
        let rankings = RankingOrchestrator::new(&ccf, &cas).rank(&index, &metadata);

        assert_eq!(rankings.len(), 5);
        let www_journal = &rankings[1];
        assert_eq!(www_journal.key, VenueKey::Journal("www".into()));
        assert_eq!(www_journal.ccf.entry().map(|e| e.rank.as_str()), Some("C类"));
        assert_eq!(www_journal.cas.entry().and_then(|e| e.zone), Some(3));

        let www_conference = &rankings[2];
        assert_eq!(www_conference.key, VenueKey::Conference("www".into()));
        assert_eq!(www_conference.ccf.entry().map(|e| e.rank.as_str()), Some("A类"));
        assert_eq!(www_conference.cas.reason(), Some(NoMatchReason::ConferencesUnsupported));
        assert_eq!(www_conference.ccf.match_type(), Some(MatchType::Identifier));
    }

    #[test]
    fn test_summary_buckets_each_venue_once() {
        let (ccf, cas) = catalogs();
        let (_, index, metadata) = fixture();
        let orchestrator = RankingOrchestrator::new(&ccf, &cas);
        let summary = orchestrator.summarize(&orchestrator.rank(&index, &metadata), &index);

        assert_eq!(summary.total_venues, 5);
        assert_eq!(summary.journal_count, 3);
        assert_eq!(summary.conference_count, 2);
        assert_eq!(summary.total_papers, 6);
        assert_eq!(summary.unresolved_papers, 1);

        // "X类" matches but lands in no bucket
        assert_eq!(summary.ccf_matches, 5);
        assert_eq!(summary.ccf_venues, RankCounts { a: 2, b: 1, c: 1 });
        assert_eq!(summary.ccf_papers, RankCounts { a: 3, b: 1, c: 1 });
        assert_eq!(summary.ccf_journal_papers, RankCounts { a: 2, b: 1, c: 1 });
        assert_eq!(summary.ccf_conference_venues, RankCounts { a: 1, b: 0, c: 0 });

        assert_eq!(summary.cas_matches, 3);
        assert_eq!(summary.cas_papers.get(2), 2);
        assert_eq!(summary.cas_papers.get(1), 1);
        assert_eq!(summary.cas_papers.get(3), 1);
        assert_eq!(summary.cas_top_venues, 2);
        assert_eq!(summary.cas_top_papers, 3);
    }

    #[test]
    fn test_journal_without_metadata_matches_by_identifier_only() {
        let (ccf, cas) = catalogs();
        let records = vec![Citation {
            id: "DBLP:journals/tse-x/A".to_string(),
            entry_kind: EntryKind::Article,
            journal: Some("IEEE Transactions on Software Engineering".to_string()),
            ..Default::default()
        }];
        let index = VenueIndex::build(&records);
        let rankings = RankingOrchestrator::new(&ccf, &cas).rank(&index, &HashMap::new());

        assert_eq!(rankings[0].name, None);
        assert_eq!(
            rankings[0].venue_name.as_deref(),
            Some("IEEE Transactions on Software Engineering")
        );
        assert_eq!(rankings[0].ccf.reason(), Some(NoMatchReason::NoIdentifierMatch));
        assert_eq!(rankings[0].cas.reason(), Some(NoMatchReason::NoIssn));
        assert!(rankings[0].issn_list.is_empty());
    }

    #[test]
    fn test_conference_booktitle_never_used_for_name_match() {
        let ccf = CcfCatalog::from_csv_str(
            "刊物名称,Journal,CCF推荐类型,网址\n\
             International Conference on Software Engineering,ICSE,A类,https://dblp.org/db/conf/icse/\n",
        )
        .unwrap();
        let cas = CasCatalog::unavailable();
        let records = vec![Citation {
            id: "DBLP:conf/sew/Doe20".to_string(),
            entry_kind: EntryKind::InProceedings,
            title: "Workshop Paper".to_string(),
            booktitle: Some("Workshop on Software Engineering".to_string()),
            ..Default::default()
        }];
        let index = VenueIndex::build(&records);
        // Metadata for a conference key is ignored as well
        let metadata = HashMap::from([(
            VenueKey::Conference("sew".into()),
            metadata("International Conference on Software Engineering", &[]),
        )]);
        let orchestrator = RankingOrchestrator::new(&ccf, &cas);
        let rankings = orchestrator.rank(&index, &metadata);

        assert_eq!(rankings[0].name, None);
        assert_eq!(rankings[0].ccf.reason(), Some(NoMatchReason::NoIdentifierMatch));
        assert_eq!(rankings[0].cas.reason(), Some(NoMatchReason::ConferencesUnsupported));

        let stats = PaperStatistics::from_annotated(&orchestrator.annotate(&records, &rankings));
        assert_eq!(stats.ccf, RankCounts::default());
        assert_eq!(stats.ccf_a_or_cas_1, 0);
    }

    #[test]
    fn test_fetched_journal_title_drives_name_fallback() {
        let (ccf, cas) = catalogs();
        let records = vec![record("DBLP:journals/tsex/A", "Paper")];
        let index = VenueIndex::build(&records);
        let metadata = HashMap::from([(
            VenueKey::Journal("tsex".into()),
            metadata("IEEE Transactions on Software Engineering", &[]),
        )]);
        let rankings = RankingOrchestrator::new(&ccf, &cas).rank(&index, &metadata);

        assert_eq!(rankings[0].ccf.match_type(), Some(MatchType::NameExact));
        assert_eq!(rankings[0].cas.match_type(), Some(MatchType::NameExact));
    }

    #[test]
    fn test_annotate_and_paper_statistics() {
        let (ccf, cas) = catalogs();
        let (records, index, metadata) = fixture();
        let orchestrator = RankingOrchestrator::new(&ccf, &cas);
        let rankings = orchestrator.rank(&index, &metadata);
        let annotated = orchestrator.annotate(&records, &rankings);

        assert_eq!(annotated.len(), 7);
        assert_eq!(annotated[3].ccf_rank(), Some(CcfRank::A));
        assert_eq!(annotated[3].cas, None);
        assert_eq!(annotated[6].venue_key, None);

        let stats = PaperStatistics::from_annotated(&annotated);
        assert_eq!(stats.total_papers, 7);
        assert_eq!(stats.ccf, RankCounts { a: 3, b: 1, c: 1 });
        assert_eq!(stats.cas, ZoneCounts { zone_1: 1, zone_2: 2, zone_3: 1, zone_4: 0 });
        assert_eq!(stats.cas_top, 3);
        // tse (A, zone 2) x2, conf/www (A), pr (B, zone 1)
        assert_eq!(stats.ccf_a_or_cas_1, 4);
        // previous four plus nothing else: journals/www is C and zone 3
        assert_eq!(stats.ccf_ab_or_cas_12, 4);
    }

    #[test]
    fn test_union_counts_each_paper_once() {
        let tse = CcfEntry {
            rank: "A类".to_string(),
            ..Default::default()
        };
        let zone_1 = CasEntry {
            zone: Some(1),
            ..Default::default()
        };
        let zone_2 = CasEntry {
            zone: Some(2),
            ..Default::default()
        };
        let annotated = |ccf: Option<&CcfEntry>, cas: Option<&CasEntry>| AnnotatedCitation {
            citation: Citation::default(),
            venue_key: None,
            ccf: ccf.cloned(),
            cas: cas.cloned(),
        };

        let records = vec![
            annotated(Some(&tse), Some(&zone_1)),
            annotated(Some(&tse), None),
            annotated(None, Some(&zone_1)),
            annotated(None, Some(&zone_2)),
            annotated(None, None),
        ];
        let stats = PaperStatistics::from_annotated(&records);

        assert_eq!(stats.ccf_a_or_cas_1, 3);
        assert_eq!(stats.ccf_ab_or_cas_12, 4);
        assert_eq!(stats.percentage(stats.ccf_a_or_cas_1), 60.0);
        assert_eq!(stats.percentages().ccf_ab_or_cas_12, 80.0);
    }

    #[test]
    fn test_percentages_of_empty_set() {
        let stats = PaperStatistics::from_annotated(&[]);
        assert_eq!(stats.percentage(0), 0.0);
        assert_eq!(stats.percentages(), PaperPercentages::default());
    }
}

//! Field extraction: normalized gazette text → structured case records.
//!
//! The cause list of a gazette is a run of repeating blocks, each opened by
//! a literal `CAUSE NO.` marker. Segmentation splits on that marker (the
//! preamble before the first marker is discarded), then an ordered grammar
//! of regex rules pulls a fixed field set out of each block.
//!
//! Rules are named pattern-plus-transform units so they can be added or
//! reordered without touching the segmentation: the court-name rules in
//! particular are an explicit ordered table where position encodes
//! precedence (high-court phrasing is tried before the magistrate
//! phrasings).
//!
//! Failure policy: a block missing its cause number or deceased name is
//! dropped silently — it never aborts the document. A missing or
//! unparseable date never drops a block; it just yields no publication
//! date.

use crate::model::{CanonicalRecord, GazetteStatus};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

// ── Segmentation ─────────────────────────────────────────────────────────

/// Case-header marker opening each block.
static RE_CASE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)CAUSE\s+NO\.").unwrap());

// ── Field rules ──────────────────────────────────────────────────────────

/// Cause number as printed: `E<digits> OF <year>`.
static RE_CAUSE_NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)E\s*\d{1,4}\s*OF\s*\d{4}").unwrap());

/// Deceased name: introduced by "By", optionally a party-numbering marker
/// such as "(1)", terminated by the literal phrase "the deceased".
static RE_DECEASED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)By\s+(?:\(\d+\)\s+)?(.*?),.*?the deceased").unwrap());

/// Which court suffix a matched court rule carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CourtKind {
    High,
    Magistrate,
}

impl CourtKind {
    fn suffix(self) -> &'static str {
        match self {
            CourtKind::High => "High Court",
            CourtKind::Magistrate => "Magistrate Court",
        }
    }
}

/// One court-name phrasing: the pattern captures the town.
struct CourtRule {
    pattern: Regex,
    kind: CourtKind,
}

/// Ordered court phrasings. Position is precedence: the first rule whose
/// pattern matches wins, so the high-court phrasing must stay ahead of the
/// magistrate ones.
static COURT_RULES: Lazy<Vec<CourtRule>> = Lazy::new(|| {
    let rule = |pattern: &str, kind| CourtRule {
        pattern: Regex::new(pattern).unwrap(),
        kind,
    };
    vec![
        rule(
            r"(?i)IN THE HIGH COURT OF KENYA AT\s+([A-Za-z\s]+)",
            CourtKind::High,
        ),
        rule(r"(?i)IN THE COURT AT\s+([A-Za-z\s]+)", CourtKind::Magistrate),
        rule(
            r"(?i)CHIEF MAGISTRATE\S* COURT AT\s+([A-Za-z\s]+)",
            CourtKind::Magistrate,
        ),
        rule(
            r"(?i)MAGISTRATE COURT OF\s+([A-Za-z\s]+)",
            CourtKind::Magistrate,
        ),
    ]
});

/// Sentinel used when no court pattern matches a block.
pub const UNKNOWN: &str = "Unknown";

// ── Date rules ───────────────────────────────────────────────────────────

/// Long-form date, "1st January 2024" style.
static RE_DATE_LONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d{1,2}(?:st|nd|rd|th)?\s+[A-Za-z]+\s+\d{4}").unwrap());

/// Numeric D-M-YYYY, accepting hyphen or en-dash separators.
static RE_DATE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2}[–-]\d{1,2}[–-]\d{4}").unwrap());

/// Ordinal suffix on a day number.
static RE_ORDINAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(st|nd|rd|th)").unwrap());

/// Gazette footer line carrying the publication date, e.g.
/// "DATED this 14th March 2024".
static RE_DATED_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)DATED\s+(?:THIS\s+)?(\d{1,2}(?:st|nd|rd|th)?\s+[A-Za-z]+\s+\d{4})").unwrap()
});

// ── Volume rule ──────────────────────────────────────────────────────────

/// "Vol. <number>" in the source file name.
static RE_VOLUME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Vol\.\s*(\d+)").unwrap());

// ── Transforms ───────────────────────────────────────────────────────────

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Reduce a captured town to at most its first three words, title-cased.
/// Gazette captures run in ALL CAPS and can swallow trailing words of the
/// sentence; the three-word cap keeps "MOMBASA IN THE MATTER" down to the
/// town itself in the common cases.
fn normalize_town(capture: &str) -> String {
    capture
        .split_whitespace()
        .take(3)
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply the ordered court rules to a block.
fn extract_court_station(block: &str) -> String {
    for rule in COURT_RULES.iter() {
        if let Some(caps) = rule.pattern.captures(block) {
            let town = normalize_town(&caps[1]);
            if town.is_empty() {
                continue;
            }
            return format!("{} {}", town, rule.kind.suffix());
        }
    }
    UNKNOWN.to_string()
}

/// Parse a long-form date ("1st January 2024"), tolerating ordinal
/// suffixes and abbreviated month names.
fn parse_long_date(s: &str) -> Option<NaiveDate> {
    let cleaned = RE_ORDINAL.replace(s, "$1");
    let cleaned = cleaned.trim();
    NaiveDate::parse_from_str(cleaned, "%d %B %Y")
        .or_else(|_| NaiveDate::parse_from_str(cleaned, "%d %b %Y"))
        .ok()
}

/// Parse a numeric D-M-YYYY date with hyphen or en-dash separators.
fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<u32> = s
        .split(['-', '–'])
        .map(|p| p.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;
    if parts.len() != 3 {
        return None;
    }
    NaiveDate::from_ymd_opt(parts[2] as i32, parts[1], parts[0])
}

/// Per-block publication date: long form first, numeric second. Within each
/// shape the first *parseable* occurrence wins — the long-date pattern also
/// matches cause-number tails like "123 OF 2024", which must not shadow a
/// real date later in the block. An unparseable result yields `None`, never
/// a dropped block.
fn extract_block_date(block: &str) -> Option<NaiveDate> {
    if let Some(date) = RE_DATE_LONG
        .find_iter(block)
        .find_map(|m| parse_long_date(m.as_str()))
    {
        return Some(date);
    }
    RE_DATE_NUMERIC
        .find_iter(block)
        .find_map(|m| parse_numeric_date(m.as_str()))
}

/// Volume number from the source file name; "Unknown" when absent.
pub fn volume_from_filename(file_name: &str) -> String {
    RE_VOLUME
        .captures(file_name)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Document-level publication date: the "DATED this …" footer wins; when
/// the footer is absent or unparseable, fall back to the first parseable
/// date anywhere in the text.
pub fn derive_publication_date(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = RE_DATED_HEADER.captures(text) {
        if let Some(date) = parse_long_date(&caps[1]) {
            return Some(date);
        }
    }
    extract_block_date(text)
}

// ── Extraction entry point ───────────────────────────────────────────────

/// Extract all case records from one document's normalized text.
///
/// `date_received` is the ingestion timestamp the caller stamps onto every
/// record; `source_file` supplies the per-document volume number. Records
/// from this path are being read out of a gazette, so their status is
/// always `Published`.
pub fn extract_records(
    text: &str,
    source_file: &str,
    date_received: NaiveDate,
) -> Vec<CanonicalRecord> {
    let volume_no = volume_from_filename(source_file);
    let mut records = Vec::new();

    // skip(1): everything before the first CAUSE NO. marker is preamble.
    for block in RE_CASE_HEADER.split(text).skip(1) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let Some(cause) = RE_CAUSE_NO.find(block) else {
            trace!("block dropped: no cause number");
            continue;
        };
        let Some(name_caps) = RE_DECEASED_NAME.captures(block) else {
            trace!(cause_no = cause.as_str(), "block dropped: no deceased name");
            continue;
        };

        records.push(CanonicalRecord {
            sequence_no: None,
            court_station: extract_court_station(block),
            cause_no: cause.as_str().trim().to_string(),
            name_of_deceased: name_caps[1].trim().to_string(),
            date_received,
            status_at_gp: GazetteStatus::Published,
            rejection_reason: String::new(),
            date_published: extract_block_date(block),
            volume_no: volume_no.clone(),
            source_file: Some(source_file.to_string()),
        });
    }

    debug!(
        file = source_file,
        records = records.len(),
        "extraction complete"
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    const BLOCK: &str = "GAZETTE NOTICE No. 4001 PROBATE AND ADMINISTRATION \
        CAUSE NO. E123 OF 2024 IN THE HIGH COURT OF KENYA AT NAIROBI, \
        By (1) JOHN KAMAU MWANGI, of P.O. Box 100, Nairobi, the deceased's son, \
        dated 14th March 2024";

    #[test]
    fn well_formed_block_yields_one_record() {
        let records = extract_records(BLOCK, "Gazette Vol. 37.pdf", received());
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.cause_no, "E123 OF 2024");
        assert_eq!(r.name_of_deceased, "JOHN KAMAU MWANGI");
        assert_eq!(r.court_station, "Nairobi High Court");
        assert_eq!(r.status_at_gp, GazetteStatus::Published);
        assert_eq!(r.volume_no, "37");
        assert_eq!(r.date_published, NaiveDate::from_ymd_opt(2024, 3, 14));
        assert_eq!(r.source_file.as_deref(), Some("Gazette Vol. 37.pdf"));
    }

    #[test]
    fn missing_cause_number_drops_block() {
        let text = "CAUSE NO. pending assignment By JOHN KAMAU, the deceased";
        assert!(extract_records(text, "a.pdf", received()).is_empty());
    }

    #[test]
    fn missing_name_drops_block() {
        let text = "CAUSE NO. E55 OF 2023 estate of an unnamed person";
        assert!(extract_records(text, "a.pdf", received()).is_empty());
    }

    #[test]
    fn preamble_is_discarded() {
        let text = format!(
            "THE KENYA GAZETTE Vol. CXXVI published by authority E999 OF 2020 {BLOCK}"
        );
        let records = extract_records(&text, "a.pdf", received());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cause_no, "E123 OF 2024");
    }

    #[test]
    fn multiple_blocks_extract_independently() {
        let text = "CAUSE NO. E1 OF 2024 By ALICE ACHIENG, the deceased's daughter \
            CAUSE NO. E2 OF 2024 no name here \
            CAUSE NO. E3 OF 2024 By (2) BRIAN BARASA, the deceased's brother";
        let records = extract_records(text, "a.pdf", received());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name_of_deceased, "ALICE ACHIENG");
        assert_eq!(records[1].name_of_deceased, "BRIAN BARASA");
    }

    #[test]
    fn court_precedence_high_before_magistrate() {
        // Both phrasings present: the high-court rule is earlier in the
        // table and must win.
        let text = "CAUSE NO. E9 OF 2024 IN THE HIGH COURT OF KENYA AT MOMBASA, \
            sitting with the CHIEF MAGISTRATE'S COURT AT VOI, By GRACE WAMBUI, the deceased";
        let records = extract_records(text, "a.pdf", received());
        assert_eq!(records[0].court_station, "Mombasa High Court");
    }

    #[test]
    fn magistrate_phrasings_get_magistrate_suffix() {
        for text in [
            "CAUSE NO. E9 OF 2024 CHIEF MAGISTRATE'S COURT AT KITALE, By A B, the deceased",
            "CAUSE NO. E9 OF 2024 MAGISTRATE COURT OF KERICHO, By A B, the deceased",
            "CAUSE NO. E9 OF 2024 IN THE COURT AT NYERI, By A B, the deceased",
        ] {
            let records = extract_records(text, "a.pdf", received());
            assert!(
                records[0].court_station.ends_with("Magistrate Court"),
                "got {} for {text}",
                records[0].court_station
            );
        }
    }

    #[test]
    fn unknown_court_sentinel() {
        let text = "CAUSE NO. E9 OF 2024 By A B, the deceased";
        let records = extract_records(text, "a.pdf", received());
        assert_eq!(records[0].court_station, UNKNOWN);
    }

    #[test]
    fn town_capped_at_three_words_title_cased() {
        assert_eq!(normalize_town("UASIN GISHU COUNTY SEAT"), "Uasin Gishu County");
        assert_eq!(normalize_town("NAIROBI"), "Nairobi");
    }

    #[test]
    fn numeric_date_fallback_with_en_dash() {
        let text = "CAUSE NO. E9 OF 2024 By A B, the deceased, gazetted 14–3–2024";
        let records = extract_records(text, "a.pdf", received());
        assert_eq!(
            records[0].date_published,
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );
    }

    #[test]
    fn unparseable_date_yields_none_not_discard() {
        let text = "CAUSE NO. E9 OF 2024 By A B, the deceased, dated 45th Nothember 2024";
        let records = extract_records(text, "a.pdf", received());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date_published, None);
    }

    #[test]
    fn volume_from_filename_variants() {
        assert_eq!(volume_from_filename("Gazette Vol. 37.pdf"), "37");
        assert_eq!(volume_from_filename("vol.120-special.pdf"), "120");
        assert_eq!(volume_from_filename("notice.pdf"), UNKNOWN);
    }

    #[test]
    fn dated_header_wins_for_publication_date() {
        let text = "CAUSE NO. E9 OF 2024 By A B, the deceased, filed 1st January 2020 \
            DATED this 14th March 2024";
        assert_eq!(
            derive_publication_date(text),
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );
    }

    #[test]
    fn publication_date_falls_back_to_first_in_text_date() {
        let text = "registry stamp 2nd February 2023, no footer here";
        assert_eq!(
            derive_publication_date(text),
            NaiveDate::from_ymd_opt(2023, 2, 2)
        );
        assert_eq!(derive_publication_date("nothing dated"), None);
    }

    #[test]
    fn long_date_parser_handles_ordinals_and_abbreviations() {
        assert_eq!(
            parse_long_date("1st January 2024"),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(
            parse_long_date("21 Mar 2024"),
            NaiveDate::from_ymd_opt(2024, 3, 21)
        );
        assert_eq!(parse_long_date("32nd January 2024"), None);
    }
}

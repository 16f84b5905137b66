use askama::Template;
use chrono::{DateTime, Utc};

use super::format_date;
use crate::config::ListingConfig;
use crate::constants::DECEASED_MARKER;
use crate::error::Result;
use crate::hierarchy::LabelResolution;
use crate::ranker::Ranking;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub number: Option<usize>,
    pub name: String,
    pub born: String,
    pub deceased: bool,
}

/// One hierarchy level and its members in ranked order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingGroup {
    pub id: String,
    pub label: String,
    pub heading: String,
    pub rows: Vec<ListingRow>,
}

#[derive(Template)]
#[template(path = "family_listing.html")]
struct ListingPage<'a> {
    title: &'a str,
    digest: &'a str,
    match_mode: &'a str,
    generated_at: Option<&'a str>,
    deceased_marker: &'a str,
    groups: &'a [ListingGroup],
}

/// The grouped listing page before rendering
#[derive(Debug, Clone)]
pub struct ListingDocument {
    title: String,
    match_mode: &'static str,
    generated_at: Option<String>,
    groups: Vec<ListingGroup>,
}

/// First letter upper case, the rest lower case
fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl ListingDocument {
    pub fn build(
        ranking: &Ranking<'_>,
        labels: &LabelResolution,
        options: &ListingConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let generated_at = if options.show_timestamp {
            let tz = options.tz()?;
            Some(now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z").to_string())
        } else {
            None
        };

        let mut groups: Vec<ListingGroup> = labels
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| ListingGroup {
                id: format!("level-{}", i + 1),
                label: label.clone(),
                heading: capitalize(label),
                rows: Vec::new(),
            })
            .collect();

        for member in ranking.members() {
            let record = member.record;
            groups[member.level as usize].rows.push(ListingRow {
                number: options.show_numbers.then_some(member.overall_number),
                name: record.name.clone(),
                born: format_date(record.date_of_birth),
                deceased: record.is_deceased(),
            });
        }

        Ok(Self {
            title: options.title.clone(),
            match_mode: options.match_mode.as_str(),
            generated_at,
            groups,
        })
    }

    pub fn groups(&self) -> &[ListingGroup] {
        &self.groups
    }

    pub fn generated_at(&self) -> Option<&str> {
        self.generated_at.as_deref()
    }

    pub fn render(&self, digest: &str) -> Result<String> {
        let page = ListingPage {
            title: &self.title,
            digest,
            match_mode: self.match_mode,
            generated_at: self.generated_at.as_deref(),
            deceased_marker: DECEASED_MARKER,
            groups: &self.groups,
        };
        Ok(page.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchMode;
    use crate::hierarchy::resolve_labels;
    use crate::loader::load_from_bytes;
    use crate::ranker::rank;
    use crate::types::{FamilyTable, Variant};
    use chrono::TimeZone;

    const CSV: &str = "Name,Hierarchy Level,Date of Birth,Alive\n\
                       Henry,parent,1962-05-05,yes\n\
                       Grace,GRANDPARENT,1930-02-02,no\n\
                       Ivy,child,1990-07-07,\n\
                       Hana,parent,1960-01-01,yes\n";

    fn table() -> FamilyTable {
        load_from_bytes(CSV.as_bytes(), Variant::Listing).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_groups_follow_first_appearance() {
        let table = table();
        let labels = resolve_labels(&table).unwrap();
        let ranking = rank(&table, &labels.levels);
        let doc =
            ListingDocument::build(&ranking, &labels, &ListingConfig::default(), fixed_now()).unwrap();

        let headings: Vec<&str> = doc.groups().iter().map(|g| g.heading.as_str()).collect();
        assert_eq!(headings, vec!["Parent", "Grandparent", "Child"]);

        let parents = &doc.groups()[0].rows;
        assert_eq!(parents[0].name, "Hana");
        assert_eq!(parents[0].number, Some(1));
        assert_eq!(parents[1].name, "Henry");
        assert_eq!(parents[1].number, Some(2));

        let grandparent = &doc.groups()[1].rows[0];
        assert!(grandparent.deceased);
        assert_eq!(grandparent.born, "1930-02-02");
    }

    #[test]
    fn test_timestamp_uses_configured_timezone() {
        let table = table();
        let labels = resolve_labels(&table).unwrap();
        let ranking = rank(&table, &labels.levels);
        let options = ListingConfig {
            timezone: "America/New_York".to_string(),
            ..ListingConfig::default()
        };
        let doc = ListingDocument::build(&ranking, &labels, &options, fixed_now()).unwrap();

        assert_eq!(doc.generated_at(), Some("2024-07-01 08:00:00 EDT"));
    }

    #[test]
    fn test_render_options() {
        let table = table();
        let labels = resolve_labels(&table).unwrap();
        let ranking = rank(&table, &labels.levels);
        let options = ListingConfig {
            match_mode: MatchMode::Substring,
            show_timestamp: false,
            show_numbers: false,
            ..ListingConfig::default()
        };
        let doc = ListingDocument::build(&ranking, &labels, &options, fixed_now()).unwrap();
        let html = doc.render(&table.digest).unwrap();

        assert!(html.contains(r#"data-match-mode="substring""#));
        assert!(!html.contains("Generated on"));
        assert!(html.contains("Grace (DOB: 1930-02-02) †"));
        assert!(!html.contains("1. Hana"));
        assert!(html.contains(r#"id="level-3""#));
    }

    #[test]
    fn test_render_escapes_names() {
        let csv = "Name,Hierarchy Level,Date of Birth\n<b>Bold</b>,parent,1960-01-01\n";
        let table = load_from_bytes(csv.as_bytes(), Variant::Listing).unwrap();
        let labels = resolve_labels(&table).unwrap();
        let ranking = rank(&table, &labels.levels);
        let html = ListingDocument::build(&ranking, &labels, &ListingConfig::default(), fixed_now())
            .unwrap()
            .render(&table.digest)
            .unwrap();

        assert!(!html.contains("<b>Bold</b>"));
        assert!(html.contains("&lt;b&gt;Bold"));
        assert!(html.contains("Generated on 2024-07-01 12:00:00 UTC"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("grandparent"), "Grandparent");
        assert_eq!(capitalize("GREAT uncle"), "Great uncle");
        assert_eq!(capitalize(""), "");
    }
}

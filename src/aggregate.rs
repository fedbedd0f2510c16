use crate::config::{ChangePolicy, DuplicatePolicy, PipelineOptions};
use crate::normalize::division_from_row;
use crate::resolver::WardNames;
use crate::types::{Lsgd, Row, Ward};
use crate::util::parse_ward_no;
use anyhow::{bail, Result};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    pub rows: usize,
    pub divisions: usize,
    pub wards: usize,
    pub duplicates: usize,
    pub non_numeric: usize,
}

/// Whether `label` opens a new division after `current`. Blank labels
/// continue the open division under every policy.
pub fn starts_new_division(current: &Lsgd, label: &str, policy: ChangePolicy) -> bool {
    if label.is_empty() {
        return false;
    }
    match policy {
        ChangePolicy::Raw => label != current.raw_label,
        ChangePolicy::Reconstructed => {
            label != current.raw_label
                && !current
                    .reconstructed_labels()
                    .iter()
                    .any(|prefix| label.starts_with(prefix.as_str()))
        }
    }
}

/// Group rows into divisions in source order.
///
/// The first row opens the first division whatever its label. Consecutive
/// rows that belong to the same division share one `Lsgd`; the last open
/// division is flushed once rows run out.
pub fn aggregate(
    rows: &[Row],
    options: &PipelineOptions,
    mut names: Option<&mut dyn WardNames>,
) -> Result<(Vec<Lsgd>, AggregateReport)> {
    let mut report = AggregateReport { rows: rows.len(), ..AggregateReport::default() };
    let mut data: Vec<Lsgd> = Vec::new();
    let mut current: Option<Lsgd> = None;

    for row in rows {
        let opens = match &current {
            None => true,
            Some(open) => starts_new_division(open, &row.lsg, options.change_policy),
        };
        if opens {
            if let Some(done) = current.take() {
                data.push(done);
            }
            let next = division_from_row(row);
            debug!("opened {} {:?} in {}", next.lsg, next.kind, next.district);
            current = Some(next);
        }

        let Some(division) = current.as_mut() else {
            continue;
        };

        let Some(ward_no) = parse_ward_no(&row.ward_no) else {
            report.non_numeric += 1;
            continue;
        };

        if division.has_ward(ward_no) {
            report.duplicates += 1;
            match options.duplicates {
                DuplicatePolicy::Skip => {
                    warn!(
                        "duplicate {}, wardNo:{} (S.No {})",
                        division.raw_label,
                        ward_no,
                        row.serial_no.trim()
                    );
                    continue;
                }
                DuplicatePolicy::Fail => {
                    bail!("duplicate ward {} in {}", ward_no, division.raw_label);
                }
            }
        }

        let mut ward = Ward::from_row(ward_no, row);
        if options.resolve_names {
            if let Some(n) = names.as_deref_mut() {
                ward.name = Some(n.ward_name(&division.district, &division.lsg, ward_no));
            }
        }
        division.wards.push(ward);
        report.wards += 1;
    }

    if let Some(done) = current.take() {
        data.push(done);
    }
    report.divisions = data.len();
    Ok((data, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::FakeDirectory;
    use crate::resolver::WardNameResolver;
    use crate::types::{ContactInfo, DivisionType};

    fn row(district: &str, lsg: &str, ward_no: &str) -> Row {
        Row {
            district_name: district.to_string(),
            lsg: lsg.to_string(),
            ward_no: ward_no.to_string(),
            medical_officer: ContactInfo { name: format!("MO {lsg} {ward_no}"), contact: "94".into() },
            ..Row::default()
        }
    }

    fn no_names() -> PipelineOptions {
        PipelineOptions { resolve_names: false, ..PipelineOptions::default() }
    }

    fn kottayam_rows() -> Vec<Row> {
        vec![
            row("Kottayam District", "Changanassery Municipality", "1"),
            row("Kottayam District", "Changanassery Municipality", "2"),
            row("Kottayam District", "Ettumanoor Grama Panchayat", "1"),
        ]
    }

    #[test]
    fn groups_runs_and_flushes_last_division() {
        let (data, report) = aggregate(&kottayam_rows(), &no_names(), None).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(report.divisions, 2);
        assert_eq!(report.wards, 3);

        assert_eq!(data[0].district, "Kottayam");
        assert_eq!(data[0].lsg, "Changanassery");
        assert_eq!(data[0].kind, DivisionType::Municipality);
        assert_eq!(data[0].wards.iter().map(|w| w.ward_no).collect::<Vec<_>>(), vec![1, 2]);

        assert_eq!(data[1].lsg, "Ettumanoor");
        assert_eq!(data[1].kind, DivisionType::Grama);
        assert_eq!(data[1].wards.len(), 1);
        assert!(data[1].wards[0].name.is_none());
    }

    #[test]
    fn single_division_is_still_emitted() {
        let rows = vec![row("Idukki District", "Adimali Grama Panchayat", "1")];
        let (data, _) = aggregate(&rows, &no_names(), None).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].lsg, "Adimali");
    }

    #[test]
    fn empty_input_yields_nothing() {
        let (data, report) = aggregate(&[], &no_names(), None).unwrap();
        assert!(data.is_empty());
        assert_eq!(report, AggregateReport::default());
    }

    #[test]
    fn duplicate_ward_is_dropped_without_touching_the_first() {
        let mut rows = kottayam_rows();
        let mut dup = row("Kottayam District", "Changanassery Municipality", "2");
        dup.medical_officer.name = "someone else".into();
        rows.insert(2, dup);

        let (data, report) = aggregate(&rows, &no_names(), None).unwrap();
        assert_eq!(report.duplicates, 1);
        assert_eq!(data[0].wards.len(), 2);
        assert_eq!(data[0].wards[1].medical_officer.name, "MO Changanassery Municipality 2");
    }

    #[test]
    fn duplicate_ward_can_abort() {
        let mut rows = kottayam_rows();
        rows.push(row("Kottayam District", "", "1"));
        let opts = PipelineOptions { duplicates: DuplicatePolicy::Fail, ..no_names() };
        let err = aggregate(&rows, &opts, None).unwrap_err();
        assert!(err.to_string().contains("duplicate ward 1"));
    }

    #[test]
    fn same_ward_number_in_other_division_is_fine() {
        let (data, report) = aggregate(&kottayam_rows(), &no_names(), None).unwrap();
        assert_eq!(report.duplicates, 0);
        assert_eq!(data[0].wards[0].ward_no, data[1].wards[0].ward_no);
    }

    #[test]
    fn non_numeric_ward_rows_still_switch_divisions() {
        let rows = vec![
            row("Kottayam District", "Changanassery Municipality", "1"),
            row("Kottayam District", "Ettumanoor Grama Panchayat", "Total"),
            row("Kottayam District", "", "2"),
        ];
        let (data, report) = aggregate(&rows, &no_names(), None).unwrap();
        assert_eq!(report.non_numeric, 1);
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].wards.len(), 1);
        // the blank label continues Ettumanoor
        assert_eq!(data[1].lsg, "Ettumanoor");
        assert_eq!(data[1].wards[0].ward_no, 2);
    }

    #[test]
    fn first_row_opens_a_division_even_when_blank() {
        let rows = vec![
            row("Kottayam District", "", "1"),
            row("Kottayam District", "", "2"),
        ];
        let (data, report) = aggregate(&rows, &no_names(), None).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(report.wards, 2);
        assert_eq!(data[0].district, "Kottayam");
        assert_eq!(data[0].lsg, "");
        assert_eq!(data[0].wards.iter().map(|w| w.ward_no).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn blank_first_division_closes_on_the_next_label() {
        let rows = vec![
            row("Kottayam District", "", "1"),
            row("Kottayam District", "Changanassery Municipality", "1"),
            row("Kottayam District", "", "2"),
        ];
        let (data, _) = aggregate(&rows, &no_names(), None).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].wards.len(), 1);
        assert_eq!(data[1].lsg, "Changanassery");
        assert_eq!(data[1].wards.len(), 2);
    }

    #[test]
    fn reconstructed_policy_tolerates_suffix_variants() {
        let rows = vec![
            row("Kottayam District", "Pala Municipality", "1"),
            row("Kottayam District", "Pala Muncipality", "2"),
            row("Kottayam District", "Pala Municipality, Kottayam District", "3"),
        ];
        let (data, _) = aggregate(&rows, &no_names(), None).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].wards.len(), 3);

        let raw = PipelineOptions { change_policy: ChangePolicy::Raw, ..no_names() };
        let (data, _) = aggregate(&rows, &raw, None).unwrap();
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn unmatched_fallback_labels_do_not_split_runs() {
        let rows = vec![
            row("Ernakulam District", "Fort Kochi Zone", "1"),
            row("Ernakulam District", "Fort Kochi Zone", "2"),
        ];
        let (data, _) = aggregate(&rows, &no_names(), None).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].kind, DivisionType::Corporation);
    }

    #[test]
    fn run_count_matches_label_runs() {
        let labels = ["A Grama Panchayat", "A Grama Panchayat", "B Block Panchayat", "A Grama Panchayat", "C Corporation", "C Corporation"];
        let rows: Vec<Row> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| row("Kollam District", l, &(i + 1).to_string()))
            .collect();
        let (data, _) = aggregate(&rows, &no_names(), None).unwrap();
        let names: Vec<&str> = data.iter().map(|d| d.lsg.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "A", "C"]);
    }

    #[test]
    fn resolves_names_with_one_fetch_per_district() {
        let fake = FakeDirectory::default()
            .with(5, "Changanassery Municipality", &[(1, "WEST PALLOM")])
            .with(5, "Ettumanoor Grama Panchayat", &[(1, "PERUR")]);
        let mut resolver = WardNameResolver::new(fake);
        let (data, _) =
            aggregate(&kottayam_rows(), &PipelineOptions::default(), Some(&mut resolver)).unwrap();

        assert_eq!(resolver.fetches(), 1);
        assert_eq!(data[0].wards[0].name.as_deref(), Some("West Pallom"));
        // ward 2 is missing upstream: empty name, run carries on
        assert_eq!(data[0].wards[1].name.as_deref(), Some(""));
        assert_eq!(data[1].wards[0].name.as_deref(), Some("Perur"));
        assert_eq!(resolver.failures(), 1);
    }

    #[test]
    fn resolution_toggle_leaves_names_absent() {
        let mut resolver = WardNameResolver::new(FakeDirectory::default());
        let (data, _) = aggregate(&kottayam_rows(), &no_names(), Some(&mut resolver)).unwrap();
        assert_eq!(resolver.fetches(), 0);
        assert!(data.iter().flat_map(|d| &d.wards).all(|w| w.name.is_none()));
    }
}

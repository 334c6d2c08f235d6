use crate::types::{AreaEvolutionReport, DistrictRef, LineageReport, Report, StatisticsReport};
use anyhow::Result;
use std::fmt::Write as _;

/// Trait for report formatters
pub trait ReportFormatter {
    fn format(&self, report: &Report) -> Result<String>;
}

/// Plain text formatter, styled after the interactive tracer output.
pub struct TextFormatter;

/// Markdown formatter
pub struct MarkdownFormatter;

/// JSON formatter
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        Ok(match report {
            Report::Lineage(lineage) => text_lineage(lineage),
            Report::Statistics(statistics) => text_statistics(statistics),
            Report::AreaEvolution(evolution) => text_evolution(evolution),
        })
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        Ok(match report {
            Report::Lineage(lineage) => markdown_lineage(lineage),
            Report::Statistics(statistics) => markdown_statistics(statistics),
            Report::AreaEvolution(evolution) => markdown_evolution(evolution),
        })
    }
}

fn describe(district: &DistrictRef) -> String {
    format!(
        "{} ({}) - {:.2} sq km",
        district.name, district.year, district.area
    )
}

fn text_lineage(report: &LineageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(
        out,
        "  Lineage for {} ({})",
        report.district.name.to_uppercase(),
        report.district.year
    );
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(
        out,
        "LGD Code: {} | Area at Formation: {:.2} sq km",
        report.district.code, report.district.area
    );

    if report.is_original() {
        let _ = writeln!(out, "\nDirect Parent(s): None (Original District)");
    } else {
        let _ = writeln!(out, "\nDirect Parent(s):");
        for parent in &report.direct_parents {
            let _ = writeln!(out, "   - {}", describe(parent));
        }
    }

    if report.has_been_split() {
        let _ = writeln!(out, "\nDirect Children:");
        for child in &report.direct_children {
            let _ = writeln!(out, "   - {}", describe(child));
        }
    }

    if report.ancestors.is_empty() {
        let _ = writeln!(out, "\nAncestors: none recorded.");
    } else {
        let _ = writeln!(out, "\nAncestors (Formed From):");
        for ancestor in &report.ancestors {
            let _ = writeln!(out, "   - {}", describe(ancestor));
        }
    }

    if report.descendants.is_empty() {
        let _ = writeln!(out, "\nDescendants: this district has not been split further.");
    } else {
        let _ = writeln!(out, "\nDescendants (Contributed To):");
        for descendant in &report.descendants {
            let _ = writeln!(out, "   - {}", describe(descendant));
        }
    }

    let _ = writeln!(out, "{}", "=".repeat(60));
    out
}

fn text_statistics(report: &StatisticsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "   Overall District Statistics");
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Total Districts Recorded: {}", report.total_districts);
    let _ = writeln!(out, "Original Districts: {}", report.original_districts);
    let _ = writeln!(out, "Derived Districts: {}", report.derived_districts);
    let _ = writeln!(out, "\nTotal Area at Formation: {:.2} sq km", report.total_area);
    let _ = writeln!(out, "Average Area: {:.2} sq km", report.average_area);
    let _ = writeln!(
        out,
        "Combined Area of Current Districts: {:.2} sq km",
        report.current_districts_area
    );
    let _ = writeln!(out, "Largest District: {}", describe(&report.largest));
    let _ = writeln!(out, "Smallest District: {}", describe(&report.smallest));

    let _ = writeln!(out, "\nDistrict Formations by Year:");
    for formation in &report.formations_by_year {
        let _ = writeln!(
            out,
            "  {}: {} district(s) - {}",
            formation.year,
            formation.count,
            formation.districts.join(", ")
        );
    }

    let _ = writeln!(out, "\nMost Prolific Parent Districts:");
    for entry in &report.most_split {
        let _ = writeln!(out, "  {}: {} child district(s)", entry.name, entry.children);
    }

    let _ = writeln!(out, "\nFormation Events (parent x year):");
    for event in &report.split_matrix {
        let _ = writeln!(
            out,
            "  {} lost territory in {}: {} new district(s)",
            event.parent_name, event.year, event.count
        );
    }

    let _ = writeln!(out, "{}", "=".repeat(60));
    out
}

fn text_evolution(report: &AreaEvolutionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Area Evolution of the '{}' Territory",
        report.progenitor.name
    );
    let _ = writeln!(out, "{}", "=".repeat(60));

    let mut header = String::from("District");
    for year in &report.years {
        let _ = write!(header, "\t{}", year);
    }
    let _ = writeln!(out, "{}", header);

    for series in &report.series {
        let mut row = series.district.name.clone();
        for remaining in &series.remaining_area {
            match remaining {
                Some(area) => {
                    let _ = write!(row, "\t{:.2}", area);
                }
                None => row.push_str("\t-"),
            }
        }
        let _ = writeln!(out, "{}", row);
    }

    out
}

fn markdown_lineage(report: &LineageReport) -> String {
    let list = |districts: &[DistrictRef], empty: &str| {
        if districts.is_empty() {
            empty.to_string()
        } else {
            districts
                .iter()
                .map(|district| format!("- {}", describe(district)))
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    format!(
        r#"# Lineage: {} ({})

**LGD Code**: {}
**Area at Formation**: {:.2} sq km

## Direct Parents
{}

## Direct Children
{}

## Ancestors
{}

## Descendants
{}

---
*Generated at: {}*
"#,
        report.district.name,
        report.district.year,
        report.district.code,
        report.district.area,
        list(&report.direct_parents, "None (original district)"),
        list(&report.direct_children, "None"),
        list(&report.ancestors, "None"),
        list(&report.descendants, "None (not split further)"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn markdown_statistics(report: &StatisticsReport) -> String {
    let formations = report
        .formations_by_year
        .iter()
        .map(|formation| {
            format!(
                "| {} | {} | {} |",
                formation.year,
                formation.count,
                formation.districts.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let ranking = report
        .most_split
        .iter()
        .map(|entry| format!("- {}: {} child district(s)", entry.name, entry.children))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"# District Statistics

- **Total Districts**: {}
- **Original Districts**: {}
- **Derived Districts**: {}
- **Total Area at Formation**: {:.2} sq km
- **Average Area**: {:.2} sq km
- **Combined Area of Current Districts**: {:.2} sq km
- **Largest**: {}
- **Smallest**: {}

## Formations by Year

| Year | Count | Districts |
|------|-------|-----------|
{}

## Most Prolific Parents

{}

---
*Generated at: {}*
"#,
        report.total_districts,
        report.original_districts,
        report.derived_districts,
        report.total_area,
        report.average_area,
        report.current_districts_area,
        describe(&report.largest),
        describe(&report.smallest),
        formations,
        ranking,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn markdown_evolution(report: &AreaEvolutionReport) -> String {
    let mut header = String::from("| District |");
    let mut divider = String::from("|----------|");
    for year in &report.years {
        let _ = write!(header, " {} |", year);
        divider.push_str("------|");
    }

    let rows = report
        .series
        .iter()
        .map(|series| {
            let mut row = format!("| {} |", series.district.name);
            for remaining in &series.remaining_area {
                match remaining {
                    Some(area) => {
                        let _ = write!(row, " {:.2} |", area);
                    }
                    None => row.push_str(" - |"),
                }
            }
            row
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"# Area Evolution: {} Territory

{}
{}
{}

---
*Generated at: {}*
"#,
        report.progenitor.name,
        header,
        divider,
        rows,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

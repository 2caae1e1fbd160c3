// Colored terminal output for each analysis stage and its drill-downs.
//
// main.rs decides what to show; the formatting lives here.

use colored::Colorize;

use super::truncate_chars;
use crate::collab::countries::{CountryLinkSeries, CreditedPublication};
use crate::collab::institutions::PartnerInstitutionRanking;
use crate::filter::Selection;
use crate::graph::{CoauthorGraph, MembershipSource};
use crate::records::models::Publication;
use crate::topics::TopicEmbedding;

const TITLE_WIDTH: usize = 70;

/// One-line summary of the filtered selection.
pub fn display_selection(selection: &Selection) {
    let (from, to) = selection.year_range;
    let scope = match &selection.focus {
        Some(id) => format!("focus {}", selection.name_of(id)),
        None => "whole cohort".to_string(),
    };
    println!(
        "\n{} {} contributing members, {} publications, {}–{} ({})",
        "Selection:".bold(),
        selection.roster.len(),
        selection.publications.len(),
        from,
        to,
        scope.dimmed()
    );
}

/// Display the heaviest co-authorship edges.
pub fn display_graph(selection: &Selection, graph: &CoauthorGraph, top: usize) {
    if graph.edges.is_empty() {
        println!("No co-authorship between contributing members in this selection.");
        return;
    }

    let source = match graph.source {
        MembershipSource::Projection => "per-author projection",
        MembershipSource::NameMatching => "author-name matching",
    };
    println!(
        "\n{}",
        format!(
            "=== Co-authorship ({} members, {} pairs) ===",
            graph.nodes.len(),
            graph.edges.len()
        )
        .bold()
    );
    println!("  {}", format!("membership from {source}").dimmed());
    println!();
    println!(
        "  {:>4}  {:<28} {:<28} {:>6}",
        "Rank".dimmed(),
        "Member".dimmed(),
        "Member".dimmed(),
        "Works".dimmed(),
    );
    println!("  {}", "-".repeat(70).dimmed());

    for (i, edge) in graph.ranked_edges().into_iter().take(top).enumerate() {
        println!(
            "  {:>4}. {:<28} {:<28} {:>6}",
            i + 1,
            truncate_chars(selection.name_of(&edge.source), 26),
            truncate_chars(selection.name_of(&edge.target), 26),
            colorize_count(edge.weight as usize),
        );
    }

    let mut busiest: Vec<_> = graph.nodes.iter().collect();
    busiest.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.id.cmp(&b.id)));
    if let Some(node) = busiest.first() {
        println!(
            "\n  Most connected: {} (weighted degree {})",
            node.name.bold(),
            node.degree
        );
    }
}

/// Works co-authored by one pair.
pub fn display_pair(selection: &Selection, a: &str, b: &str, publications: &[Publication]) {
    println!(
        "\n{}",
        format!(
            "=== {} × {} ({} works) ===",
            selection.name_of(a),
            selection.name_of(b),
            publications.len()
        )
        .bold()
    );
    if publications.is_empty() {
        println!("  These members have no co-authored works in this selection.");
        return;
    }
    for p in publications {
        display_publication_line(p);
    }
}

/// Display the credited-country series, most frequent first.
pub fn display_countries(series: &CountryLinkSeries) {
    let origin = if series.home_inferred {
        "inferred"
    } else {
        "fallback"
    };
    println!(
        "\n{}",
        format!(
            "=== International collaboration ({} countries, {} links) ===",
            series.countries.len(),
            series.total
        )
        .bold()
    );
    println!("  Home country: {} ({})", series.home_country.bold(), origin.dimmed());

    if series.total == 0 {
        println!("  No international collaborations credited in this selection.");
        return;
    }
    println!();

    let max = series.counts.iter().copied().max().unwrap_or(1).max(1);
    let bar_width: usize = 30;
    for (code, count) in series.ranked() {
        let filled = (count * bar_width).div_ceil(max);
        println!(
            "  {:<4} {:>5}  {}",
            code,
            colorize_count(count),
            "█".repeat(filled).cyan()
        );
    }
}

/// Works crediting one country, with the cohort authors behind each credit.
pub fn display_country_drill_down(code: &str, rows: &[CreditedPublication]) {
    println!(
        "\n{}",
        format!("=== Collaboration with {} ({} works) ===", code.to_uppercase(), rows.len()).bold()
    );
    if rows.is_empty() {
        println!("  No credited works for this country.");
        return;
    }
    for row in rows {
        display_publication_line(&row.publication);
        let authors: Vec<String> = row
            .authors
            .iter()
            .map(|a| format!("{} ({})", a.name, a.rule.label()))
            .collect();
        println!("        {}", authors.join(", ").dimmed());
    }
}

/// Display the partner-institution ranking.
pub fn display_institutions(ranking: &PartnerInstitutionRanking, top: usize) {
    println!(
        "\n{}",
        format!(
            "=== Partner institutions ({} total) ===",
            ranking.partners.len()
        )
        .bold()
    );
    match &ranking.home_institution {
        Some(id) => println!("  Home institution: {}", id.bold()),
        None => println!("  Home institution: {}", "unknown".dimmed()),
    }
    if ranking.partners.is_empty() {
        println!("  No partner institutions in this selection.");
        return;
    }
    println!();
    println!(
        "  {:>4}  {:<14} {:<40} {:<4} {:>6}",
        "Rank".dimmed(),
        "ID".dimmed(),
        "Name".dimmed(),
        "Ctry".dimmed(),
        "Works".dimmed(),
    );
    println!("  {}", "-".repeat(74).dimmed());

    for (i, p) in ranking.top(top).iter().enumerate() {
        let name = if p.name.is_empty() { p.id.as_str() } else { p.name.as_str() };
        println!(
            "  {:>4}. {:<14} {:<40} {:<4} {:>6}",
            i + 1,
            p.id,
            truncate_chars(name, 38),
            p.country,
            colorize_count(p.count),
        );
    }
}

/// Works crediting one partner institution.
pub fn display_institution_drill_down(
    ranking: &PartnerInstitutionRanking,
    id: &str,
    publications: &[Publication],
) {
    let label = ranking
        .partner(id)
        .filter(|p| !p.name.is_empty())
        .map(|p| p.name.as_str())
        .unwrap_or(id);
    println!(
        "\n{}",
        format!("=== Works with {} ({}) ===", label, publications.len()).bold()
    );
    if publications.is_empty() {
        println!("  No works credit this institution in the current selection.");
        return;
    }
    for p in publications {
        display_publication_line(p);
    }
}

/// Display the topic embedding coordinates.
pub fn display_embedding(embedding: &TopicEmbedding) {
    let e = match embedding {
        TopicEmbedding::InsufficientData { authors } => {
            println!(
                "\nTopic map needs at least 2 members with topics ({} found).",
                authors
            );
            return;
        }
        TopicEmbedding::Embedded(e) => e,
    };

    println!(
        "\n{}",
        format!("=== Topic similarity map ({} members) ===", e.points.len()).bold()
    );
    println!(
        "  Eigenvalues: {:.4}, {:.4}",
        e.eigenvalues[0], e.eigenvalues[1]
    );
    if e.eigenvalues == [0.0, 0.0] {
        println!("  {}", "All members share the same topics; the map is collapsed.".yellow());
    }
    println!();
    for p in &e.points {
        println!(
            "  {:<32} {:>8.3} {:>8.3}  {}",
            truncate_chars(&p.name, 30),
            p.x,
            p.y,
            format!("{} topics", p.topic_count).dimmed()
        );
    }
}

fn display_publication_line(p: &Publication) {
    let year = p.year.map(|y| y.to_string()).unwrap_or_else(|| "----".to_string());
    let title = if p.title.is_empty() { p.work_key() } else { p.title.clone() };
    println!("  {}  {}", year.dimmed(), truncate_chars(&title, TITLE_WIDTH));
    if !p.doi.is_empty() {
        println!("        {}", format!("doi:{}", p.doi).dimmed());
    }
}

/// Brighter for bigger counts.
fn colorize_count(count: usize) -> colored::ColoredString {
    let text = count.to_string();
    match count {
        0 => text.dimmed(),
        1..=2 => text.normal(),
        3..=9 => text.yellow(),
        _ => text.green().bold(),
    }
}

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use wreckroad_game::{Rank, RankOdds};

use super::audit::{AuditSummary, MapRecord};
use super::explore::{GeneratedMap, OddsRow, PowerReport, WalkRecord};
use super::seeds::code_suffix;

/// Everything one tester run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    Generate {
        maps: Vec<GeneratedMap>,
    },
    Audit {
        summary: AuditSummary,
        records: Vec<MapRecord>,
    },
    Odds {
        rows: Vec<OddsRow>,
    },
    Power {
        report: PowerReport,
    },
    Walk {
        walks: Vec<WalkRecord>,
    },
}

impl Report {
    /// False when an audit found broken maps.
    #[must_use]
    pub fn passed(&self) -> bool {
        match self {
            Self::Audit { summary, .. } => summary.passed(),
            _ => true,
        }
    }
}

fn odds_cells(odds: &RankOdds) -> String {
    Rank::ALL
        .iter()
        .map(|rank| format!("{:>7.2}", odds.get(rank).copied().unwrap_or(0.0)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn rank_header() -> String {
    Rank::ALL
        .iter()
        .map(|rank| format!("{:>7}", rank.key()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn markdown_code(code: Option<&str>) -> String {
    code.map(|code| format!(" (`{code}`)")).unwrap_or_default()
}

pub fn generate_json_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_console_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    match report {
        Report::Generate { maps } => {
            for map in maps {
                writeln!(
                    out,
                    "{} seed {}{} offer {}: {}x{} density {:.2}",
                    "🗺️".bright_cyan(),
                    map.seed,
                    code_suffix(map.code.as_deref()).bold(),
                    map.offer + 1,
                    map.width,
                    map.height,
                    map.density
                )?;
                writeln!(out, "{}", map.rendering)?;
            }
            writeln!(out, "{}", wreckroad_game::map::legend().dimmed())?;
        }
        Report::Audit { summary, .. } => {
            writeln!(out, "{}", "📊 Map Audit Summary".bright_cyan().bold())?;
            writeln!(out, "{}", "====================".cyan())?;
            writeln!(out, "Maps generated: {}", summary.maps)?;
            writeln!(out, "Passed: {}", (summary.maps - summary.failed).to_string().green())?;
            writeln!(out, "Failed: {}", summary.failed.to_string().red())?;
            writeln!(out, "Mean nodes: {:.1}", summary.mean_nodes)?;
            writeln!(out, "Mean edges: {:.1}", summary.mean_edges)?;
            writeln!(out, "Elapsed: {} ms", summary.elapsed_ms)?;
            writeln!(out)?;
            writeln!(out, "{}", "Encounter mix".bright_yellow().bold())?;
            for (kind, share) in &summary.kind_share {
                writeln!(out, "  {:<9} {:>5.1}%", kind.key(), share * 100.0)?;
            }
            if !summary.failures.is_empty() {
                writeln!(out)?;
                writeln!(out, "Failures:")?;
                for failure in &summary.failures {
                    writeln!(out, "  • {}", failure.red())?;
                }
            }
        }
        Report::Odds { rows } => {
            writeln!(out, "{}", "🎲 Rank odds by power".bright_cyan().bold())?;
            writeln!(out, "{:>7} {:<19} {}", "power", "band", rank_header())?;
            for row in rows {
                let band = format!("{}..={}", row.floor, row.ceiling);
                writeln!(out, "{:>7.1} {band:<19} {}", row.power, odds_cells(&row.odds))?;
            }
        }
        Report::Power { report } => {
            writeln!(out, "{}", "⚙️  Power breakdown".bright_cyan().bold())?;
            for entry in report.breakdown.equipment.iter().chain(&report.breakdown.chassis) {
                let slot = entry.slot.map_or("chassis", |slot| slot.key());
                writeln!(out, "  {:<11} {:<22} {:>5.2}", slot, entry.name, entry.score)?;
            }
            writeln!(out, "Total power: {}", format!("{:.2}", report.breakdown.total).bold())?;
            writeln!(out, "{}", rank_header())?;
            writeln!(out, "{}", odds_cells(&report.odds))?;
        }
        Report::Walk { walks } => {
            for record in walks {
                let outcome = format!("{:?}", record.outcome);
                let outcome = if record.outcome == wreckroad_game::WalkOutcome::BossReached {
                    outcome.green()
                } else {
                    outcome.yellow()
                };
                writeln!(
                    out,
                    "🚗 seed {}{}: {outcome}",
                    record.seed,
                    code_suffix(record.code.as_deref()).bold()
                )?;
                for line in &record.encounters {
                    writeln!(out, "   {line}")?;
                }
                writeln!(out, "   final power {:.2}", record.final_power)?;
            }
        }
    }
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    writeln!(out, "# Wreckroad Map Tester Results\n")?;
    match report {
        Report::Generate { maps } => {
            for map in maps {
                writeln!(
                    out,
                    "## Seed {}{} offer {}\n",
                    map.seed,
                    markdown_code(map.code.as_deref()),
                    map.offer + 1
                )?;
                writeln!(out, "```text\n{}```\n", map.rendering)?;
            }
        }
        Report::Audit { summary, .. } => {
            writeln!(out, "## Summary\n")?;
            writeln!(out, "- **Maps generated**: {}", summary.maps)?;
            writeln!(out, "- **Failed**: {}", summary.failed)?;
            writeln!(out, "- **Mean nodes**: {:.1}", summary.mean_nodes)?;
            writeln!(out, "- **Mean edges**: {:.1}\n", summary.mean_edges)?;
            writeln!(out, "| kind | share |\n|------|-------|")?;
            for (kind, share) in &summary.kind_share {
                writeln!(out, "| {} | {:.1}% |", kind.key(), share * 100.0)?;
            }
            if !summary.failures.is_empty() {
                writeln!(out, "\n## Failures\n")?;
                for failure in &summary.failures {
                    writeln!(out, "- {failure}")?;
                }
            }
        }
        Report::Odds { rows } => {
            let header: Vec<&str> = Rank::ALL.iter().map(|rank| rank.key()).collect();
            writeln!(out, "| power | band | {} |", header.join(" | "))?;
            writeln!(out, "|---|---|{}", "---|".repeat(header.len()))?;
            for row in rows {
                let cells: Vec<String> = Rank::ALL
                    .iter()
                    .map(|rank| format!("{:.2}", row.odds.get(rank).copied().unwrap_or(0.0)))
                    .collect();
                writeln!(
                    out,
                    "| {:.1} | {}..={} | {} |",
                    row.power,
                    row.floor,
                    row.ceiling,
                    cells.join(" | ")
                )?;
            }
        }
        Report::Power { report } => {
            writeln!(out, "| slot | part | score |\n|---|---|---|")?;
            for entry in report.breakdown.equipment.iter().chain(&report.breakdown.chassis) {
                let slot = entry.slot.map_or("chassis", |slot| slot.key());
                writeln!(out, "| {slot} | {} | {:.2} |", entry.name, entry.score)?;
            }
            writeln!(out, "\n**Total power**: {:.2}", report.breakdown.total)?;
        }
        Report::Walk { walks } => {
            for record in walks {
                writeln!(
                    out,
                    "## Seed {}{}: {:?}\n",
                    record.seed,
                    markdown_code(record.code.as_deref()),
                    record.outcome
                )?;
                for line in &record.encounters {
                    writeln!(out, "1. {line}")?;
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wreckroad_game::EncounterKind;

    fn odds_report() -> Report {
        Report::Odds {
            rows: vec![OddsRow {
                power: 0.0,
                floor: Rank::Starter,
                ceiling: Rank::Starter,
                odds: Rank::ALL.into_iter().map(|rank| (rank, 1.0)).collect(),
            }],
        }
    }

    fn failing_audit() -> Report {
        Report::Audit {
            summary: AuditSummary {
                maps: 2,
                failed: 1,
                mean_nodes: 20.0,
                mean_edges: 30.0,
                kind_share: BTreeMap::from([(EncounterKind::Battle, 1.0)]),
                failures: vec!["seed 1 offer 0: DeadEnd".to_string()],
                elapsed_ms: 3,
            },
            records: Vec::new(),
        }
    }

    #[test]
    fn json_report_is_tagged_by_mode() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &odds_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["mode"], "odds");
        assert_eq!(value["rows"][0]["floor"], "starter");
    }

    #[test]
    fn markdown_odds_table_has_a_column_per_rank() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &odds_report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("| power | band | starter | common | uncommon | rare | epic |"));
        assert!(text.contains("| 0.0 | starter..=starter | 1.00 |"));
    }

    #[test]
    fn audit_failures_fail_the_report() {
        let report = failing_audit();
        assert!(!report.passed());
        assert!(odds_report().passed());
        let mut out = Vec::new();
        generate_console_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Map Audit Summary"));
        assert!(text.contains("DeadEnd"));
    }
}

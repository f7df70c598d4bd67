use jobrec_client_core::{
    DatasetCandidate, EvaluationSnapshot, FetchStatus, GapView, OverlayState,
    RecommendationSnapshot, RowStatus, NDCG_AT_K, PRECISION_AT_K, RECALL_AT_K,
};

const HEADLINE_METRICS: [&str; 3] = [PRECISION_AT_K, RECALL_AT_K, NDCG_AT_K];

pub fn candidates(listing: &[DatasetCandidate]) -> String {
    if listing.is_empty() {
        return "No dataset available.\n".to_string();
    }

    let lines: Vec<String> = listing
        .iter()
        .map(|candidate| {
            let summary = candidate.summary.trim();
            let summary = if summary.is_empty() { "No summary" } else { summary };
            format!("[{}] {}", candidate.resume_id, clamp(summary, 160))
        })
        .collect();
    block(lines)
}

pub fn recommendations(snapshot: &RecommendationSnapshot) -> String {
    let mut lines = vec![format!(
        "Recommendations for {} (mode: {})",
        snapshot.profile,
        snapshot.mode.label()
    )];

    match &snapshot.status {
        FetchStatus::Loading => lines.push("Loading...".to_string()),
        FetchStatus::Failed(message) => {
            lines.push(format!("Unable to load recommendations: {message}"))
        }
        FetchStatus::Ready if snapshot.results.is_empty() => {
            lines.push("No recommendations.".to_string())
        }
        FetchStatus::Idle | FetchStatus::Ready => {}
    }

    for (index, rec) in snapshot.results.iter().enumerate() {
        let level = rec.experience_level.as_deref().unwrap_or("");
        lines.push(format!("{:>2}. {} {}", index + 1, rec.title, level));
        lines.push(format!(
            "    Score: {:.3}  embed {:.2} | skill {:.2} | exp {:.2} | kw {:.2}",
            rec.score, rec.breakdown.embed, rec.breakdown.skill, rec.breakdown.exp, rec.breakdown.kw
        ));
        lines.push(match &rec.job_id {
            Some(job_id) => format!("    job: {job_id}"),
            None => "    job: (missing id, gap view unavailable)".to_string(),
        });
    }
    block(lines)
}

pub fn overlay(state: &OverlayState) -> String {
    match state {
        OverlayState::Closed => String::new(),
        OverlayState::Loading { job_id } => format!("Loading skill gaps for {job_id}...\n"),
        OverlayState::Failed { job_id, message } => {
            format!("Unable to load skill gaps for {job_id}: {message}\n")
        }
        OverlayState::Open { job_id, report } => gap_view(&GapView::from_report(job_id, report)),
    }
}

pub fn gap_view(view: &GapView) -> String {
    let mut lines = vec![
        format!("Skill Gaps ({})", view.job_id),
        format!("Present: {}", view.present.join(", ")),
    ];
    if view.present_hidden > 0 {
        lines.push(format!("  (+{} more)", view.present_hidden));
    }
    lines.push(format!("Missing: {}", view.missing.join(", ")));
    lines.push(format!("Weak: {}", view.weak.join(", ")));

    lines.push("Suggestions:".to_string());
    for group in &view.suggestions {
        lines.push(format!("  {}", group.skill));
        for (index, course) in group.courses.iter().enumerate() {
            lines.push(format!(
                "    {}. {} - {} ({}h)",
                index + 1,
                course.course_name,
                course.provider,
                course.hours
            ));
        }
    }

    lines.push("3-Month Roadmap:".to_string());
    let roadmap = view.roadmap.strip_suffix('\n').unwrap_or(&view.roadmap);
    lines.push(roadmap.to_string());
    block(lines)
}

pub fn evaluation(snapshot: &EvaluationSnapshot) -> String {
    let mut lines = vec![format!("Offline Evaluation (K = {})", snapshot.k)];

    let Some(table) = &snapshot.table else {
        let pending = if snapshot.running { "Running..." } else { "No results yet." };
        lines.push(pending.to_string());
        return block(lines);
    };

    if table.k != snapshot.k {
        lines.push(format!("(showing results for K = {}; rerun to refresh)", table.k));
    }

    for row in &table.rows {
        lines.push(row.mode.label().to_uppercase());
        match &row.status {
            RowStatus::Available(metrics) => {
                for name in HEADLINE_METRICS {
                    lines.push(match metrics.get(name) {
                        Some(value) => format!("  {name}: {value:.3}"),
                        None => format!("  {name}: -"),
                    });
                }
                lines.extend(
                    metrics
                        .iter()
                        .filter(|(name, _)| !HEADLINE_METRICS.contains(&name.as_str()))
                        .map(|(name, value)| format!("  {name}: {value:.3}")),
                );
            }
            RowStatus::Unavailable(reason) => lines.push(format!("  unavailable: {reason}")),
        }
    }
    block(lines)
}

/// Joins lines into newline-terminated output.
fn block(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn clamp(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let mut clipped: String = single_line.chars().take(max_chars).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobrec_client_core::{
        EvaluationRow, EvaluationTable, GapReport, Metrics, OrderedSuggestions, ProfileId,
        Recommendation, ScoreBreakdown, ScoringMode,
    };

    #[test]
    fn empty_listing_says_so() {
        assert_eq!(candidates(&[]), "No dataset available.\n");
        let listing = vec![DatasetCandidate {
            resume_id: "7".to_string(),
            summary: "  ".to_string(),
        }];
        assert_eq!(candidates(&listing), "[7] No summary\n");
    }

    #[test]
    fn recommendation_rows_show_breakdown_and_missing_ids() {
        let snapshot = RecommendationSnapshot {
            profile: ProfileId::dataset("42"),
            mode: ScoringMode::Embedding,
            status: FetchStatus::Ready,
            results: vec![Recommendation {
                job_id: None,
                title: "Analyst".to_string(),
                experience_level: Some("Entry".to_string()),
                score: 0.5,
                breakdown: ScoreBreakdown {
                    embed: 0.25,
                    skill: 0.5,
                    exp: 1.0,
                    kw: 0.0,
                },
            }],
        };

        let text = recommendations(&snapshot);
        assert!(text.contains("dataset-42 (mode: Embedding)"));
        assert!(text.contains("Score: 0.500  embed 0.25 | skill 0.50 | exp 1.00 | kw 0.00"));
        assert!(text.contains("gap view unavailable"));
    }

    #[test]
    fn roadmap_is_printed_verbatim() {
        let report = GapReport {
            present: Vec::new(),
            missing: vec!["sql".to_string()],
            weak: Vec::new(),
            suggestions: OrderedSuggestions::default(),
            roadmap: "Month 1: **sql**\nMonth 2: projects".to_string(),
        };
        let text = gap_view(&GapView::from_report("J1", &report));
        assert!(text.ends_with("3-Month Roadmap:\nMonth 1: **sql**\nMonth 2: projects\n"));
    }

    #[test]
    fn pending_states_have_single_status_lines() {
        let empty = RecommendationSnapshot {
            profile: ProfileId::live("p-1"),
            mode: ScoringMode::Hybrid,
            status: FetchStatus::Ready,
            results: Vec::new(),
        };
        assert_eq!(
            recommendations(&empty),
            "Recommendations for p-1 (mode: Hybrid)\nNo recommendations.\n"
        );

        let running = EvaluationSnapshot {
            k: 10,
            running: true,
            table: None,
        };
        assert_eq!(evaluation(&running), "Offline Evaluation (K = 10)\nRunning...\n");
        assert_eq!(overlay(&OverlayState::Closed), "");
    }

    #[test]
    fn unavailable_rows_render_in_place() {
        let metrics: Metrics = [("precision@k".to_string(), 0.12345)].into_iter().collect();
        let snapshot = EvaluationSnapshot {
            k: 5,
            running: false,
            table: Some(EvaluationTable {
                k: 5,
                rows: vec![
                    EvaluationRow {
                        mode: ScoringMode::Baseline,
                        status: RowStatus::Available(metrics),
                    },
                    EvaluationRow {
                        mode: ScoringMode::Embedding,
                        status: RowStatus::Unavailable("backend returned 500: ".to_string()),
                    },
                ],
            }),
        };

        let text = evaluation(&snapshot);
        assert!(text.contains("BASELINE\n  precision@k: 0.123\n  recall@k: -"));
        assert!(text.contains("EMBEDDING\n  unavailable"));
    }
}

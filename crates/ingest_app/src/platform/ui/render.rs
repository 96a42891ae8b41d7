use chrono::{DateTime, Local};
use ingest_core::{AppViewModel, Phase, StepStatus, NO_RESULT_PLACEHOLDER};

const RAW_PLACEHOLDER: &str = "Preview available after extraction.";
const DETAIL_PREVIEW_CHARS: usize = 160;

/// Renders the status panel: banner, stepper, file list, notices and errors.
pub fn render(view: &AppViewModel, finished_at: Option<DateTime<Local>>) -> Vec<String> {
    let mut lines = Vec::new();

    let mut banner = format!("== {} ==", view.status_line());
    if view.phase == Phase::Processing {
        banner.push_str(&format!(" {}%", view.progress));
    }
    if let Some(at) = finished_at {
        banner.push_str(&format!(" (finished {})", at.format("%H:%M:%S")));
    }
    lines.push(banner);
    lines.push(stepper_line(view));

    if view.files.is_empty() {
        lines.push(format!("No files staged (limit {}MB).", view.max_total_mb));
    } else {
        lines.push(format!(
            "Files ({}), total {} of {}MB:",
            view.files.len(),
            view.total_size,
            view.max_total_mb
        ));
        for row in &view.files {
            lines.push(format!("  [{}] {}  {}", row.index, row.name, row.size));
        }
    }

    if let Some(notice) = &view.notice {
        lines.push(format!("! {notice}"));
    }

    if let Some(error) = &view.error {
        lines.push(format!("Error: {}", error.message));
        if let Some(detail) = &error.detail {
            let (preview, truncated) = preview(detail, DETAIL_PREVIEW_CHARS);
            lines.push(format!("  {preview}"));
            if truncated {
                lines.push("  (type `detail` for the full response)".to_string());
            }
        }
    }

    if !view.sources.is_empty() {
        lines.push(format!("Sources: {}", view.sources.join(", ")));
    }

    if view.result_json.is_some() {
        lines.push("Result ready: type `json` or `raw`.".to_string());
    }
    lines
}

pub fn render_json(view: &AppViewModel) -> String {
    view.result_json
        .clone()
        .unwrap_or_else(|| NO_RESULT_PLACEHOLDER.to_string())
}

pub fn render_raw(view: &AppViewModel) -> String {
    view.raw_text
        .clone()
        .unwrap_or_else(|| RAW_PLACEHOLDER.to_string())
}

pub fn render_detail(view: &AppViewModel) -> String {
    match &view.error {
        Some(error) => error
            .detail
            .clone()
            .unwrap_or_else(|| error.message.clone()),
        None => "No error.".to_string(),
    }
}

fn stepper_line(view: &AppViewModel) -> String {
    let steps: Vec<String> = view
        .steps
        .iter()
        .map(|step| {
            let mark = match step.status {
                StepStatus::Done => 'x',
                StepStatus::Active => '>',
                StepStatus::Pending => ' ',
            };
            format!("[{mark}] {}", step.stage)
        })
        .collect();
    let mut line = steps.join("  ");
    if view.failed {
        line.push_str("  FAILED");
    }
    line
}

/// First line of `text`, cut to `max_chars`. The flag reports whether
/// anything was left out.
fn preview(text: &str, max_chars: usize) -> (String, bool) {
    let first_line = text.lines().next().unwrap_or_default();
    let mut cut: String = first_line.chars().take(max_chars).collect();
    let truncated = cut.len() < text.trim_end().len();
    if cut.len() < first_line.len() {
        cut.push_str("...");
    }
    (cut, truncated)
}

#[cfg(test)]
mod tests {
    use ingest_core::{
        update, AppState, FileCandidate, JobSnapshot, JobStatus, Msg, Stage, TransportError,
    };
    use serde_json::json;

    use super::*;

    fn staged() -> AppState {
        let (state, _) = update(
            AppState::new(),
            Msg::FilesAdded(vec![FileCandidate::in_memory(
                "report.pdf",
                Some("application/pdf".to_string()),
                vec![0u8; 1024 * 1024],
            )]),
        );
        state
    }

    #[test]
    fn idle_view_lists_files_and_upload_step() {
        let lines = render(&staged().view(), None);
        assert_eq!(lines[0], "== Status: IDLE ==");
        assert!(lines[1].starts_with("[>] UPLOAD  [ ] EXTRACT"));
        assert_eq!(lines[2], "Files (1), total 1.00MB of 50MB:");
        assert_eq!(lines[3], "  [0] report.pdf  1.00MB");
    }

    #[test]
    fn upload_failure_shows_message_and_detail() {
        let (state, _) = update(staged(), Msg::SubmitClicked);
        let (state, _) = update(
            state,
            Msg::SubmitFailed {
                run_id: 1,
                error: TransportError::new("413 Payload Too Large", "body too large"),
            },
        );
        let view = state.view();
        let lines = render(&view, None);
        assert!(lines[1].ends_with("FAILED"));
        assert!(lines.contains(&"Error: Upload failed.".to_string()));
        assert!(lines.contains(&"  body too large".to_string()));
        assert_eq!(render_detail(&view), "body too large");
    }

    #[test]
    fn result_panes_fall_back_to_placeholders() {
        let view = staged().view();
        assert_eq!(render_json(&view), NO_RESULT_PLACEHOLDER);
        assert_eq!(render_raw(&view), RAW_PLACEHOLDER);
        assert_eq!(render_detail(&view), "No error.");
    }

    #[test]
    fn done_view_offers_the_result() {
        let (state, _) = update(staged(), Msg::SubmitClicked);
        let snapshot = JobSnapshot::new(JobStatus::Done)
            .with_stage(Stage::Output)
            .with_result(json!({"scope1": 12}), "raw text");
        let (state, _) = update(state, Msg::SyncResponded { run_id: 1, snapshot });
        let view = state.view();

        let lines = render(&view, None);
        assert_eq!(lines[0], "== Status: DONE ==");
        assert_eq!(lines.last().unwrap(), "Result ready: type `json` or `raw`.");
        assert!(render_json(&view).contains("\"scope1\": 12"));
        assert_eq!(render_raw(&view), "raw text");
    }

    #[test]
    fn done_view_lists_processed_sources() {
        let (state, _) = update(staged(), Msg::SubmitClicked);
        let mut snapshot = JobSnapshot::new(JobStatus::Done)
            .with_stage(Stage::Output)
            .with_result(json!({}), "");
        snapshot.source_files = vec!["report.pdf".to_string(), "data.xlsx".to_string()];
        let (state, _) = update(state, Msg::SyncResponded { run_id: 1, snapshot });

        let lines = render(&state.view(), None);
        assert!(lines.contains(&"Sources: report.pdf, data.xlsx".to_string()));
    }

    #[test]
    fn sources_are_hidden_until_done() {
        let lines = render(&staged().view(), None);
        assert!(!lines.iter().any(|line| line.starts_with("Sources:")));
    }

    #[test]
    fn long_detail_is_previewed() {
        let text = format!("{}\nsecond line", "x".repeat(200));
        let (cut, truncated) = preview(&text, 10);
        assert_eq!(cut, "xxxxxxxxxx...");
        assert!(truncated);
        assert_eq!(preview("short", 10), ("short".to_string(), false));
    }
}

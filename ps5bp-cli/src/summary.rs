use ps5bp_analyze::AnalysisRisk;
use ps5bp_core::PipelineReport;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";

fn risk_color(risk: AnalysisRisk, color: bool) -> &'static str {
    if !color {
        return "";
    }
    match risk {
        AnalysisRisk::None | AnalysisRisk::Low => GREEN,
        AnalysisRisk::Medium => YELLOW,
        AnalysisRisk::High | AnalysisRisk::Critical => RED,
    }
}

/// Prints a terminal-friendly summary of a completed pipeline run.
pub fn print(report: &PipelineReport, color: bool) {
    let bold = if color { BOLD } else { "" };
    let reset = if color { RESET } else { "" };

    println!("{bold}ps5bp backport report{reset}");
    println!("  files processed : {}", report.files.len());
    println!("  mean score      : {:.1}", report.overall_score_mean);
    if let Some(risk) = report.overall_risk_max {
        println!("  max risk        : {}{}{}", risk_color(risk, color), risk, reset);
    }
    if !report.fakelibs_installed.is_empty() {
        println!("  fakelibs        : {}", report.fakelibs_installed.join(", "));
    }
    if let Some(archive) = &report.archive_path {
        println!("  archive         : {}", archive.display());
    }
    println!("  elapsed         : {} ms", report.elapsed_ms);

    for file in &report.files {
        let marker = if file.error.is_some() { "!" } else { "-" };
        println!("  {marker} {}", file.path.display());
        if let Some(err) = &file.error {
            println!("      error: {err}");
        }
        for step in &file.steps {
            if step.ran {
                println!("      [ok] {}", step.step);
            } else if let Some(note) = &step.note {
                println!("      [skip] {}: {}", step.step, note);
            }
        }
    }
}

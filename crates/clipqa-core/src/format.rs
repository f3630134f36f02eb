use crate::types::{ScoreReport, Segment};

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}

/// Format a segment as an MM:SS–MM:SS range
pub fn format_segment(segment: Segment) -> String {
    format!(
        "{}–{}",
        format_timestamp(segment.start),
        format_timestamp(segment.end)
    )
}

/// Format a score report as human-readable markdown
pub fn format_report_readable(report: &ScoreReport) -> String {
    let mut output = String::new();

    output.push_str("# Answer scores\n\n");
    output.push_str(&format!("**Queries scored:** {}\n\n", report.results.len()));

    output.push_str("## Averages\n\n");
    output.push_str(&format!(
        "**BLEU:** {:.4} | **ROUGE-L:** {:.4} | **METEOR:** {:.4}\n\n",
        report.averages.bleu, report.averages.rouge_l, report.averages.meteor
    ));

    output.push_str("## Per query\n\n");
    for (i, score) in report.results.iter().enumerate() {
        output.push_str(&format!("### {}. {}\n\n", i + 1, score.query));
        output.push_str(&format!("• answer: {}\n", score.answer));
        output.push_str(&format!("• reference: {}\n", score.gt_answer));
        output.push_str(&format!(
            "• BLEU {:.4} | ROUGE-L {:.4} | METEOR {:.4}\n\n",
            score.bleu, score.rouge_l, score.meteor
        ));
    }

    output
}

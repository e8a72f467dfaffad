//! Console View - 终端渲染
//!
//! 结果与错误写到 stdout，日志走 stderr，二者互不干扰

use colored::{ColoredString, Colorize};

use crate::application::ports::EvaluationViewPort;
use crate::domain::evaluation::{Criterion, EvaluationResult, HistoryTier, Rating};
use crate::domain::history::{PromptHistory, Theme};

const BAR_WIDTH: usize = 20;

/// 终端视图
#[derive(Debug, Default)]
pub struct ConsoleView;

impl ConsoleView {
    pub fn new() -> Self {
        Self
    }

    /// 评估结果的文本形式
    pub fn format_accepted(result: &EvaluationResult) -> String {
        let rating = result.rating();
        let mut lines = vec![format!(
            "{} {}",
            format!("Score: {}/100", result.display_score()).as_str().bold(),
            paint_rating(rating, rating.as_str())
        )];

        lines.push(String::new());
        for criterion in Criterion::ALL {
            lines.push(format_criterion(result, criterion));
        }

        if !result.suggestions().is_empty() {
            lines.push(String::new());
            lines.push("Suggestions:".bold().to_string());
            for suggestion in result.suggestions() {
                lines.push(format!("  • {}", suggestion));
            }
        }

        lines.join("\n")
    }

    pub fn format_rejected(message: &str, title: &str) -> String {
        format!("{}\n{}", title.red().bold(), message)
    }

    pub fn format_history(history: &PromptHistory) -> String {
        if history.is_empty() {
            return "No evaluations yet.".dimmed().to_string();
        }

        history
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                format!(
                    "{:>2}. {} {}",
                    index,
                    paint_tier(entry.tier(), &format!("[{:>3}]", entry.score)),
                    entry.prompt
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl EvaluationViewPort for ConsoleView {
    fn set_busy(&self, busy: bool) {
        if busy {
            println!("{}", "⏳ Working...".dimmed());
        }
    }

    fn clear(&self) {}

    fn render_accepted(&self, result: &EvaluationResult) {
        println!("{}", Self::format_accepted(result));
    }

    fn render_rejected(&self, message: &str, title: &str) {
        println!("{}", Self::format_rejected(message, title));
    }

    fn alert(&self, message: &str) {
        println!("{}", message.yellow().bold());
    }

    fn render_history(&self, history: &PromptHistory) {
        println!("{}", "History".bold());
        println!("{}", Self::format_history(history));
    }

    fn render_improved(&self, improved: &str) {
        println!("{}", "Improved prompt:".bold());
        println!("{}", improved);
    }

    fn render_theme(&self, theme: Theme) {
        println!("Theme: {}", theme.as_str());
    }
}

fn format_criterion(result: &EvaluationResult, criterion: Criterion) -> String {
    let scores = result.criteria();
    let percent = scores.normalized_percent(criterion);
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH.saturating_sub(filled))
    );

    format!(
        "  {:<20} {} {:>2}/{}",
        criterion.label(),
        bar.as_str().cyan(),
        scores.clamped(criterion),
        criterion.max_points()
    )
}

fn paint_rating(rating: Rating, text: &str) -> ColoredString {
    match rating {
        Rating::Excellent => text.green().bold(),
        Rating::Good => text.yellow().bold(),
        Rating::NeedsWork => text.red().bold(),
    }
}

fn paint_tier(tier: HistoryTier, text: &str) -> ColoredString {
    match tier {
        HistoryTier::Excellent => text.green(),
        HistoryTier::Good => text.cyan(),
        HistoryTier::Fair => text.yellow(),
        HistoryTier::Poor => text.red(),
    }
}

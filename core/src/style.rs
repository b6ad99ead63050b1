use colored::{Color, ColoredString, Colorize};

use crate::testing::{CaseStatus, JudgeResult, Verdict};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for CaseStatus {
    fn color(&self) -> Color {
        use CaseStatus::*;
        if !self::is_truecolor_supported() {
            return match self {
                AC => Color::Green,
                WA => Color::Yellow,
                RE => Color::Magenta,
            };
        }

        match self {
            AC => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            WA => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            RE => Color::TrueColor {
                r: 171,
                g: 40,
                b: 200,
            },
        }
    }
}

impl ColorTheme for Verdict {
    fn color(&self) -> Color {
        use Verdict::*;
        match self {
            Accepted => CaseStatus::AC.color(),
            WrongAnswer(_) => CaseStatus::WA.color(),
            RuntimeError(_) => CaseStatus::RE.color(),
            TimeLimitExceeded => Color::Red,
            SystemError | TestcasesMissing => Color::BrightBlack,
        }
    }
}

fn badge(label: &str, bg: Color) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightWhite
    };
    format!(" {} ", label).on_color(bg).color(fg).bold()
}

pub fn status_icon(status: CaseStatus) -> ColoredString {
    badge(&status.to_string(), status.color())
}

pub fn verdict_icon(verdict: &Verdict) -> ColoredString {
    badge(&verdict.to_string(), verdict.color())
}

pub fn print_judge_result(res: &JudgeResult) {
    for outcome in &res.details {
        println!("Testcase {} ... {}", outcome.test.cyan(), status_icon(outcome.status));
    }
    let bar = "-".repeat(5);
    println!("{} {} {}", bar, verdict_icon(&res.verdict), bar);
}

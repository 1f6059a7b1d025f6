#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Match judge that compares player presses with the expected sequence.

use simon_core::{ButtonId, Command, Event, JudgeView};

/// Outcome of judging a single press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The press was correct and more buttons remain.
    Advance,
    /// The press was correct and finished the sequence.
    Complete,
    /// The press was wrong.
    Fail,
}

impl Verdict {
    fn command(self, pressed: ButtonId) -> Command {
        match self {
            Self::Advance => Command::AcceptPress,
            Self::Complete => Command::CompleteRound,
            Self::Fail => Command::FailRun { pressed },
        }
    }
}

/// Judges `pressed` against the view, or returns `None` when presses are
/// not being judged.
#[must_use]
pub fn judge(view: JudgeView, pressed: ButtonId) -> Option<Verdict> {
    if !view.is_accepting() {
        return None;
    }
    let expected = view.expected()?;
    if pressed != expected {
        return Some(Verdict::Fail);
    }
    if view.progress() + 1 >= view.length() {
        Some(Verdict::Complete)
    } else {
        Some(Verdict::Advance)
    }
}

/// Pure system that turns press events into progress commands.
#[derive(Debug, Default)]
pub struct Judge;

impl Judge {
    /// Creates a judge.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes press events and emits at most one verdict command.
    pub fn handle(&mut self, events: &[Event], view: JudgeView, out: &mut Vec<Command>) {
        let pressed = events.iter().rev().find_map(|event| match event {
            Event::ButtonPressed { button } => Some(*button),
            _ => None,
        });
        let Some(pressed) = pressed else {
            return;
        };

        if let Some(verdict) = judge(view, pressed) {
            out.push(verdict.command(pressed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: ButtonId = ButtonId::ALL[0];
    const RED: ButtonId = ButtonId::ALL[2];

    #[test]
    fn correct_press_advances_until_last() {
        assert_eq!(
            judge(JudgeView::new(Some(GREEN), 0, 3, true), GREEN),
            Some(Verdict::Advance)
        );
        assert_eq!(
            judge(JudgeView::new(Some(GREEN), 2, 3, true), GREEN),
            Some(Verdict::Complete)
        );
    }

    #[test]
    fn wrong_press_fails_at_any_cursor() {
        for progress in 0..3 {
            assert_eq!(
                judge(JudgeView::new(Some(GREEN), progress, 3, true), RED),
                Some(Verdict::Fail)
            );
        }
    }

    #[test]
    fn presses_are_ignored_when_not_accepting() {
        assert_eq!(judge(JudgeView::new(Some(GREEN), 0, 1, false), RED), None);
    }

    #[test]
    fn handle_emits_matching_command() {
        let mut judge_system = Judge::new();
        let mut out = Vec::new();
        judge_system.handle(
            &[
                Event::TimeAdvanced {
                    dt: std::time::Duration::from_millis(16),
                },
                Event::ButtonPressed { button: RED },
            ],
            JudgeView::new(Some(GREEN), 0, 1, true),
            &mut out,
        );
        assert_eq!(out, vec![Command::FailRun { pressed: RED }]);

        out.clear();
        judge_system.handle(&[], JudgeView::new(Some(GREEN), 0, 1, true), &mut out);
        assert!(out.is_empty());
    }
}

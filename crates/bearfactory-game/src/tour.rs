/*
[INPUT]:  Next/skip actions and Keep/Toss presses while onboarding
[OUTPUT]: Tour step progression; suspends scoring while active
[POS]:    Practice mode - first-round onboarding overlay state
[UPDATE]: When steps are added or the advancing input for a step changes
*/

use serde::{Deserialize, Serialize};

use crate::task::Choice;

pub const TOUR_STEPS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourStep {
    /// Introduces the belt. Advances on next.
    Welcome,
    /// Points at the toolbox. Advances on Keep.
    Keep,
    /// Points at the trash. Advances on Toss.
    Toss,
    /// Last word before the round. Advances on next.
    Ready,
}

impl TourStep {
    pub fn index(self) -> usize {
        match self {
            TourStep::Welcome => 0,
            TourStep::Keep => 1,
            TourStep::Toss => 2,
            TourStep::Ready => 3,
        }
    }

    fn following(self) -> Option<TourStep> {
        match self {
            TourStep::Welcome => Some(TourStep::Keep),
            TourStep::Keep => Some(TourStep::Toss),
            TourStep::Toss => Some(TourStep::Ready),
            TourStep::Ready => None,
        }
    }

    /// Choice that advances this step, if any.
    pub fn expected_choice(self) -> Option<Choice> {
        match self {
            TourStep::Keep => Some(Choice::Keep),
            TourStep::Toss => Some(Choice::Toss),
            TourStep::Welcome | TourStep::Ready => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TourStep::Welcome => "Welcome to the factory",
            TourStep::Keep => "The toolbox",
            TourStep::Toss => "The trash can",
            TourStep::Ready => "Ready to sort",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            TourStep::Welcome => {
                "Tasks ride the belt from left to right. Sort each before it falls off."
            }
            TourStep::Keep => "Tasks that move your goal forward go in the toolbox. Press K.",
            TourStep::Toss => "Distractions go in the trash. Press T.",
            TourStep::Ready => "The belt speeds up as you go. Good luck!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourProgress {
    Advanced(TourStep),
    Finished,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tour {
    active: bool,
    step: Option<TourStep>,
    has_started: bool,
}

impl Tour {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tour that never shows, for sessions configured without onboarding.
    pub fn completed() -> Self {
        Self {
            active: false,
            step: None,
            has_started: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn step(&self) -> Option<TourStep> {
        self.step
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// Starts the tour on the first call only. Returns whether it started.
    pub fn begin(&mut self) -> bool {
        if self.has_started {
            return false;
        }
        self.has_started = true;
        self.active = true;
        self.step = Some(TourStep::Welcome);
        true
    }

    /// Explicit next action; only the informational steps accept it.
    pub fn next(&mut self) -> TourProgress {
        match self.current() {
            Some(step) if step.expected_choice().is_none() => self.advance(step),
            _ => TourProgress::Ignored,
        }
    }

    /// Keep/Toss while the tour is up.
    pub fn press(&mut self, choice: Choice) -> TourProgress {
        match self.current() {
            Some(step) if step.expected_choice() == Some(choice) => self.advance(step),
            _ => TourProgress::Ignored,
        }
    }

    pub fn skip(&mut self) -> TourProgress {
        if !self.active {
            return TourProgress::Ignored;
        }
        self.finish()
    }

    /// Hides the tour. `has_started` survives so a reset does not replay it.
    pub fn reset(&mut self) {
        self.active = false;
        self.step = None;
    }

    fn current(&self) -> Option<TourStep> {
        if self.active { self.step } else { None }
    }

    fn advance(&mut self, step: TourStep) -> TourProgress {
        match step.following() {
            Some(next) => {
                self.step = Some(next);
                TourProgress::Advanced(next)
            }
            None => self.finish(),
        }
    }

    fn finish(&mut self) -> TourProgress {
        self.active = false;
        self.step = None;
        TourProgress::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_walkthrough() {
        let mut tour = Tour::new();
        assert!(tour.begin());
        assert_eq!(tour.step(), Some(TourStep::Welcome));

        assert_eq!(tour.press(Choice::Keep), TourProgress::Ignored);
        assert_eq!(tour.next(), TourProgress::Advanced(TourStep::Keep));

        assert_eq!(tour.next(), TourProgress::Ignored);
        assert_eq!(tour.press(Choice::Toss), TourProgress::Ignored);
        assert_eq!(tour.press(Choice::Keep), TourProgress::Advanced(TourStep::Toss));

        assert_eq!(tour.press(Choice::Keep), TourProgress::Ignored);
        assert_eq!(tour.press(Choice::Toss), TourProgress::Advanced(TourStep::Ready));

        assert_eq!(tour.next(), TourProgress::Finished);
        assert!(!tour.is_active());
        assert_eq!(tour.next(), TourProgress::Ignored);
    }

    #[test]
    fn test_skip_from_any_step() {
        let mut tour = Tour::new();
        tour.begin();
        tour.next();
        assert_eq!(tour.skip(), TourProgress::Finished);
        assert!(!tour.is_active());
        assert_eq!(tour.skip(), TourProgress::Ignored);
    }

    #[test]
    fn test_begin_only_once_per_session() {
        let mut tour = Tour::new();
        assert!(tour.begin());
        tour.reset();
        assert!(!tour.is_active());
        assert!(tour.has_started());
        assert!(!tour.begin());
    }

    #[test]
    fn test_completed_tour_never_shows() {
        let mut tour = Tour::completed();
        assert!(!tour.begin());
        assert!(!tour.is_active());
    }

    #[test]
    fn test_step_indices_cover_all_steps() {
        let steps = [TourStep::Welcome, TourStep::Keep, TourStep::Toss, TourStep::Ready];
        assert_eq!(steps.len(), TOUR_STEPS);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.index(), i);
        }
    }
}

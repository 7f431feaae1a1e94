// Reaction-time drill.
//
// `idle -> waiting -> go -> idle` per round, with `waiting -> early` when the
// player jumps the gun. Five recorded rounds complete the drill. Raw reaction
// times are corrected by a one-shot calibration offset that estimates how
// late the host delivers timer callbacks.

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::Rng;

use crate::util::mean;

pub const ROUNDS: u8 = 5;
pub const MIN_DELAY_MS: f64 = 1000.0;
pub const MAX_DELAY_MS: f64 = 7000.0;
/// Upper bound on the calibration offset
pub const MAX_CALIBRATION_MS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ReflexState {
    #[default]
    Idle,
    Waiting,
    Go,
    Early,
}

/// A completed round
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflexRound {
    /// 1-based
    pub index: u8,
    pub armed_at_ms: f64,
    pub reaction_ms: f64,
}

/// What an input did to the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReflexInput {
    /// A round began; arm after `delay_ms`
    Started { delay_ms: f64 },
    /// Input while waiting; no sample recorded
    Early,
    Recorded(ReflexRound),
    /// The last round was recorded
    Completed(ReflexRound),
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ReflexTimer {
    state: ReflexState,
    round: u8,
    armed_at_ms: Option<f64>,
    calibration_ms: f64,
    rounds: Vec<ReflexRound>,
}

impl ReflexTimer {
    pub fn new(calibration_ms: f64) -> Self {
        Self {
            state: ReflexState::Idle,
            round: 1,
            armed_at_ms: None,
            calibration_ms: clamp_offset(calibration_ms),
            rounds: Vec::with_capacity(ROUNDS as usize),
        }
    }

    pub fn state(&self) -> ReflexState {
        self.state
    }

    /// Current (or, once complete, last) round index, 1-based
    pub fn round(&self) -> u8 {
        self.round
    }

    pub fn calibration_ms(&self) -> f64 {
        self.calibration_ms
    }

    pub fn rounds(&self) -> &[ReflexRound] {
        &self.rounds
    }

    pub fn samples(&self) -> Vec<f64> {
        self.rounds.iter().map(|r| r.reaction_ms).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.rounds.len() >= ROUNDS as usize
    }

    pub fn mean_ms(&self) -> Option<f64> {
        mean(&self.samples())
    }

    /// idle/early -> waiting. Returns the random wait before the go signal.
    pub fn begin_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<f64> {
        if self.is_complete() || !matches!(self.state, ReflexState::Idle | ReflexState::Early) {
            return None;
        }
        let delay_ms = rng.gen_range(MIN_DELAY_MS..=MAX_DELAY_MS);
        self.state = ReflexState::Waiting;
        self.armed_at_ms = None;
        debug!("reflex round {} waiting {:.0}ms", self.round, delay_ms);
        Some(delay_ms)
    }

    /// waiting -> go, stamping the moment the signal was shown
    pub fn arm(&mut self, now_ms: f64) -> bool {
        if self.state != ReflexState::Waiting {
            return false;
        }
        self.state = ReflexState::Go;
        self.armed_at_ms = Some(now_ms);
        true
    }

    pub fn on_input<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> ReflexInput {
        match self.state {
            ReflexState::Idle | ReflexState::Early => match self.begin_round(rng) {
                Some(delay_ms) => ReflexInput::Started { delay_ms },
                None => ReflexInput::Ignored,
            },
            ReflexState::Waiting => {
                self.state = ReflexState::Early;
                debug!("reflex round {} clicked early", self.round);
                ReflexInput::Early
            }
            ReflexState::Go => {
                let armed_at_ms = self.armed_at_ms.unwrap_or(now_ms);
                let reaction_ms = (now_ms - armed_at_ms - self.calibration_ms).max(0.0);
                let round = ReflexRound {
                    index: self.round,
                    armed_at_ms,
                    reaction_ms,
                };
                self.rounds.push(round);
                self.state = ReflexState::Idle;
                self.armed_at_ms = None;
                info!("reflex round {} reaction {:.0}ms", self.round, reaction_ms);

                if self.is_complete() {
                    ReflexInput::Completed(round)
                } else {
                    self.round += 1;
                    ReflexInput::Recorded(round)
                }
            }
        }
    }
}

pub fn clamp_offset(ms: f64) -> f64 {
    if ms.is_nan() {
        return 0.0;
    }
    ms.clamp(0.0, MAX_CALIBRATION_MS)
}

/// Source of the system-delay offset subtracted from reaction times.
/// `Engine::start_session` calls `measure` on the engine thread, so it must
/// return promptly.
pub trait Calibrator {
    fn measure(&mut self) -> f64;
}

/// A known offset, for tests and for hosts that measured it elsewhere
#[derive(Debug, Clone, Copy)]
pub struct FixedCalibration(pub f64);

impl Calibrator for FixedCalibration {
    fn measure(&mut self) -> f64 {
        clamp_offset(self.0)
    }
}

/// Times a coarse timer-backed wait (1ms sleep) against a fine-grained yield
/// and averages the overshoot. A rough estimate of callback latency, nothing more.
///
/// Sleeps `samples` times, so run it once before any session starts and hand
/// the result to the engine as a `FixedCalibration`.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerGapCalibrator {
    pub samples: usize,
}

impl Default for SchedulerGapCalibrator {
    fn default() -> Self {
        Self { samples: 5 }
    }
}

impl Calibrator for SchedulerGapCalibrator {
    fn measure(&mut self) -> f64 {
        let requested = Duration::from_millis(1);
        let gaps: Vec<f64> = (0..self.samples)
            .map(|_| {
                let start = Instant::now();
                thread::yield_now();
                let fine = start.elapsed();

                let start = Instant::now();
                thread::sleep(requested);
                let coarse = start.elapsed().saturating_sub(requested);

                coarse.saturating_sub(fine).as_secs_f64() * 1000.0
            })
            .collect();

        let offset = clamp_offset(mean(&gaps).unwrap_or(0.0));
        info!("reflex calibration offset {:.2}ms over {} samples", offset, gaps.len());
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn test_round_starts_with_delay_in_range() {
        let mut rng = rng();
        let mut timer = ReflexTimer::new(0.0);
        for _ in 0..50 {
            let mut t = timer.clone();
            let delay = t.begin_round(&mut rng).unwrap();
            assert!((MIN_DELAY_MS..=MAX_DELAY_MS).contains(&delay));
            assert_eq!(t.state(), ReflexState::Waiting);
        }
        assert!(timer.begin_round(&mut rng).is_some());
        assert!(timer.begin_round(&mut rng).is_none(), "already waiting");
    }

    #[test]
    fn test_early_click_records_nothing() {
        let mut rng = rng();
        let mut timer = ReflexTimer::new(0.0);
        timer.begin_round(&mut rng);

        assert_eq!(timer.on_input(500.0, &mut rng), ReflexInput::Early);
        assert_eq!(timer.state(), ReflexState::Early);
        assert!(timer.rounds().is_empty());

        // the next input restarts the same round
        assert!(matches!(
            timer.on_input(600.0, &mut rng),
            ReflexInput::Started { .. }
        ));
        assert_eq!(timer.state(), ReflexState::Waiting);
        assert_eq!(timer.round(), 1);
    }

    #[test]
    fn test_reaction_time_subtracts_calibration() {
        let mut rng = rng();
        let mut timer = ReflexTimer::new(12.0);
        timer.begin_round(&mut rng);
        assert!(timer.arm(2000.0));

        match timer.on_input(2250.0, &mut rng) {
            ReflexInput::Recorded(round) => {
                assert_eq!(round.index, 1);
                assert_eq!(round.reaction_ms, 238.0);
            }
            other => panic!("expected a recorded round, got {other:?}"),
        }
        assert_eq!(timer.state(), ReflexState::Idle);
        assert_eq!(timer.round(), 2);
    }

    #[test]
    fn test_reaction_time_never_negative() {
        let mut rng = rng();
        let mut timer = ReflexTimer::new(30.0);
        timer.begin_round(&mut rng);
        timer.arm(1000.0);
        match timer.on_input(1010.0, &mut rng) {
            ReflexInput::Recorded(round) => assert_eq!(round.reaction_ms, 0.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_five_rounds_complete_the_drill() {
        let mut rng = rng();
        let mut timer = ReflexTimer::new(0.0);
        let mut now = 0.0;
        let reactions = [200.0, 250.0, 300.0, 180.0, 220.0];

        for (i, reaction) in reactions.iter().enumerate() {
            let delay = match timer.on_input(now, &mut rng) {
                ReflexInput::Started { delay_ms } => delay_ms,
                other => panic!("expected start, got {other:?}"),
            };
            now = (now + delay).ceil();
            timer.arm(now);
            now += reaction;
            let outcome = timer.on_input(now, &mut rng);
            if i + 1 < reactions.len() {
                assert!(matches!(outcome, ReflexInput::Recorded(_)));
            } else {
                assert!(matches!(outcome, ReflexInput::Completed(_)));
            }
        }

        assert!(timer.is_complete());
        assert_eq!(timer.samples(), reactions.to_vec());
        assert_eq!(timer.mean_ms(), Some(230.0));
        assert_eq!(timer.on_input(now + 10.0, &mut rng), ReflexInput::Ignored);
    }

    #[test]
    fn test_arm_only_from_waiting() {
        let mut timer = ReflexTimer::new(0.0);
        assert!(!timer.arm(10.0));
        assert_eq!(timer.state(), ReflexState::Idle);
    }

    #[test]
    fn test_calibration_is_capped() {
        assert_eq!(clamp_offset(45.0), MAX_CALIBRATION_MS);
        assert_eq!(clamp_offset(-3.0), 0.0);
        assert_eq!(clamp_offset(f64::NAN), 0.0);
        assert_eq!(FixedCalibration(100.0).measure(), MAX_CALIBRATION_MS);
        assert_eq!(ReflexTimer::new(50.0).calibration_ms(), MAX_CALIBRATION_MS);
    }

    #[test]
    fn test_scheduler_gap_calibration_stays_within_cap() {
        let offset = SchedulerGapCalibrator { samples: 2 }.measure();
        assert!((0.0..=MAX_CALIBRATION_MS).contains(&offset));
    }
}

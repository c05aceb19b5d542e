//! RSVP playback clock.
//!
//! The clock owns no timer. Callers feed it `now_ms` through [`PlaybackClock::tick`]
//! and sleep until [`PlaybackClock::next_deadline_ms`]. Deadlines are computed
//! from an anchor instant and a tick count, so rounding of `60000 / wpm` never
//! accumulates. Every rate change or (re)start moves the anchor.

use log::debug;

use crate::text_policy::format_clock;


pub const SKIP_WORDS: usize = 10;
const MS_PER_MINUTE: u64 = 60_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    /// No deadline elapsed, or the clock is not playing.
    NoChange,
    Advanced,
    /// Reached the last word and paused.
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReaderConfig {
    pub wpm: u16,
    pub min_wpm: u16,
    pub max_wpm: u16,
    pub wpm_step: u16,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            wpm: 300,
            min_wpm: 100,
            max_wpm: 1000,
            wpm_step: 50,
        }
    }
}

impl ReaderConfig {
    /// Bounds are repaired so `1 <= min_wpm <= max_wpm` and `wpm` lies within them.
    pub fn normalized(self) -> Self {
        let min_wpm = self.min_wpm.max(1);
        let max_wpm = self.max_wpm.max(min_wpm);
        Self {
            wpm: self.wpm.clamp(min_wpm, max_wpm),
            min_wpm,
            max_wpm,
            wpm_step: self.wpm_step.max(1),
        }
    }

    pub fn clamp_wpm(&self, wpm: u16) -> u16 {
        wpm.clamp(self.min_wpm, self.max_wpm)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaybackPhase {
    Idle,
    Paused,
    Playing,
    /// Paused on the last word.
    Finished,
}

/// Snapshot published to observers after every change.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlaybackState {
    pub current_index: usize,
    pub total_words: usize,
    pub is_playing: bool,
    pub wpm: u16,
}

impl PlaybackState {
    pub fn phase(&self) -> PlaybackPhase {
        if self.is_playing {
            PlaybackPhase::Playing
        } else if self.current_index == 0 {
            PlaybackPhase::Idle
        } else if self.current_index + 1 >= self.total_words {
            PlaybackPhase::Finished
        } else {
            PlaybackPhase::Paused
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlaybackClock {
    config: ReaderConfig,
    total_words: usize,
    current_index: usize,
    is_playing: bool,
    anchor_ms: u64,
    ticks_since_anchor: u64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

impl PlaybackClock {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config: config.normalized(),
            total_words: 0,
            current_index: 0,
            is_playing: false,
            anchor_ms: 0,
            ticks_since_anchor: 0,
        }
    }

    pub fn config(&self) -> ReaderConfig {
        self.config
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_index: self.current_index,
            total_words: self.total_words,
            is_playing: self.is_playing,
            wpm: self.config.wpm,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_words(&self) -> usize {
        self.total_words
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn wpm(&self) -> u16 {
        self.config.wpm
    }

    /// Switch to a new word sequence of `total_words` words: index 0, paused.
    pub fn load(&mut self, total_words: usize) {
        self.total_words = total_words;
        self.current_index = 0;
        self.is_playing = false;
        self.ticks_since_anchor = 0;
        debug!("playback: load words={}", total_words);
    }

    pub fn play(&mut self, now_ms: u64) {
        if self.total_words == 0 || self.is_playing {
            return;
        }
        if self.current_index >= self.last_index() {
            self.current_index = 0;
        }
        self.is_playing = true;
        self.rebase(now_ms);
        debug!(
            "playback: play index={} wpm={}",
            self.current_index, self.config.wpm
        );
    }

    pub fn pause(&mut self) {
        if !self.is_playing {
            return;
        }
        self.is_playing = false;
        debug!("playback: pause index={}", self.current_index);
    }

    pub fn toggle(&mut self, now_ms: u64) {
        if self.is_playing {
            self.pause();
        } else {
            self.play(now_ms);
        }
    }

    pub fn reset(&mut self) {
        self.is_playing = false;
        self.current_index = 0;
    }

    pub fn skip_forward(&mut self) {
        self.go_to_word_index(self.current_index.saturating_add(SKIP_WORDS));
    }

    pub fn skip_backward(&mut self) {
        self.go_to_word_index(self.current_index.saturating_sub(SKIP_WORDS));
    }

    /// Jump to `floor(percent / 100 * N)`, clamped to the sequence. NaN is ignored.
    pub fn seek(&mut self, percent: f32) {
        if self.total_words == 0 || percent.is_nan() {
            return;
        }
        let fraction = f64::from(percent.clamp(0.0, 100.0)) / 100.0;
        let index = (fraction * self.total_words as f64).floor() as usize;
        self.go_to_word_index(index);
    }

    pub fn go_to_word_index(&mut self, index: usize) {
        if self.total_words == 0 {
            return;
        }
        self.current_index = index.min(self.last_index());
    }

    /// Set the rate, clamped to the configured bounds. Returns whether it changed.
    pub fn set_wpm(&mut self, wpm: u16, now_ms: u64) -> bool {
        let next = self.config.clamp_wpm(wpm);
        if next == self.config.wpm {
            return false;
        }
        self.config.wpm = next;
        if self.is_playing {
            self.rebase(now_ms);
        }
        debug!("playback: wpm={}", next);
        true
    }

    pub fn faster(&mut self, now_ms: u64) -> bool {
        let wpm = self.config.wpm.saturating_add(self.config.wpm_step);
        self.set_wpm(wpm, now_ms)
    }

    pub fn slower(&mut self, now_ms: u64) -> bool {
        let wpm = self.config.wpm.saturating_sub(self.config.wpm_step);
        self.set_wpm(wpm, now_ms)
    }

    /// Advance once per elapsed word period. Stops and pauses on the last word.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        let mut result = TickResult::NoChange;
        while let Some(deadline) = self.next_deadline_ms() {
            if now_ms < deadline {
                break;
            }
            if self.current_index >= self.last_index() {
                self.is_playing = false;
                debug!("playback: finished index={}", self.current_index);
                return TickResult::Finished;
            }
            self.current_index += 1;
            self.ticks_since_anchor += 1;
            result = TickResult::Advanced;
        }
        result
    }

    /// Instant of the next advance while playing.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        if !self.is_playing || self.total_words == 0 {
            return None;
        }
        let elapsed = (self.ticks_since_anchor + 1) * MS_PER_MINUTE / u64::from(self.config.wpm);
        Some(self.anchor_ms.saturating_add(elapsed))
    }

    pub fn word_interval_ms(&self) -> u64 {
        MS_PER_MINUTE / u64::from(self.config.wpm)
    }

    /// `100 * index / N`, or 0 for an empty sequence.
    pub fn progress_percent(&self) -> f32 {
        if self.total_words == 0 {
            return 0.0;
        }
        (self.current_index as f64 * 100.0 / self.total_words as f64) as f32
    }

    /// `(N - index) / wpm`.
    pub fn estimated_minutes_remaining(&self) -> f32 {
        let remaining = self.total_words.saturating_sub(self.current_index);
        (remaining as f64 / f64::from(self.config.wpm)) as f32
    }

    /// Remaining reading time as `m:ss`.
    pub fn time_remaining_label(&self) -> String {
        format_clock(f64::from(self.estimated_minutes_remaining()) * 60.0)
    }

    fn last_index(&self) -> usize {
        self.total_words.saturating_sub(1)
    }

    fn rebase(&mut self, now_ms: u64) {
        self.anchor_ms = now_ms;
        self.ticks_since_anchor = 0;
    }
}

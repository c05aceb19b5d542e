//! Semantic reader actions.
//!
//! Key bindings live with the host; the engine only sees what a key means.

use crate::playback::PlaybackClock;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReaderAction {
    TogglePlay,
    Play,
    Pause,
    Reset,
    SkipForward,
    SkipBackward,
    /// Raise the rate by the configured step.
    FasterStep,
    SlowerStep,
    SetWpm(u16),
    /// Jump to a position in percent of the sequence.
    Seek(f32),
    GoToWord(usize),
}

impl PlaybackClock {
    /// Apply one action. Returns whether the observable state changed.
    pub fn apply(&mut self, action: ReaderAction, now_ms: u64) -> bool {
        let before = self.state();
        match action {
            ReaderAction::TogglePlay => self.toggle(now_ms),
            ReaderAction::Play => self.play(now_ms),
            ReaderAction::Pause => self.pause(),
            ReaderAction::Reset => self.reset(),
            ReaderAction::SkipForward => self.skip_forward(),
            ReaderAction::SkipBackward => self.skip_backward(),
            ReaderAction::FasterStep => {
                self.faster(now_ms);
            }
            ReaderAction::SlowerStep => {
                self.slower(now_ms);
            }
            ReaderAction::SetWpm(wpm) => {
                self.set_wpm(wpm, now_ms);
            }
            ReaderAction::Seek(percent) => self.seek(percent),
            ReaderAction::GoToWord(index) => self.go_to_word_index(index),
        }
        self.state() != before
    }
}

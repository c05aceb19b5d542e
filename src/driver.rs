//! Timer-driven owner of the playback clock.
//!
//! All clock mutations go through [`PlaybackDriver`] under one blocking mutex.
//! Each mutation publishes the new [`PlaybackState`] to observers and signals
//! [`PlaybackDriver::run`], which drops its pending timer and arms a new one for
//! the clock's next deadline. At most one timer is ever pending.

use core::cell::RefCell;

use embassy_futures::select::{Either, select};
use embassy_sync::{
    blocking_mutex::{Mutex as BlockingMutex, raw::CriticalSectionRawMutex},
    signal::Signal,
    watch::{Receiver, Watch},
};
use embassy_time::{Duration, Instant, Timer};
use log::debug;
use quickread_core::{PlaybackClock, PlaybackState, ReaderAction, ReaderConfig, TickResult};

/// Observers that may hold a state receiver at the same time.
pub const MAX_OBSERVERS: usize = 4;

pub type StateReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, PlaybackState, MAX_OBSERVERS>;

pub struct PlaybackDriver {
    clock: BlockingMutex<CriticalSectionRawMutex, RefCell<PlaybackClock>>,
    wake: Signal<CriticalSectionRawMutex, ()>,
    state: Watch<CriticalSectionRawMutex, PlaybackState, MAX_OBSERVERS>,
    epoch: Instant,
}

impl PlaybackDriver {
    pub fn new(config: ReaderConfig) -> Self {
        let clock = PlaybackClock::new(config);
        let driver = Self {
            state: Watch::new(),
            wake: Signal::new(),
            clock: BlockingMutex::new(RefCell::new(clock)),
            epoch: Instant::now(),
        };
        driver.publish(driver.state());
        driver
    }

    /// Milliseconds since the driver was created; the clock's time base.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis()
    }

    pub fn state(&self) -> PlaybackState {
        self.clock.lock(|clock| clock.borrow().state())
    }

    pub fn subscribe(&self) -> Option<StateReceiver<'_>> {
        self.state.receiver()
    }

    /// Read the clock without mutating it.
    pub fn inspect<R>(&self, f: impl FnOnce(&PlaybackClock) -> R) -> R {
        self.clock.lock(|clock| f(&*clock.borrow()))
    }

    /// Mutate the clock at the current instant, then publish and reschedule.
    pub fn with_clock<R>(&self, f: impl FnOnce(&mut PlaybackClock, u64) -> R) -> R {
        let now_ms = self.now_ms();
        let (result, state) = self.clock.lock(|clock| {
            let mut clock = clock.borrow_mut();
            let result = f(&mut *clock, now_ms);
            (result, clock.state())
        });
        self.publish(state);
        self.wake.signal(());
        result
    }

    pub fn apply(&self, action: ReaderAction) -> bool {
        self.with_clock(|clock, now_ms| clock.apply(action, now_ms))
    }

    /// Switch to a new word sequence. Any pending advance is discarded.
    pub fn load(&self, total_words: usize) {
        self.with_clock(|clock, _| clock.load(total_words));
    }

    pub fn go_to_word_index(&self, index: usize) {
        self.with_clock(|clock, _| clock.go_to_word_index(index));
    }

    /// Drive the clock forever. Run it next to the code that mutates the driver.
    pub async fn run(&self) -> ! {
        loop {
            let deadline = self.inspect(PlaybackClock::next_deadline_ms);
            let Some(deadline_ms) = deadline else {
                self.wake.wait().await;
                continue;
            };

            let at = self.epoch + Duration::from_millis(deadline_ms);
            match select(Timer::at(at), self.wake.wait()).await {
                Either::First(()) => self.on_deadline(),
                Either::Second(()) => {}
            }
        }
    }

    fn on_deadline(&self) {
        let now_ms = self.now_ms();
        let (tick, state) = self.clock.lock(|clock| {
            let mut clock = clock.borrow_mut();
            (clock.tick(now_ms), clock.state())
        });
        match tick {
            TickResult::NoChange => {}
            TickResult::Advanced => self.publish(state),
            TickResult::Finished => {
                debug!("playback: reached end words={}", state.total_words);
                self.publish(state);
            }
        }
    }

    fn publish(&self, state: PlaybackState) {
        self.state.sender().send(state);
    }
}

//! Macro ratio constraint engine.
//!
//! Three independent channels (protein, carbohydrate, fats) each hold a share
//! in `0..=100`. The engine never rebalances: the user alone makes the total
//! reach 100. After every mutation it publishes one [`RatioEvent`], the full
//! triple when the total is exactly 100 and `None` otherwise.
//!
//! Events travel one way, from the engine to whoever holds the matching
//! [`RatioReceiver`]. Each event replaces the previous one outright.
//!
//! ```
//! use knapsnack_core::{Channel, RatioConstraintEngine};
//!
//! let (mut engine, events) = RatioConstraintEngine::channel(None);
//! assert!(engine.set_channel(Channel::Protein, 35).is_none()); // 35 + 40 + 30
//! assert!(engine.set_channel(Channel::Fats, 25).is_some()); // 35 + 40 + 25
//! assert_eq!(events.drain().len(), 2);
//! ```

use crate::error::FormError;
use crate::form::MacroRatios;
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc;
use tracing::debug;

/// Validity published after each mutation: the split, or `None` while the
/// channels do not total 100.
pub type RatioEvent = Option<MacroRatios>;

/// One adjustable share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Protein share
    Protein,
    /// Carbohydrate share
    Carbohydrate,
    /// Fat share
    Fats,
}

impl Channel {
    /// Channels in display order.
    pub const ALL: [Self; 3] = [Self::Protein, Self::Carbohydrate, Self::Fats];

    /// Canonical name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Carbohydrate => "carbohydrate",
            Self::Fats => "fats",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "protein" => Ok(Self::Protein),
            "carbohydrate" | "carbs" => Ok(Self::Carbohydrate),
            "fats" | "fat" => Ok(Self::Fats),
            _ => Err(FormError::UnknownChannel(s.to_string())),
        }
    }
}

/// Receiving end of an engine's event channel.
#[derive(Debug)]
pub struct RatioReceiver {
    inner: mpsc::Receiver<RatioEvent>,
}

impl RatioReceiver {
    /// Take every event published since the last call, oldest first.
    pub fn drain(&self) -> Vec<RatioEvent> {
        self.inner.try_iter().collect()
    }
}

/// Owner of the three ratio channels.
#[derive(Debug)]
pub struct RatioConstraintEngine {
    protein: u8,
    carbohydrate: u8,
    fats: u8,
    auto_focus: bool,
    sender: Option<mpsc::Sender<RatioEvent>>,
}

impl Default for RatioConstraintEngine {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RatioConstraintEngine {
    /// Lowest share a channel can hold.
    pub const MIN: i64 = 0;
    /// Highest share a channel can hold.
    pub const MAX: i64 = 100;

    /// Create an engine seeded from a previous split, or 30/40/30.
    pub fn new(initial: Option<MacroRatios>) -> Self {
        let seed = initial.unwrap_or(MacroRatios::DEFAULT);
        Self {
            protein: seed.protein(),
            carbohydrate: seed.carbohydrate(),
            fats: seed.fats(),
            auto_focus: false,
            sender: None,
        }
    }

    /// Create an engine together with the receiver for its events.
    pub fn channel(initial: Option<MacroRatios>) -> (Self, RatioReceiver) {
        let mut engine = Self::new(initial);
        let receiver = engine.connect();
        (engine, receiver)
    }

    /// Open a fresh event channel. Any previous receiver stops getting events.
    pub fn connect(&mut self) -> RatioReceiver {
        let (tx, rx) = mpsc::channel();
        self.sender = Some(tx);
        RatioReceiver { inner: rx }
    }

    /// Ask for focus on the first channel when mounted.
    #[must_use]
    pub const fn with_auto_focus(mut self, auto_focus: bool) -> Self {
        self.auto_focus = auto_focus;
        self
    }

    /// Channel that should take input focus, if auto-focus was requested.
    pub const fn focus_request(&self) -> Option<Channel> {
        if self.auto_focus {
            Some(Channel::Protein)
        } else {
            None
        }
    }

    /// Current share of one channel.
    pub const fn get(&self, channel: Channel) -> u8 {
        match channel {
            Channel::Protein => self.protein,
            Channel::Carbohydrate => self.carbohydrate,
            Channel::Fats => self.fats,
        }
    }

    /// Sum of the three channels.
    pub fn total(&self) -> u16 {
        u16::from(self.protein) + u16::from(self.carbohydrate) + u16::from(self.fats)
    }

    /// Validity of the current channels, without publishing it.
    pub fn current(&self) -> RatioEvent {
        MacroRatios::new(self.protein, self.carbohydrate, self.fats)
    }

    /// Store a clamped share and publish the resulting validity.
    pub fn set_channel(&mut self, channel: Channel, raw: i64) -> RatioEvent {
        let value = raw.clamp(Self::MIN, Self::MAX) as u8;
        match channel {
            Channel::Protein => self.protein = value,
            Channel::Carbohydrate => self.carbohydrate = value,
            Channel::Fats => self.fats = value,
        }
        debug!(%channel, raw, value, total = self.total(), "ratio channel set");
        self.publish()
    }

    /// Publish the current validity without changing anything, as happens
    /// when the ratio step is first shown.
    pub fn announce(&self) -> RatioEvent {
        self.publish()
    }

    fn publish(&self) -> RatioEvent {
        let event = self.current();
        if let Some(sender) = &self.sender {
            if sender.send(event).is_err() {
                debug!("ratio receiver dropped, event discarded");
            }
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_engine_defaults() {
        let engine = RatioConstraintEngine::default();
        assert_eq!(engine.get(Channel::Protein), 30);
        assert_eq!(engine.get(Channel::Carbohydrate), 40);
        assert_eq!(engine.get(Channel::Fats), 30);
        assert_eq!(engine.total(), 100);
        assert_eq!(engine.current(), Some(MacroRatios::DEFAULT));
    }

    #[test]
    fn test_engine_seeded_from_previous_split() {
        let seed = MacroRatios::new(50, 30, 20).unwrap();
        let engine = RatioConstraintEngine::new(Some(seed));
        assert_eq!(engine.get(Channel::Protein), 50);
        assert_eq!(engine.current(), Some(seed));
    }

    #[test]
    fn test_set_channel_emits_null_when_total_off() {
        let mut engine = RatioConstraintEngine::default();
        assert_eq!(engine.set_channel(Channel::Protein, 40), None);
        assert_eq!(engine.total(), 110);
    }

    #[test]
    fn test_set_channel_emits_triple_at_100() {
        let mut engine = RatioConstraintEngine::default();
        engine.set_channel(Channel::Protein, 50);
        engine.set_channel(Channel::Carbohydrate, 30);
        let event = engine.set_channel(Channel::Fats, 20);
        assert_eq!(event, MacroRatios::new(50, 30, 20));
    }

    #[test]
    fn test_no_rebalancing() {
        let mut engine = RatioConstraintEngine::default();
        engine.set_channel(Channel::Protein, 90);
        assert_eq!(engine.get(Channel::Carbohydrate), 40);
        assert_eq!(engine.get(Channel::Fats), 30);
    }

    #[test]
    fn test_clamping() {
        let mut engine = RatioConstraintEngine::default();
        engine.set_channel(Channel::Protein, -15);
        assert_eq!(engine.get(Channel::Protein), 0);
        engine.set_channel(Channel::Fats, 250);
        assert_eq!(engine.get(Channel::Fats), 100);
        engine.set_channel(Channel::Carbohydrate, i64::MIN);
        assert_eq!(engine.get(Channel::Carbohydrate), 0);
    }

    #[test]
    fn test_every_mutation_publishes_once() {
        let (mut engine, events) = RatioConstraintEngine::channel(None);
        engine.set_channel(Channel::Protein, 25);
        engine.set_channel(Channel::Carbohydrate, 45);
        assert_eq!(
            events.drain(),
            vec![None, MacroRatios::new(25, 45, 30)]
        );
        assert!(events.drain().is_empty());
    }

    #[test]
    fn test_announce_publishes_current_validity() {
        let (engine, events) = RatioConstraintEngine::channel(None);
        assert_eq!(engine.announce(), Some(MacroRatios::DEFAULT));
        assert_eq!(events.drain(), vec![Some(MacroRatios::DEFAULT)]);
    }

    #[test]
    fn test_connect_replaces_receiver() {
        let (mut engine, old) = RatioConstraintEngine::channel(None);
        let new = engine.connect();
        engine.set_channel(Channel::Protein, 10);
        assert!(old.drain().is_empty());
        assert_eq!(new.drain().len(), 1);
    }

    #[test]
    fn test_dropped_receiver_is_harmless() {
        let (mut engine, events) = RatioConstraintEngine::channel(None);
        drop(events);
        assert_eq!(engine.set_channel(Channel::Protein, 30), Some(MacroRatios::DEFAULT));
    }

    #[test]
    fn test_focus_request() {
        assert_eq!(RatioConstraintEngine::default().focus_request(), None);
        let engine = RatioConstraintEngine::default().with_auto_focus(true);
        assert_eq!(engine.focus_request(), Some(Channel::Protein));
    }

    #[test]
    fn test_channel_names() {
        assert_eq!("protein".parse::<Channel>().unwrap(), Channel::Protein);
        assert_eq!("Carbs".parse::<Channel>().unwrap(), Channel::Carbohydrate);
        assert_eq!("fat".parse::<Channel>().unwrap(), Channel::Fats);
        assert!("sugar".parse::<Channel>().is_err());
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
    }

    fn channel_strategy() -> impl Strategy<Value = Channel> {
        prop_oneof![
            Just(Channel::Protein),
            Just(Channel::Carbohydrate),
            Just(Channel::Fats),
        ]
    }

    proptest! {
        #[test]
        fn prop_emits_ratio_iff_total_is_100(
            edits in prop::collection::vec((channel_strategy(), -50i64..150), 1..40)
        ) {
            let mut engine = RatioConstraintEngine::default();
            for (channel, raw) in edits {
                let event = engine.set_channel(channel, raw);
                let sum = engine.total();
                prop_assert_eq!(event.is_some(), sum == 100);
                if let Some(ratios) = event {
                    prop_assert_eq!(ratios.protein(), engine.get(Channel::Protein));
                    prop_assert_eq!(ratios.carbohydrate(), engine.get(Channel::Carbohydrate));
                    prop_assert_eq!(ratios.fats(), engine.get(Channel::Fats));
                }
            }
        }

        #[test]
        fn prop_channels_stay_in_bounds(channel in channel_strategy(), raw in any::<i64>()) {
            let mut engine = RatioConstraintEngine::default();
            engine.set_channel(channel, raw);
            let stored = i64::from(engine.get(channel));
            prop_assert_eq!(stored, raw.clamp(0, 100));
        }
    }
}

//! Optional sound cues. Missing audio devices or files silently disable audio.

use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::core::session::SessionEvent;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Victory,
    Defeat,
    Treasure,
    LevelUp,
    Regenerate,
}

impl Cue {
    const ALL: [Cue; 5] = [Cue::Victory, Cue::Defeat, Cue::Treasure, Cue::LevelUp, Cue::Regenerate];

    fn candidates(self) -> &'static [&'static str] {
        match self {
            Cue::Victory => &["assets/sounds/victory.wav", "assets/sounds/victory.ogg"],
            Cue::Defeat => &["assets/sounds/defeat.wav", "assets/sounds/hurt.wav"],
            Cue::Treasure => &["assets/sounds/treasure.wav", "assets/sounds/coin.wav"],
            Cue::LevelUp => &["assets/sounds/level_up.wav", "assets/sounds/levelup.wav"],
            Cue::Regenerate => &["assets/sounds/regenerate.wav", "assets/sounds/whoosh.wav"],
        }
    }

    /// Which cue, if any, a session event plays.
    pub fn for_event(event: &SessionEvent) -> Option<Cue> {
        match event {
            SessionEvent::BattleWon { .. } => Some(Cue::Victory),
            SessionEvent::BattleLost { .. } | SessionEvent::GameOver => Some(Cue::Defeat),
            SessionEvent::TreasureOpened(_) => Some(Cue::Treasure),
            SessionEvent::LevelUp(_) => Some(Cue::LevelUp),
            SessionEvent::Regenerated { .. } => Some(Cue::Regenerate),
        }
    }
}

fn load_bytes_any(paths: &[&str]) -> Option<Vec<u8>> {
    paths.iter().find_map(|p| fs::read(p).ok())
}

pub struct AudioManager {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    cues: HashMap<Cue, Arc<Vec<u8>>>,
    volume: f32,
}

impl AudioManager {
    /// `None` when no output device is available.
    pub fn new() -> Option<Self> {
        let (_stream, handle) = OutputStream::try_default().ok()?;
        Some(Self {
            _stream,
            handle,
            cues: HashMap::new(),
            volume: 0.8,
        })
    }

    /// Load every cue found under `assets/sounds`. Returns how many were found.
    pub fn load_cues_auto(&mut self) -> usize {
        for cue in Cue::ALL {
            if let Some(bytes) = load_bytes_any(cue.candidates()) {
                self.cues.insert(cue, Arc::new(bytes));
            }
        }
        log::debug!("Loaded {} of {} sound cues", self.cues.len(), Cue::ALL.len());
        self.cues.len()
    }

    /// Play on a detached sink so overlapping cues don't queue.
    pub fn play(&self, cue: Cue) {
        let Some(data) = self.cues.get(&cue) else {
            return;
        };
        let Ok(decoder) = Decoder::new(Cursor::new(data.as_ref().clone())) else {
            log::debug!("Could not decode sound for {cue:?}");
            return;
        };
        if let Ok(sink) = Sink::try_new(&self.handle) {
            sink.append(decoder.amplify(self.volume));
            sink.detach();
        }
    }

    pub fn play_events(&self, events: &[SessionEvent]) {
        for cue in events.iter().filter_map(Cue::for_event) {
            self.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::{LootKind, MonsterKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn events_map_to_cues() {
        assert_eq!(
            Cue::for_event(&SessionEvent::BattleWon { kind: MonsterKind::Witch, heroic: true }),
            Some(Cue::Victory)
        );
        assert_eq!(Cue::for_event(&SessionEvent::GameOver), Some(Cue::Defeat));
        assert_eq!(
            Cue::for_event(&SessionEvent::TreasureOpened(LootKind::Points)),
            Some(Cue::Treasure)
        );
        assert_eq!(Cue::for_event(&SessionEvent::Regenerated { seed: 1 }), Some(Cue::Regenerate));
    }

    #[test]
    fn missing_files_load_nothing() {
        assert_eq!(load_bytes_any(&["does/not/exist.wav"]), None);
    }
}

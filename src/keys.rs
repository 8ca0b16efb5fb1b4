//! Voice keys and the generators that produce them.

use uuid::Uuid;

/// Receipt for one live voice, returned by every successful play.
///
/// Keys come from a 128-bit space so that collisions between live voices are practically
/// impossible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceKey(Uuid);

impl VoiceKey {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for VoiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Source of fresh voice keys.
pub trait KeyGenerator {
    fn new_key(&mut self) -> VoiceKey;
}

/// Random (v4) keys, the default generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomKeys;

impl KeyGenerator for RandomKeys {
    fn new_key(&mut self) -> VoiceKey {
        VoiceKey(Uuid::new_v4())
    }
}

/// Monotonic keys, handy for reproducible runs.
#[derive(Debug, Default, Clone)]
pub struct SequentialKeys {
    next: u128,
}

impl SequentialKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

impl KeyGenerator for SequentialKeys {
    fn new_key(&mut self) -> VoiceKey {
        self.next = self.next.wrapping_add(1);
        VoiceKey(Uuid::from_u128(self.next))
    }
}

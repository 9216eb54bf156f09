//! Per-frame input intents

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::combat::AttackKind;

/// Canonical logical actions, independent of the physical key bound to each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    MoveLeft,
    MoveRight,
    JumpUp,
    Block,
    LightAttack,
    HeavyAttack,
    SpecialAttack,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::JumpUp,
        Action::Block,
        Action::LightAttack,
        Action::HeavyAttack,
        Action::SpecialAttack,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::MoveLeft => "moveLeft",
            Action::MoveRight => "moveRight",
            Action::JumpUp => "jumpUp",
            Action::Block => "block",
            Action::LightAttack => "lightAttack",
            Action::HeavyAttack => "heavyAttack",
            Action::SpecialAttack => "specialAttack",
        }
    }
}

impl FromStr for Action {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| InputError::UnknownAction(s.to_string()))
    }
}

/// Input collector errors
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// Which actions are asserted for one side during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    pub block: bool,
    pub light: bool,
    pub heavy: bool,
    pub special: bool,
}

impl InputSnapshot {
    /// No actions asserted
    pub fn idle() -> Self {
        Self::default()
    }

    /// Build from the set of currently asserted actions
    pub fn from_actions<I>(actions: I) -> Self
    where
        I: IntoIterator<Item = Action>,
    {
        actions
            .into_iter()
            .fold(Self::default(), |snapshot, action| snapshot.with(action))
    }

    /// Build from a collector's `action name -> asserted` map
    pub fn from_key_state(keys: &HashMap<String, bool>) -> Result<Self, InputError> {
        let mut snapshot = Self::default();
        for (name, &down) in keys {
            let action: Action = name.parse()?;
            if down {
                snapshot = snapshot.with(action);
            }
        }
        Ok(snapshot)
    }

    /// Copy of this snapshot with `action` asserted
    pub fn with(mut self, action: Action) -> Self {
        *self.slot_mut(action) = true;
        self
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left,
            Action::MoveRight => self.move_right,
            Action::JumpUp => self.jump,
            Action::Block => self.block,
            Action::LightAttack => self.light,
            Action::HeavyAttack => self.heavy,
            Action::SpecialAttack => self.special,
        }
    }

    /// Whether the attack of the given kind is requested
    pub fn wants(&self, kind: AttackKind) -> bool {
        self.is_pressed(kind.action())
    }

    fn slot_mut(&mut self, action: Action) -> &mut bool {
        match action {
            Action::MoveLeft => &mut self.move_left,
            Action::MoveRight => &mut self.move_right,
            Action::JumpUp => &mut self.jump,
            Action::Block => &mut self.block,
            Action::LightAttack => &mut self.light,
            Action::HeavyAttack => &mut self.heavy,
            Action::SpecialAttack => &mut self.special,
        }
    }
}

/// Intents for both sides for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInputs {
    pub p1: InputSnapshot,
    pub p2: InputSnapshot,
}

impl TickInputs {
    pub fn new(p1: InputSnapshot, p2: InputSnapshot) -> Self {
        Self { p1, p2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!(matches!(
            "dash".parse::<Action>(),
            Err(InputError::UnknownAction(name)) if name == "dash"
        ));
    }

    #[test]
    fn key_state_only_keeps_asserted_actions() {
        let mut keys = HashMap::new();
        keys.insert("moveLeft".to_string(), true);
        keys.insert("block".to_string(), false);
        keys.insert("heavyAttack".to_string(), true);

        let snapshot = InputSnapshot::from_key_state(&keys).unwrap();
        assert!(snapshot.move_left);
        assert!(!snapshot.block);
        assert!(snapshot.wants(AttackKind::Heavy));
        assert!(!snapshot.wants(AttackKind::Light));
    }

    #[test]
    fn key_state_rejects_unknown_names() {
        let mut keys = HashMap::new();
        keys.insert("taunt".to_string(), true);
        assert!(InputSnapshot::from_key_state(&keys).is_err());
    }

    #[test]
    fn serde_uses_camel_case_action_names() {
        let json = serde_json::to_string(&Action::SpecialAttack).unwrap();
        assert_eq!(json, "\"specialAttack\"");
    }
}

//! Named actions (animation/behaviour states) and the behaviour callbacks
//! they reference.
//!
//! Action definitions are plain data loaded from JSON; their `think`,
//! `collide` and `draw` hooks are names resolved against a
//! [`BehaviorRegistry`] that each episode fills at activation.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::objects::{ObjectId, ObjectPool};
use crate::session::Level;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ActionId(u16);

impl ActionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UnscaledOnce,
    ScaledOnce,
    Frame,
    UnscaledFrame,
    ScaledFrame,
}

/// Movement requested by a think callback for the current tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Motion {
    pub next_x: i32,
    pub next_y: i32,
}

/// What a behaviour callback may touch while the play loop runs it.
pub struct ThinkContext<'a> {
    pub game: &'a mut GameState,
    pub objects: &'a mut ObjectPool,
    pub level: &'a Level,
    pub motion: &'a mut Motion,
    pub sprite_sync: i32,
}

pub type ThinkFn = fn(&mut ThinkContext<'_>, ObjectId);
pub type CollideFn = fn(&mut ThinkContext<'_>, ObjectId, ObjectId);
pub type DrawFn = fn(&mut ThinkContext<'_>, ObjectId);

#[derive(Clone, Copy)]
pub enum Behavior {
    Think(ThinkFn),
    Collide(CollideFn),
    Draw(DrawFn),
}

impl Behavior {
    fn kind(&self) -> &'static str {
        match self {
            Behavior::Think(_) => "think",
            Behavior::Collide(_) => "collide",
            Behavior::Draw(_) => "draw",
        }
    }
}

impl std::fmt::Debug for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Behavior::{}", self.kind())
    }
}

#[derive(Debug, Default, Clone)]
pub struct BehaviorRegistry {
    entries: BTreeMap<String, Behavior>,
}

impl BehaviorRegistry {
    pub fn add_think(&mut self, name: &str, think: ThinkFn) {
        self.entries.insert(name.to_string(), Behavior::Think(think));
    }

    pub fn add_collide(&mut self, name: &str, collide: CollideFn) {
        self.entries
            .insert(name.to_string(), Behavior::Collide(collide));
    }

    pub fn add_draw(&mut self, name: &str, draw: DrawFn) {
        self.entries.insert(name.to_string(), Behavior::Draw(draw));
    }

    pub fn get(&self, name: &str) -> Option<Behavior> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// One action as written in the actions file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDef {
    pub name: String,
    #[serde(default)]
    pub chunk_left: u16,
    #[serde(default)]
    pub chunk_right: u16,
    pub kind: ActionKind,
    #[serde(default)]
    pub protect_animation: bool,
    #[serde(default)]
    pub stick_to_ground: bool,
    #[serde(default)]
    pub timer: i32,
    #[serde(default)]
    pub vel_x: i32,
    #[serde(default)]
    pub vel_y: i32,
    #[serde(default)]
    pub think: Option<String>,
    #[serde(default)]
    pub collide: Option<String>,
    #[serde(default)]
    pub draw: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl ActionDef {
    /// A bare frame action with no hooks.
    pub fn frame(name: &str, chunk: u16) -> Self {
        ActionDef {
            name: name.to_string(),
            chunk_left: chunk,
            chunk_right: chunk,
            kind: ActionKind::Frame,
            protect_animation: false,
            stick_to_ground: false,
            timer: 0,
            vel_x: 0,
            vel_y: 0,
            think: None,
            collide: None,
            draw: None,
            next: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub chunk_left: u16,
    pub chunk_right: u16,
    pub kind: ActionKind,
    pub protect_animation: bool,
    pub stick_to_ground: bool,
    pub timer: i32,
    pub vel_x: i32,
    pub vel_y: i32,
    pub think: Option<ThinkFn>,
    pub collide: Option<CollideFn>,
    pub draw: Option<DrawFn>,
    pub next: Option<ActionId>,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action {0} is defined twice")]
    Duplicate(String),
    #[error("action {action} continues into unknown action {next}")]
    UnknownNext { action: String, next: String },
    #[error("action {action} references unregistered behaviour {name}")]
    UnknownBehavior { action: String, name: String },
    #[error("action {action} uses {name} as a {expected} hook but it is a {actual} hook")]
    WrongHook {
        action: String,
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("reading actions file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing actions file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load_action_defs(path: &Path) -> Result<Vec<ActionDef>, ActionError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[derive(Debug, Default, Clone)]
pub struct ActionTable {
    actions: Vec<Action>,
    by_name: HashMap<String, ActionId>,
}

impl ActionTable {
    /// Links action definitions: `next` names become ids and hook names
    /// become registered callbacks.
    pub fn build(defs: Vec<ActionDef>, registry: &BehaviorRegistry) -> Result<Self, ActionError> {
        let mut by_name = HashMap::with_capacity(defs.len());
        for (index, def) in defs.iter().enumerate() {
            if by_name
                .insert(def.name.clone(), ActionId(index as u16))
                .is_some()
            {
                return Err(ActionError::Duplicate(def.name.clone()));
            }
        }

        let mut actions = Vec::with_capacity(defs.len());
        for def in defs {
            let next = match &def.next {
                Some(next) => Some(*by_name.get(next).ok_or_else(|| {
                    ActionError::UnknownNext {
                        action: def.name.clone(),
                        next: next.clone(),
                    }
                })?),
                None => None,
            };
            let think = match resolve_hook(&def.name, def.think.as_deref(), registry, "think")? {
                Some(Behavior::Think(f)) => Some(f),
                _ => None,
            };
            let collide = match resolve_hook(&def.name, def.collide.as_deref(), registry, "collide")? {
                Some(Behavior::Collide(f)) => Some(f),
                _ => None,
            };
            let draw = match resolve_hook(&def.name, def.draw.as_deref(), registry, "draw")? {
                Some(Behavior::Draw(f)) => Some(f),
                _ => None,
            };
            actions.push(Action {
                name: def.name,
                chunk_left: def.chunk_left,
                chunk_right: def.chunk_right,
                kind: def.kind,
                protect_animation: def.protect_animation,
                stick_to_ground: def.stick_to_ground,
                timer: def.timer,
                vel_x: def.vel_x,
                vel_y: def.vel_y,
                think,
                collide,
                draw,
                next,
            });
        }

        Ok(ActionTable { actions, by_name })
    }

    pub fn lookup(&self, name: &str) -> Option<ActionId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.index())
    }

    /// Looks up by name and returns both the id and the action.
    pub fn find(&self, name: &str) -> Option<(ActionId, &Action)> {
        let id = self.lookup(name)?;
        Some((id, self.get(id)?))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn resolve_hook(
    action: &str,
    name: Option<&str>,
    registry: &BehaviorRegistry,
    expected: &'static str,
) -> Result<Option<Behavior>, ActionError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let behavior = registry
        .get(name)
        .ok_or_else(|| ActionError::UnknownBehavior {
            action: action.to_string(),
            name: name.to_string(),
        })?;
    if behavior.kind() != expected {
        return Err(ActionError::WrongHook {
            action: action.to_string(),
            name: name.to_string(),
            expected,
            actual: behavior.kind(),
        });
    }
    Ok(Some(behavior))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_think(_: &mut ThinkContext<'_>, _: ObjectId) {}
    fn noop_collide(_: &mut ThinkContext<'_>, _: ObjectId, _: ObjectId) {}
    fn noop_draw(_: &mut ThinkContext<'_>, _: ObjectId) {}

    #[test]
    fn links_next_actions_and_hooks() {
        let mut registry = BehaviorRegistry::default();
        registry.add_think("Walk", noop_think);

        let mut first = ActionDef::frame("A", 10);
        first.next = Some("B".to_string());
        first.think = Some("Walk".to_string());
        let second = ActionDef::frame("B", 11);

        let table = ActionTable::build(vec![first, second], &registry).unwrap();
        let (a, action) = table.find("A").unwrap();
        assert_eq!(action.next, table.lookup("B"));
        assert!(action.think.is_some());
        assert!(action.collide.is_none());
        assert_ne!(Some(a), table.lookup("B"));
    }

    #[test]
    fn links_collide_and_draw_hooks() {
        let mut registry = BehaviorRegistry::default();
        registry.add_collide("Touch", noop_collide);
        registry.add_draw("Blink", noop_draw);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Blink", "Touch"]);

        let mut def = ActionDef::frame("A", 1);
        def.collide = Some("Touch".to_string());
        def.draw = Some("Blink".to_string());
        let table = ActionTable::build(vec![def], &registry).unwrap();
        let (_, action) = table.find("A").unwrap();
        assert!(action.collide.is_some());
        assert!(action.draw.is_some());
        assert!(action.think.is_none());
    }

    #[test]
    fn rejects_unknown_next() {
        let mut def = ActionDef::frame("A", 1);
        def.next = Some("Missing".to_string());
        let err = ActionTable::build(vec![def], &BehaviorRegistry::default()).unwrap_err();
        assert!(matches!(err, ActionError::UnknownNext { .. }));
    }

    #[test]
    fn rejects_hook_of_the_wrong_kind() {
        let mut registry = BehaviorRegistry::default();
        registry.add_collide("Touch", noop_collide);
        let mut def = ActionDef::frame("A", 1);
        def.think = Some("Touch".to_string());
        let err = ActionTable::build(vec![def], &registry).unwrap_err();
        assert!(matches!(
            err,
            ActionError::WrongHook {
                expected: "think",
                actual: "collide",
                ..
            }
        ));
    }

    #[test]
    fn parses_json_definitions() {
        let defs: Vec<ActionDef> = serde_json::from_str(
            r#"[{"name": "CK_ACT_item", "chunk_left": 5, "kind": "unscaled_frame", "timer": 20}]"#,
        )
        .unwrap();
        assert_eq!(defs[0].kind, ActionKind::UnscaledFrame);
        assert_eq!(defs[0].timer, 20);
        assert!(defs[0].next.is_none());
    }
}

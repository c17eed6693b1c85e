use crate::error::ErrorCode;
use crate::runtime::state::{Entity, EntityKind, GameState, PLAYER_ID, Patrol};
use crate::syntax::ast::CommandLine;
use crate::types::draw::Color;
use super::{Arity, CommandInfo, CommandProvider, CommandSpec, arg, id_arg, is_color_token};

pub struct EntityCommands;

impl CommandInfo for EntityCommands {
    fn group(&self) -> &'static str { "entities" }

    fn commands(&self) -> Vec<CommandSpec> {
        let mut v: Vec<CommandSpec> = [
            "player", "spawn", "enemy", "item",
            "setpos", "setx", "sety", "velx", "vely", "pushx", "pushy",
            "flipx", "flipy", "bouncex", "bouncey", "remove",
            "jump", "shoot", "respawn", "checkpoint", "gravity", "friction",
        ]
        .into_iter()
        .map(CommandSpec::loose)
        .collect();
        v.push(CommandSpec::checked("patrol", Arity::Exact(4), ErrorCode::V006));
        v
    }
}

impl CommandProvider for EntityCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        match name {
            "player" => {
                let (x, y) = (state.num(arg(line, 0)), state.num(arg(line, 1)));
                let [dw, dh] = state.config.player_size;
                let (w, h, color) = size_and_color(state, line, 2, (dw, dh));
                let mut p = Entity::new(PLAYER_ID, EntityKind::Player, x, y, w, h);
                if let Some(c) = color { p.color = c; }
                state.upsert_entity(p);
                state.checkpoint = (x, y);
                state.grounded = false;
            }
            "spawn" => {
                let kind = EntityKind::parse(&state.text(arg(line, 0)));
                spawn(state, line, kind, 1);
            }
            "enemy" => spawn(state, line, EntityKind::Enemy, 0),
            "item" => spawn(state, line, EntityKind::Item, 0),

            "setpos" => {
                let (x, y) = (state.num(arg(line, 1)), state.num(arg(line, 2)));
                with_entity(state, line, |e| { e.x = x; e.y = y; });
            }
            "setx" => { let v = state.num(arg(line, 1)); with_entity(state, line, |e| e.x = v); }
            "sety" => { let v = state.num(arg(line, 1)); with_entity(state, line, |e| e.y = v); }
            "velx" => { let v = state.num(arg(line, 1)); with_entity(state, line, |e| e.vx = v); }
            "vely" => { let v = state.num(arg(line, 1)); with_entity(state, line, |e| e.vy = v); }
            "pushx" => { let v = state.num(arg(line, 1)); with_entity(state, line, |e| e.vx += v); }
            "pushy" => { let v = state.num(arg(line, 1)); with_entity(state, line, |e| e.vy += v); }
            "flipx" => with_entity(state, line, |e| e.vx = -e.vx),
            "flipy" => with_entity(state, line, |e| e.vy = -e.vy),
            "bouncex" => {
                let limit = state.world_w;
                with_entity(state, line, |e| {
                    if e.x < 0.0 {
                        e.x = 0.0;
                        e.vx = e.vx.abs();
                    } else if e.x + e.w > limit {
                        e.x = limit - e.w;
                        e.vx = -e.vx.abs();
                    }
                });
            }
            "bouncey" => {
                let limit = state.world_h;
                with_entity(state, line, |e| {
                    if e.y < 0.0 {
                        e.y = 0.0;
                        e.vy = e.vy.abs();
                    } else if e.y + e.h > limit {
                        e.y = limit - e.h;
                        e.vy = -e.vy.abs();
                    }
                });
            }
            "remove" => {
                let id = id_arg(state, arg(line, 0));
                state.remove_entity(&id);
            }
            "patrol" => {
                let id = id_arg(state, arg(line, 0));
                let patrol = Patrol {
                    id,
                    min_x: state.num(arg(line, 1)),
                    max_x: state.num(arg(line, 2)),
                    speed: state.num(arg(line, 3)),
                };
                match state.patrols.iter_mut().find(|p| p.id == patrol.id) {
                    Some(slot) => *slot = patrol,
                    None => state.patrols.push(patrol),
                }
            }

            "jump" => {
                let power = state.num_or(arg(line, 0), state.physics.jump_power);
                if state.grounded {
                    if let Some(p) = state.player.as_mut() {
                        p.vy = -power;
                        state.grounded = false;
                    }
                }
            }
            "shoot" => shoot(state, line),
            "respawn" => {
                let (x, y) = state.checkpoint;
                if let Some(p) = state.player.as_mut() {
                    p.x = x;
                    p.y = y;
                    p.vx = 0.0;
                    p.vy = 0.0;
                }
            }
            "checkpoint" => {
                state.checkpoint = if line.args().len() >= 2 {
                    (state.num(arg(line, 0)), state.num(arg(line, 1)))
                } else {
                    match &state.player {
                        Some(p) => (p.x, p.y),
                        None => state.checkpoint,
                    }
                };
            }
            "gravity" => state.physics.gravity = state.num(arg(line, 0)),
            "friction" => state.physics.friction = state.num(arg(line, 0)).clamp(0.0, 1.0),
            _ => return false,
        }
        true
    }
}

fn default_size(kind: &EntityKind) -> (f64, f64) {
    match kind {
        EntityKind::Item => (20.0, 20.0),
        EntityKind::Bullet => (8.0, 8.0),
        _ => (32.0, 32.0),
    }
}

/// `… id x y [w h] [color]` with the id at `first`.
fn spawn(state: &mut GameState, line: &CommandLine, kind: EntityKind, first: usize) {
    let id = id_arg(state, arg(line, first));
    if id.is_empty() {
        return;
    }
    let x = state.num(arg(line, first + 1));
    let y = state.num(arg(line, first + 2));
    let (w, h, color) = size_and_color(state, line, first + 3, default_size(&kind));
    let mut e = Entity::new(id, kind, x, y, w, h);
    if let Some(c) = color { e.color = c; }
    state.upsert_entity(e);
}

fn shoot(state: &mut GameState, line: &CommandLine) {
    let Some((cx, cy)) = state.player.as_ref().map(Entity::center) else { return };
    let vx = state.num(arg(line, 0));
    let vy = state.num(arg(line, 1));
    let (w, h, color) = size_and_color(state, line, 2, default_size(&EntityKind::Bullet));
    let id = state.next_bullet_id();
    let mut b = Entity::new(id, EntityKind::Bullet, cx - w / 2.0, cy - h / 2.0, w, h);
    b.vx = vx;
    b.vy = vy;
    if let Some(c) = color { b.color = c; }
    state.upsert_entity(b);
}

/// Optional `[w h] [color]` tail starting at argument `from`.
fn size_and_color(state: &GameState, line: &CommandLine, from: usize, default: (f64, f64)) -> (f64, f64, Option<Color>) {
    let a = arg(line, from);
    if a.is_empty() {
        return (default.0, default.1, None);
    }
    if is_color_token(state, a) {
        return (default.0, default.1, state.color(a));
    }
    let w = state.num(a);
    let h = state.num_or(arg(line, from + 1), w);
    (w, h, state.color(arg(line, from + 2)))
}

fn with_entity(state: &mut GameState, line: &CommandLine, f: impl FnOnce(&mut Entity)) {
    let id = id_arg(state, arg(line, 0));
    if let Some(e) = state.entity_mut(&id) {
        f(e);
    }
}

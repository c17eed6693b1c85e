//! Per-frame integration. Units are pixels and frames; the engine runs one
//! fixed step per processed frame.

use crate::runtime::state::{Aabb, Entity, EntityKind, GameState, Patrol, PhysicsParams};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    X,
    Y,
}

/// Gravity, friction, then X and Y moved and resolved separately against
/// solid rects and the world edges. Updates `grounded`.
pub fn step_player(state: &mut GameState) {
    let solids = state.solids();
    let world = (state.world_w, state.world_h);
    let params = state.physics;
    let Some(player) = state.player.as_mut() else {
        state.grounded = false;
        return;
    };
    state.grounded = move_body(player, &solids, world, &params);
}

fn move_body(p: &mut Entity, solids: &[Aabb], world: (f64, f64), params: &PhysicsParams) -> bool {
    p.vy = (p.vy + params.gravity).min(params.max_fall_speed);
    p.vx *= params.friction;
    if p.vx.abs() < 0.01 {
        p.vx = 0.0;
    }

    p.x += p.vx;
    resolve(p, solids, Axis::X);
    if p.x < 0.0 {
        p.x = 0.0;
        p.vx = 0.0;
    } else if p.x + p.w > world.0 {
        p.x = (world.0 - p.w).max(0.0);
        p.vx = 0.0;
    }

    p.y += p.vy;
    let mut grounded = resolve(p, solids, Axis::Y);
    if p.y < 0.0 {
        p.y = 0.0;
        p.vy = 0.0;
    } else if p.y + p.h >= world.1 {
        p.y = (world.1 - p.h).max(0.0);
        p.vy = 0.0;
        grounded = true;
    }
    grounded
}

/// Push the body out of every solid it overlaps along one axis, against the
/// direction of travel. Returns true when it landed on top of something.
fn resolve(p: &mut Entity, solids: &[Aabb], axis: Axis) -> bool {
    let mut landed = false;
    for s in solids {
        if !p.aabb().overlaps(s) {
            continue;
        }
        match axis {
            Axis::X => {
                if p.vx > 0.0 {
                    p.x = s.x - p.w;
                    p.vx = 0.0;
                } else if p.vx < 0.0 {
                    p.x = s.x + s.w;
                    p.vx = 0.0;
                }
            }
            Axis::Y => {
                let (_, cy) = p.center();
                // vy == 0 with an overlap means the body started inside; eject
                // towards the nearer face
                let downwards = p.vy > 0.0 || (p.vy == 0.0 && cy < s.y + s.h / 2.0);
                if downwards {
                    p.y = s.y - p.h;
                    landed = true;
                } else {
                    p.y = s.y + s.h;
                }
                p.vy = 0.0;
            }
        }
    }
    landed
}

/// Patrol reversal, velocity integration and bullet despawn for every
/// non-player entity. Entities pass through platforms.
pub fn step_entities(state: &mut GameState) {
    apply_patrols(&mut state.entities, &state.patrols);
    for e in &mut state.entities {
        e.x += e.vx;
        e.y += e.vy;
    }
    let margin = state.config.bullet_margin;
    let (ww, wh) = (state.world_w, state.world_h);
    state.entities.retain(|e| {
        e.kind != EntityKind::Bullet
            || (e.x + e.w >= -margin && e.x <= ww + margin && e.y + e.h >= -margin && e.y <= wh + margin)
    });
}

fn apply_patrols(entities: &mut [Entity], patrols: &[Patrol]) {
    for p in patrols {
        let Some(e) = entities.iter_mut().find(|e| e.id == p.id) else { continue };
        let speed = p.speed.abs();
        if e.x <= p.min_x {
            e.vx = speed;
        } else if e.x + e.w >= p.max_x {
            e.vx = -speed;
        } else if e.vx == 0.0 {
            e.vx = p.speed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::runtime::state::{PLAYER_ID, Shape, ShapeKind};
    use crate::types::draw::Color;

    fn world(gravity: f64, friction: f64) -> GameState {
        let cfg = EngineConfig { gravity, friction, seed: Some(7), ..EngineConfig::default() };
        let mut s = GameState::new(&cfg, (800.0, 450.0));
        s.emit_shape(Shape {
            kind: ShapeKind::Rect { x: 100.0, y: 100.0, w: 100.0, h: 100.0, solid: true },
            color: Color::WHITE,
        });
        s
    }

    fn place(s: &mut GameState, x: f64, y: f64, vx: f64, vy: f64) {
        let mut p = Entity::new(PLAYER_ID, EntityKind::Player, x, y, 32.0, 32.0);
        p.vx = vx;
        p.vy = vy;
        s.upsert_entity(p);
    }

    fn player_box(s: &GameState) -> Aabb {
        s.player.as_ref().map(Entity::aabb).unwrap()
    }

    fn run(s: &mut GameState, frames: usize) {
        for _ in 0..frames {
            step_player(s);
            assert!(!s.solids().iter().any(|b| player_box(s).overlaps(b)));
        }
    }

    #[test]
    fn lands_from_above() {
        let mut s = world(0.5, 0.8);
        place(&mut s, 130.0, 20.0, 0.0, 0.0);
        run(&mut s, 60);
        assert_eq!(player_box(&s).y, 68.0);
        assert!(s.grounded);
    }

    #[test]
    fn blocked_from_below() {
        let mut s = world(0.0, 1.0);
        place(&mut s, 130.0, 260.0, 0.0, -12.0);
        run(&mut s, 10);
        assert_eq!(player_box(&s).y, 200.0);
        assert!(!s.grounded);
    }

    #[test]
    fn blocked_from_left() {
        let mut s = world(0.0, 1.0);
        place(&mut s, 20.0, 130.0, 9.0, 0.0);
        run(&mut s, 20);
        assert_eq!(player_box(&s).x, 68.0);
    }

    #[test]
    fn blocked_from_right() {
        let mut s = world(0.0, 1.0);
        place(&mut s, 300.0, 130.0, -9.0, 0.0);
        run(&mut s, 20);
        assert_eq!(player_box(&s).x, 200.0);
    }

    #[test]
    fn world_floor_grounds() {
        let mut s = world(1.0, 0.8);
        s.shapes.clear();
        place(&mut s, 400.0, 300.0, 0.0, 0.0);
        run(&mut s, 60);
        assert_eq!(player_box(&s).y, 450.0 - 32.0);
        assert!(s.grounded);
    }

    #[test]
    fn friction_settles_to_zero() {
        let mut s = world(0.0, 0.5);
        s.shapes.clear();
        place(&mut s, 400.0, 100.0, 4.0, 0.0);
        run(&mut s, 20);
        assert_eq!(s.player.as_ref().unwrap().vx, 0.0);
    }

    #[test]
    fn patrol_reverses_at_bounds() {
        let mut s = world(0.0, 1.0);
        s.upsert_entity(Entity::new("e1", EntityKind::Enemy, 50.0, 0.0, 10.0, 10.0));
        s.patrols.push(Patrol { id: "e1".into(), min_x: 40.0, max_x: 80.0, speed: 5.0 });
        let mut xs = Vec::new();
        for _ in 0..30 {
            step_entities(&mut s);
            xs.push(s.entities[0].x);
        }
        assert!(xs.iter().all(|&x| (35.0..=80.0).contains(&x)));
        assert!(xs.iter().any(|&x| x <= 40.0));
        assert!(xs.iter().any(|&x| x + 10.0 >= 80.0));
    }

    #[test]
    fn bullets_despawn_past_margin() {
        let mut s = world(0.0, 1.0);
        let mut b = Entity::new("bullet1", EntityKind::Bullet, 790.0, 10.0, 4.0, 4.0);
        b.vx = 20.0;
        s.upsert_entity(b);
        let mut e = Entity::new("slow", EntityKind::Enemy, 790.0, 10.0, 4.0, 4.0);
        e.vx = 20.0;
        s.upsert_entity(e);
        for _ in 0..5 {
            step_entities(&mut s);
        }
        assert!(s.entity("bullet1").is_none());
        assert!(s.entity("slow").is_some());
    }
}

//! The bundled demo script must stay valid and playable.

use wbw_lang::{DrawCommand, Engine, EngineConfig, InputEvent, Value};

const DEMO: &str = include_str!("../../../demos/platformer.wbw");

fn engine() -> Engine {
    let mut engine = Engine::new(EngineConfig { seed: Some(1), ..EngineConfig::default() });
    let result = engine.load(DEMO);
    assert!(result.is_ok(), "demo has errors: {:#?}", result.errors);
    engine.start();
    engine
}

#[test]
fn demo_settles_on_the_floor() {
    let mut engine = engine();
    for _ in 0..120 {
        engine.update();
    }
    assert_eq!(engine.var("py"), Some(Value::Num(388.0)));
    assert_eq!(engine.var("grounded"), Some(Value::Num(1.0)));
    assert_eq!(engine.var("lives"), Some(Value::Num(3.0)));
    assert_eq!(engine.var("camx"), Some(Value::Num(0.0)));
}

#[test]
fn demo_draws_hud_and_walks_right() {
    let mut engine = engine();
    let sink = engine.input_sink().unwrap();
    sink.send(InputEvent::KeyDown("ArrowRight".into()));
    for _ in 0..30 {
        engine.update();
    }
    let Some(Value::Num(px)) = engine.var("px") else { panic!("px missing") };
    assert!(px > 60.0);

    let cmds = engine.render();
    assert!(cmds.iter().any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "Score: 0")));
    assert!(cmds.iter().any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "Help")));
}

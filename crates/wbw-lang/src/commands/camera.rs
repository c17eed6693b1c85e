use crate::runtime::camera::Follow;
use crate::runtime::state::{GameState, PLAYER_ID};
use crate::syntax::ast::CommandLine;
use super::{CommandInfo, CommandProvider, CommandSpec, arg, flag, id_arg};

pub struct CameraCommands;

impl CommandInfo for CameraCommands {
    fn group(&self) -> &'static str { "camera" }

    fn commands(&self) -> Vec<CommandSpec> {
        ["cam", "camfollow", "camlerp", "camoffset", "camclamp", "camreset", "world"]
            .into_iter()
            .map(CommandSpec::loose)
            .collect()
    }
}

impl CommandProvider for CameraCommands {
    fn exec(&self, name: &str, line: &CommandLine, state: &mut GameState) -> bool {
        match name {
            "cam" => {
                let (x, y) = (state.num(arg(line, 0)), state.num(arg(line, 1)));
                state.camera.set(x, y);
            }
            "camfollow" => {
                let target = id_arg(state, arg(line, 0));
                state.camera.follow = match target.to_ascii_lowercase().as_str() {
                    "" | "none" | "off" => Follow::None,
                    PLAYER_ID => Follow::Player,
                    _ => Follow::Entity(target),
                };
                state.camera.snap_next = true;
            }
            "camlerp" => state.camera.lerp = state.num(arg(line, 0)).clamp(0.0, 1.0),
            "camoffset" => state.camera.offset = (state.num(arg(line, 0)), state.num(arg(line, 1))),
            "camclamp" => state.camera.clamp = flag(state, arg(line, 0)),
            "camreset" => state.camera.reset(),
            "world" => {
                let w = state.num(arg(line, 0));
                let h = state.num(arg(line, 1));
                if w > 0.0 { state.world_w = w; }
                if h > 0.0 { state.world_h = h; }
            }
            _ => return false,
        }
        true
    }
}

//! Synonyms accepted in place of canonical command names.

pub const ALIASES: &[(&str, &str)] = &[
    // entities
    ("plat", "platform"),
    ("ground", "platform"),
    ("floor", "platform"),
    ("tp", "setpos"),
    ("teleport", "setpos"),
    ("moveto", "setpos"),
    ("pos", "setpos"),
    ("vx", "velx"),
    ("vy", "vely"),
    ("setvx", "velx"),
    ("setvy", "vely"),
    ("addvx", "pushx"),
    ("addvy", "pushy"),
    ("impulsex", "pushx"),
    ("impulsey", "pushy"),
    ("del", "remove"),
    ("delete", "remove"),
    ("destroy", "remove"),
    ("kill", "remove"),
    ("despawn", "remove"),
    ("create", "spawn"),
    ("make", "spawn"),
    ("foe", "enemy"),
    ("mob", "enemy"),
    ("coin", "item"),
    ("pickup", "item"),
    ("collectible", "item"),
    ("hop", "jump"),
    ("fire", "shoot"),
    ("save", "checkpoint"),
    ("revive", "respawn"),
    ("grav", "gravity"),
    ("fric", "friction"),
    // variables
    ("var", "set"),
    ("let", "set"),
    ("assign", "set"),
    ("plus", "add"),
    ("minus", "sub"),
    ("subtract", "sub"),
    ("multiply", "mul"),
    ("times", "mul"),
    ("divide", "div"),
    ("modulo", "mod"),
    ("increment", "inc"),
    ("decrement", "dec"),
    ("random", "rand"),
    ("rnd", "rand"),
    ("randi", "randint"),
    ("randf", "randfloat"),
    ("exchange", "swap"),
    ("cp", "copy"),
    ("flip", "toggle"),
    // drawing
    ("rectangle", "rect"),
    ("box", "rect"),
    ("circ", "circle"),
    ("triangle", "tri"),
    ("background", "bg"),
    ("bgcolor", "bg"),
    ("colour", "color"),
    ("fill", "color"),
    ("print", "text"),
    ("write", "text"),
    ("hudtext", "hud"),
    // ui
    ("btn", "button"),
    ("uibutton", "button"),
    ("uibtn", "button"),
    ("visible", "uivisible"),
    ("uienabled", "uienable"),
    ("enableui", "uienable"),
    ("deleteui", "removeui"),
    ("uiremove", "removeui"),
    ("uiclear", "clearui"),
    // camera
    ("camera", "cam"),
    ("follow", "camfollow"),
    ("camsmooth", "camlerp"),
    ("camoff", "camoffset"),
    ("worldsize", "world"),
    ("bounds", "world"),
    // input
    ("key", "on"),
    ("onkey", "on"),
    ("whilekey", "on"),
    ("keydown", "onpress"),
    ("onkeydown", "onpress"),
    ("press", "onpress"),
    ("keyup", "onrelease"),
    ("onkeyup", "onrelease"),
    ("release", "onrelease"),
    ("onclick", "onui"),
    ("click", "onui"),
    ("onhover", "onhoverui"),
    ("hover", "onhoverui"),
    // timers
    ("wait", "after"),
    ("delay", "after"),
    ("timeout", "after"),
    ("repeat", "every"),
    ("interval", "every"),
    ("cancel", "canceltimer"),
    ("stoptimer", "canceltimer"),
    ("cleartimer", "cleartimers"),
    // flow
    ("jmp", "goto"),
    ("call", "goto"),
    ("gosub", "goto"),
    ("unless", "ifnot"),
    ("endloop", "end"),
    ("halt", "stop"),
    ("return", "stop"),
    // misc
    ("say", "msg"),
    ("message", "msg"),
    ("toast", "msg"),
    ("alert", "msg"),
    ("screenshake", "shake"),
    ("sfx", "sound"),
    ("play", "sound"),
];

/// Lowercase the name and map any synonym to its canonical command.
pub fn normalize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_map_case_insensitively() {
        assert_eq!(normalize("plat"), "platform");
        assert_eq!(normalize("TP"), "setpos");
        assert_eq!(normalize("Wait"), "after");
    }

    #[test]
    fn canonical_names_pass_through() {
        assert_eq!(normalize("Player"), "player");
        assert_eq!(normalize("frobnicate"), "frobnicate");
    }

    #[test]
    fn no_alias_is_declared_twice() {
        let mut seen = std::collections::HashSet::new();
        for (alias, _) in ALIASES {
            assert!(seen.insert(*alias), "duplicate alias {alias}");
        }
    }
}

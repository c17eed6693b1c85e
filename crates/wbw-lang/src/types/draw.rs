/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self { Self { r, g, b, a: 255 } }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// `#rgb`, `#rrggbb`, `#rrggbbaa` or a CSS-ish colour name.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        named(&s.to_ascii_lowercase())
    }

    /// Mix towards white by `t` in [0, 1].
    pub fn lighten(self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f64 + (255.0 - c as f64) * t).round() as u8;
        Color { r: mix(self.r), g: mix(self.g), b: mix(self.b), a: self.a }
    }

    pub fn with_alpha(self, a: u8) -> Color {
        Color { a, ..self }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) { return None; }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Color::rgb(nib(0)?, nib(1)?, nib(2)?))
        }
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color { r: byte(0)?, g: byte(2)?, b: byte(4)?, a: byte(6)? }),
        _ => None,
    }
}

fn named(name: &str) -> Option<Color> {
    let c = match name {
        "white"   => Color::WHITE,
        "black"   => Color::BLACK,
        "red"     => Color::rgb(239, 68, 68),
        "green"   => Color::rgb(34, 197, 94),
        "blue"    => Color::rgb(59, 130, 246),
        "yellow"  => Color::rgb(250, 204, 21),
        "orange"  => Color::rgb(249, 115, 22),
        "purple"  => Color::rgb(168, 85, 247),
        "pink"    => Color::rgb(236, 72, 153),
        "cyan"    => Color::rgb(6, 182, 212),
        "brown"   => Color::rgb(146, 64, 14),
        "gray" | "grey" => Color::rgb(107, 114, 128),
        "lightgray" | "lightgrey" => Color::rgb(209, 213, 219),
        "darkgray" | "darkgrey" => Color::rgb(55, 65, 81),
        "gold"    => Color::rgb(234, 179, 8),
        "sky"     => Color::rgb(125, 211, 252),
        "navy"    => Color::rgb(30, 58, 138),
        "lime"    => Color::rgb(132, 204, 22),
        "transparent" => Color { r: 0, g: 0, b: 0, a: 0 },
        _ => return None,
    };
    Some(c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// A single draw call in screen pixels (0,0 = top-left, y-down). The
/// renderer has already applied camera and shake offsets.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect { x: f64, y: f64, w: f64, h: f64, color: Color },
    Circle { x: f64, y: f64, r: f64, color: Color },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color },
    Triangle { points: [(f64, f64); 3], color: Color },
    Text { x: f64, y: f64, text: String, size: f64, color: Color, align: TextAlign },
}

impl DrawCommand {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DrawCommand::Clear(_)       => "clear",
            DrawCommand::Rect { .. }     => "rect",
            DrawCommand::Circle { .. }   => "circle",
            DrawCommand::Line { .. }     => "line",
            DrawCommand::Triangle { .. } => "triangle",
            DrawCommand::Text { .. }     => "text",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#00ff0080"), Some(Color { r: 0, g: 255, b: 0, a: 128 }));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
    }

    #[test]
    fn names_case_insensitive() {
        assert_eq!(Color::parse("Black"), Some(Color::BLACK));
        assert!(Color::parse("grey").is_some());
        assert_eq!(Color::parse("mauve-ish"), None);
    }

    #[test]
    fn lighten_moves_towards_white() {
        assert_eq!(Color::BLACK.lighten(1.0), Color::WHITE);
        assert_eq!(Color::BLACK.lighten(0.0), Color::BLACK);
    }
}

//! Character to physical key mapping for typing through synthetic key events.
//!
//! Assumes a US keyboard layout. Characters outside it are reported as
//! untypeable so callers can fall back to the clipboard.

use rdev::Key;

/// A key press needed to produce one character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keystroke {
    pub key: Key,
    pub shift: bool,
}

impl Keystroke {
    const fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    const fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

pub fn keystroke_for(c: char) -> Option<Keystroke> {
    if c.is_ascii_alphabetic() {
        let key = letter_key(c.to_ascii_lowercase())?;
        return Some(Keystroke {
            key,
            shift: c.is_ascii_uppercase(),
        });
    }

    let stroke = match c {
        '0' => Keystroke::plain(Key::Num0),
        '1' => Keystroke::plain(Key::Num1),
        '2' => Keystroke::plain(Key::Num2),
        '3' => Keystroke::plain(Key::Num3),
        '4' => Keystroke::plain(Key::Num4),
        '5' => Keystroke::plain(Key::Num5),
        '6' => Keystroke::plain(Key::Num6),
        '7' => Keystroke::plain(Key::Num7),
        '8' => Keystroke::plain(Key::Num8),
        '9' => Keystroke::plain(Key::Num9),
        ')' => Keystroke::shifted(Key::Num0),
        '!' => Keystroke::shifted(Key::Num1),
        '@' => Keystroke::shifted(Key::Num2),
        '#' => Keystroke::shifted(Key::Num3),
        '$' => Keystroke::shifted(Key::Num4),
        '%' => Keystroke::shifted(Key::Num5),
        '^' => Keystroke::shifted(Key::Num6),
        '&' => Keystroke::shifted(Key::Num7),
        '*' => Keystroke::shifted(Key::Num8),
        '(' => Keystroke::shifted(Key::Num9),
        ' ' => Keystroke::plain(Key::Space),
        '-' => Keystroke::plain(Key::Minus),
        '_' => Keystroke::shifted(Key::Minus),
        '=' => Keystroke::plain(Key::Equal),
        '+' => Keystroke::shifted(Key::Equal),
        '[' => Keystroke::plain(Key::LeftBracket),
        '{' => Keystroke::shifted(Key::LeftBracket),
        ']' => Keystroke::plain(Key::RightBracket),
        '}' => Keystroke::shifted(Key::RightBracket),
        ';' => Keystroke::plain(Key::SemiColon),
        ':' => Keystroke::shifted(Key::SemiColon),
        '\'' => Keystroke::plain(Key::Quote),
        '"' => Keystroke::shifted(Key::Quote),
        '`' => Keystroke::plain(Key::BackQuote),
        '~' => Keystroke::shifted(Key::BackQuote),
        '\\' => Keystroke::plain(Key::BackSlash),
        '|' => Keystroke::shifted(Key::BackSlash),
        ',' => Keystroke::plain(Key::Comma),
        '<' => Keystroke::shifted(Key::Comma),
        '.' => Keystroke::plain(Key::Dot),
        '>' => Keystroke::shifted(Key::Dot),
        '/' => Keystroke::plain(Key::Slash),
        '?' => Keystroke::shifted(Key::Slash),
        _ => return None,
    };
    Some(stroke)
}

/// True when every character of `text` has a key on the US layout.
pub fn is_typeable(text: &str) -> bool {
    text.chars().all(|c| keystroke_for(c).is_some())
}

fn letter_key(c: char) -> Option<Key> {
    let key = match c {
        'a' => Key::KeyA,
        'b' => Key::KeyB,
        'c' => Key::KeyC,
        'd' => Key::KeyD,
        'e' => Key::KeyE,
        'f' => Key::KeyF,
        'g' => Key::KeyG,
        'h' => Key::KeyH,
        'i' => Key::KeyI,
        'j' => Key::KeyJ,
        'k' => Key::KeyK,
        'l' => Key::KeyL,
        'm' => Key::KeyM,
        'n' => Key::KeyN,
        'o' => Key::KeyO,
        'p' => Key::KeyP,
        'q' => Key::KeyQ,
        'r' => Key::KeyR,
        's' => Key::KeyS,
        't' => Key::KeyT,
        'u' => Key::KeyU,
        'v' => Key::KeyV,
        'w' => Key::KeyW,
        'x' => Key::KeyX,
        'y' => Key::KeyY,
        'z' => Key::KeyZ,
        _ => return None,
    };
    Some(key)
}

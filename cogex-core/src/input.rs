/// Key events the session understands, independent of the windowing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Enter,
    Escape,
    /// Letter key, normalized to uppercase.
    Char(char),
    Other,
}

impl Key {
    pub fn char(c: char) -> Self {
        Key::Char(c.to_ascii_uppercase())
    }

    pub fn is_quit(&self) -> bool {
        matches!(self, Key::Escape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_are_uppercased() {
        assert_eq!(Key::char('r'), Key::Char('R'));
        assert_eq!(Key::char('7'), Key::Char('7'));
        assert!(Key::Escape.is_quit());
        assert!(!Key::Space.is_quit());
    }
}

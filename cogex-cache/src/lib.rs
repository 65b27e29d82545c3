use lazy_static::lazy_static;
use std::sync::{PoisonError, RwLock};
pub use string_cache::DefaultAtom as Atom;

/// Append-only table of strings, addressed by insertion index
#[derive(Debug, Default)]
pub struct Interner {
    atoms: Vec<Atom>,
}

impl Interner {
    pub fn intern(&mut self, s: &str) -> usize {
        let atom = Atom::from(s);
        match self.atoms.iter().position(|a| *a == atom) {
            Some(idx) => idx,
            None => {
                self.atoms.push(atom);
                self.atoms.len() - 1
            }
        }
    }

    pub fn get(&self, id: usize) -> Option<Atom> {
        self.atoms.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

lazy_static! {
    static ref TEXT_INTERNER: RwLock<Interner> = RwLock::new(Interner::default());
}

/// Intern a label (instruction line, stimulus word, progress text) and return its id
pub fn intern_text(s: &str) -> usize {
    TEXT_INTERNER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .intern(s)
}

pub fn get_text(id: usize) -> Option<Atom> {
    TEXT_INTERNER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_id() {
        let mut interner = Interner::default();
        let red = interner.intern("RED");
        let blue = interner.intern("BLUE");
        assert_ne!(red, blue);
        assert_eq!(interner.intern("RED"), red);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.get(blue).as_deref(), Some("BLUE"));
        assert_eq!(interner.get(7), None);
    }

    #[test]
    fn global_table_round_trips() {
        let id = intern_text("Trial: 3/20");
        assert_eq!(get_text(id).as_deref(), Some("Trial: 3/20"));
    }
}

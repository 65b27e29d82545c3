/// Number of digits the N-back window remembers.
pub const HISTORY_CAPACITY: usize = 3;

/// Fixed-capacity ring of the most recently presented digits.
///
/// Pushing onto a full ring overwrites the oldest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigitHistory {
    slots: [u8; HISTORY_CAPACITY],
    head: usize,
    len: usize,
}

impl DigitHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history by pushing `digits` in order, oldest first.
    pub fn from_digits(digits: &[u8]) -> Self {
        let mut history = Self::new();
        for &d in digits {
            history.push(d);
        }
        history
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, digit: u8) {
        if self.len == HISTORY_CAPACITY {
            self.slots[self.head] = digit;
            self.head = (self.head + 1) % HISTORY_CAPACITY;
        } else {
            self.slots[(self.head + self.len) % HISTORY_CAPACITY] = digit;
            self.len += 1;
        }
    }

    /// `back(1)` is the newest digit, `back(2)` the one before it.
    pub fn back(&self, n: usize) -> Option<u8> {
        if n == 0 || n > self.len {
            return None;
        }
        Some(self.slots[(self.head + self.len - n) % HISTORY_CAPACITY])
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.len).map(move |i| self.slots[(self.head + i) % HISTORY_CAPACITY])
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }
}

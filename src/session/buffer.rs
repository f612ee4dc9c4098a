/// Decoded child output accumulated since the last reset.
///
/// Trigger matching always runs against this window only, so a prompt that
/// already fired cannot fire again on the same occurrence.
#[derive(Debug, Default, Clone)]
pub struct SessionBuffer {
    text: String,
}

impl SessionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn contains(&self, needle: &str) -> bool {
        !needle.is_empty() && self.text.contains(needle)
    }

    pub fn contains_any<S: AsRef<str>>(&self, needles: &[S]) -> bool {
        needles.iter().any(|n| self.contains(n.as_ref()))
    }

    pub fn reset(&mut self) {
        self.text.clear();
    }

    /// Drop everything up to and including the first occurrence of
    /// `needle`. Returns `false`, leaving the buffer untouched, if it is not
    /// present yet.
    pub fn discard_through(&mut self, needle: &str) -> bool {
        if needle.is_empty() {
            return false;
        }
        match self.text.find(needle) {
            Some(start) => {
                self.text.drain(..start + needle.len());
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }
}

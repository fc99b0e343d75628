use rand::Rng;

pub const LEAD_INS: [&str; 4] = [
    "Sure —",
    "Okay,",
    "Here’s what I can say:",
    "I can help with that.",
];

/// Chooses which lead-in to use.
pub trait LeadInPicker {
    /// Return an index below `len`.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform pick from the thread-local RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomLeadIn;

impl LeadInPicker for RandomLeadIn {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Always the same lead-in, wrapping around the list.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedLeadIn(pub usize);

impl LeadInPicker for FixedLeadIn {
    fn pick(&mut self, len: usize) -> usize {
        self.0 % len
    }
}

pub struct Humanizer<P> {
    picker: P,
}

impl<P: LeadInPicker> Humanizer<P> {
    pub fn new(picker: P) -> Self {
        Self { picker }
    }

    pub fn humanize(&mut self, text: &str) -> String {
        let intro = LEAD_INS[self.picker.pick(LEAD_INS.len())];
        format!("{intro} {}", text.trim())
    }
}

impl Default for Humanizer<RandomLeadIn> {
    fn default() -> Self {
        Self::new(RandomLeadIn)
    }
}

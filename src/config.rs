/// Tunables for a [`crate::Solver`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// The number of pins the search may attempt before giving up with
    /// [`crate::MatchError::SearchLimit`]
    pub max_rounds: u64,
}

impl SolverConfig {
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { max_rounds: 10_000 }
    }
}

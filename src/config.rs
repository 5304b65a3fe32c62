/// Settings read by every operation that folds or simplifies.
///
/// Folding decisions depend on `precision`: the same tree can simplify
/// differently after the working precision changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Working precision in bits.
    pub precision: u32,
    /// Evaluate constant subtrees as exact rationals where possible.
    pub rational_mode: bool,
    /// How deep simplification may re-enter polynomial algebra.
    pub recursion_budget: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: 165,
            rational_mode: false,
            recursion_budget: 1,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = crate::numeric::MIN_PRECISION.max(precision);
        self
    }

    #[must_use]
    pub fn with_rational_mode(mut self, rational_mode: bool) -> Self {
        self.rational_mode = rational_mode;
        self
    }

    #[must_use]
    pub fn with_recursion_budget(mut self, recursion_budget: u32) -> Self {
        self.recursion_budget = recursion_budget;
        self
    }

    /// Configuration for a nested call, or `None` once the budget is spent.
    pub(crate) fn nested(&self) -> Option<Config> {
        (self.recursion_budget > 0).then(|| Config {
            recursion_budget: self.recursion_budget - 1,
            ..self.clone()
        })
    }
}

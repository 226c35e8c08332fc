
/// Container for [TAGEPredictor](super::TAGEPredictor) runtime stats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TAGEStats {
    /// Allocations into each tagged component
    pub alcs: Vec<usize>,

    /// Correct predictions from the base component
    pub base_hits: usize,

    /// Misses in the base component
    pub base_miss: usize,

    /// Correct predictions from the tagged components
    pub comp_hits: Vec<usize>,

    /// Misses in the tagged components
    pub comp_miss: Vec<usize>,

    /// Number of 'useful' counter aging passes
    pub agings: usize,

    /// Number of updates
    pub clk: u64,
}
impl TAGEStats {
    pub fn new(num_comp: usize) -> Self {
        Self {
            alcs: vec![0; num_comp],
            base_hits: 0,
            base_miss: 0,
            comp_hits: vec![0; num_comp],
            comp_miss: vec![0; num_comp],
            agings: 0,
            clk: 0,
        }
    }

    /// Total number of successful allocations.
    pub fn total_alcs(&self) -> usize {
        self.alcs.iter().sum()
    }
}

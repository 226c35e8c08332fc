//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    pub fn from_bool(b: bool) -> Self {
        match b {
            true => Self::T,
            false => Self::N,
        }
    }

    pub fn is_taken(&self) -> bool {
        matches!(self, Self::T)
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self { Self::from_bool(x) }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> bool { x.is_taken() }
}

/// Representing different kinds of branch/control-flow instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BranchKind {
    /// A direct conditional branch instruction.
    DirectBranch,

    /// A direct unconditional jump instruction.
    DirectJump,

    /// An indirect unconditional jump instruction.
    IndirectJump,

    /// A direct procedure call instruction.
    DirectCall,

    /// An indirect procedure call instruction.
    IndirectCall,

    /// A return instruction.
    Return,
}
impl BranchKind {
    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::DirectBranch)
    }
    pub fn is_call(&self) -> bool {
        matches!(self, Self::DirectCall | Self::IndirectCall)
    }
    pub fn is_return(&self) -> bool {
        matches!(self, Self::Return)
    }
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::DirectBranch | Self::DirectJump | Self::DirectCall)
    }
}

/// A record of branch execution, as delivered by a trace-driven simulator
/// once the branch has resolved.
///
/// Only [`BranchRecord::is_conditional`] and the outcome are consumed by the
/// direction predictors; the target and the call/return/direct properties
/// are carried so that every predictor kind shares one training interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: u32,

    /// The target address evaluated for this branch
    pub target: u32,

    /// The type/kind of branch
    pub kind: BranchKind,

    /// The outcome evaluated for this branch
    pub outcome: Outcome,
}
impl BranchRecord {
    pub fn new(pc: u32, target: u32, kind: BranchKind, outcome: Outcome)
        -> Self
    {
        Self { pc, target, kind, outcome }
    }

    /// Shorthand for a resolved conditional branch with no known target.
    pub fn conditional(pc: u32, outcome: Outcome) -> Self {
        Self::new(pc, 0, BranchKind::DirectBranch, outcome)
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        self.kind.is_conditional()
    }

    /// Returns 'true' if this is a "call" instruction.
    pub fn is_call(&self) -> bool {
        self.kind.is_call()
    }

    /// Returns 'true' if this is a "return" instruction.
    pub fn is_return(&self) -> bool {
        self.kind.is_return()
    }

    /// Returns 'true' if this instruction directly specifies the target.
    pub fn is_direct(&self) -> bool {
        self.kind.is_direct()
    }
}

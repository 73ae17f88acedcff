#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Operator interrupt (ctrl-c): the sweep stopped issuing requests and
    /// exited with whatever rows were already written.
    Interrupted = 10,

    /// Invalid CLI/config input (bad flags, unreadable or invalid YAML,
    /// semantic config errors).
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, unexpected invariants).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

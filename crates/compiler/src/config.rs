/// Tunables the compiler needs but the language itself leaves unspecified.
///
/// Constructed in-process by whichever front end drives the compiler (the
/// `ape` CLI, a REPL, an embedder); there is no on-disk config file or
/// environment-variable parsing here, matching the teacher's own
/// `CompilerConfig`.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    is_repl: bool,
}

impl CompilerConfig {
    pub fn new() -> Self {
        CompilerConfig { is_repl: false }
    }

    /// When set, expression statements print their value instead of
    /// discarding it (`OP_PRINT` instead of `OP_POP`).
    pub fn repl(mut self, is_repl: bool) -> Self {
        self.is_repl = is_repl;
        self
    }

    pub fn is_repl(&self) -> bool {
        self.is_repl
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::new()
    }
}

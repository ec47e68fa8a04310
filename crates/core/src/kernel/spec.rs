/// A named execution kernel resolved to an interpreter executable.
///
/// Kernel choice is an explicit part of every
/// [`ExecutionConfig`](crate::driver::ExecutionConfig); there is no ambient
/// fallback. The documented default kernel is `python3`, available via
/// [`KernelSpec::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSpec {
    name: String,
    interpreter: String,
}

impl KernelSpec {
    /// Name of the default kernel.
    pub const DEFAULT_NAME: &'static str = "python3";

    /// Resolve a kernel by name.
    ///
    /// The common Jupyter aliases `python` and `python3` both resolve to
    /// the system `python3` interpreter. Any other name is taken to be the
    /// interpreter executable itself, resolved on PATH at spawn time.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let interpreter = match name.as_str() {
            "python" | "python3" => "python3".to_string(),
            other => other.to_string(),
        };
        Self { name, interpreter }
    }

    /// A kernel with an explicitly chosen interpreter executable, bypassing
    /// name resolution.
    pub fn with_interpreter(name: impl Into<String>, interpreter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interpreter: interpreter.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

impl Default for KernelSpec {
    fn default() -> Self {
        Self::named(Self::DEFAULT_NAME)
    }
}

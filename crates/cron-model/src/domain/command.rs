use std::fmt;

use crate::ModelError;

/// Command to supervise: a program followed by its arguments.
///
/// Never empty; construction fails with [`ModelError::EmptyCommand`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine(Vec<String>);

impl CommandLine {
    /// Build a command line from raw process arguments (program name excluded).
    pub fn new<I, S>(args: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.is_empty() {
            return Err(ModelError::EmptyCommand);
        }
        Ok(Self(args))
    }

    /// Program to execute (first element).
    pub fn program(&self) -> &str {
        &self.0[0]
    }

    /// Arguments passed to the program (everything after the first element).
    pub fn args(&self) -> &[String] {
        &self.0[1..]
    }

    /// All elements, program included, in order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with [`CommandLine::len`].
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        let err = CommandLine::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyCommand));
        assert_eq!(
            err.to_string(),
            "No arguments provided. Nothing to do. Run 'help' for usage."
        );
    }

    #[test]
    fn splits_program_and_args() {
        let cmd = CommandLine::new(["ls", "-la", "/tmp"]).unwrap();
        assert_eq!(cmd.program(), "ls");
        assert_eq!(cmd.args(), ["-la".to_string(), "/tmp".to_string()]);
        assert_eq!(cmd.len(), 3);
    }

    #[test]
    fn single_element_has_no_args() {
        let cmd = CommandLine::new(["true"]).unwrap();
        assert_eq!(cmd.program(), "true");
        assert!(cmd.args().is_empty());
        assert_eq!(cmd.to_string(), "true");
    }
}

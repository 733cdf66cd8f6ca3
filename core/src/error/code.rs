/// Stable error codes surfaced by the CLI (exit status) and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    GeneralError = 1,
    ParseError = 2,
    ValidationError = 3,
    MissingField = 4,
    FileNotFound = 5,
    TaskNotFound = 10,
    DependencyError = 11,
    CircularDependency = 12,
    CompilationError = 13,
    RunnerError = 20,
    NetworkError = 40,
    RemoteConflict = 41,
    TransportError = 42,
    ConfigError = 50,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_stage() {
        let input = [
            ErrorCode::ParseError,
            ErrorCode::ValidationError,
            ErrorCode::MissingField,
            ErrorCode::FileNotFound,
        ];
        assert!(input.iter().all(|c| (1..10).contains(&c.as_u16())));
        assert_eq!(ErrorCode::FileNotFound.as_u16(), 5);
        assert_eq!(ErrorCode::CompilationError.as_u16(), 13);
        assert_eq!(ErrorCode::RunnerError.as_u16(), 20);
        assert_eq!(ErrorCode::RemoteConflict.as_u16(), 41);
    }
}

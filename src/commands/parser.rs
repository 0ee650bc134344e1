//! Line parser for the operator console
//!
//! Parses one trimmed line of console input into a [`Command`].

use crate::commands::types::{Command, ParseError};
use crate::report::ReportMode;

/// Parse a single console line.
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().ok_or(ParseError::Empty)?;

    let command = match verb {
        "a" => Command::AutoPairOn,
        "m" => Command::AutoPairOff,
        "p" => Command::PairWith(parse_id(tokens.next())?),
        "k" => Command::SetReportMode(ReportMode::KnownOnly),
        "u" => Command::SetReportMode(ReportMode::AllValid),
        "b" => Command::SetReportMode(ReportMode::All),
        "n" => Command::AddTransmitter(parse_id(tokens.next())?),
        "c" => match tokens.next() {
            Some("t") => Command::ClearTransmitters,
            Some("x") => Command::ClearTransceivers,
            Some(_) => return Err(ParseError::InvalidArgument),
            None => return Err(ParseError::MissingArgument),
        },
        _ => return Err(ParseError::UnknownCommand),
    };

    // Trailing tokens are not part of the grammar
    if tokens.next().is_some() {
        return Err(ParseError::InvalidArgument);
    }

    Ok(command)
}

fn parse_id(token: Option<&str>) -> Result<u32, ParseError> {
    let token = token.ok_or(ParseError::MissingArgument)?;
    token.parse().map_err(|_| ParseError::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_toggles() {
        assert_eq!(parse_line("a"), Ok(Command::AutoPairOn));
        assert_eq!(parse_line("m"), Ok(Command::AutoPairOff));
    }

    #[test]
    fn test_parse_pair_with_id() {
        assert_eq!(parse_line("p 1234"), Ok(Command::PairWith(1234)));
    }

    #[test]
    fn test_parse_report_modes() {
        assert_eq!(parse_line("k"), Ok(Command::SetReportMode(ReportMode::KnownOnly)));
        assert_eq!(parse_line("u"), Ok(Command::SetReportMode(ReportMode::AllValid)));
        assert_eq!(parse_line("b"), Ok(Command::SetReportMode(ReportMode::All)));
    }

    #[test]
    fn test_parse_add_transmitter() {
        assert_eq!(parse_line("n 99"), Ok(Command::AddTransmitter(99)));
    }

    #[test]
    fn test_parse_clears() {
        assert_eq!(parse_line("c t"), Ok(Command::ClearTransmitters));
        assert_eq!(parse_line("c x"), Ok(Command::ClearTransceivers));
        assert_eq!(parse_line("c q"), Err(ParseError::InvalidArgument));
        assert_eq!(parse_line("c"), Err(ParseError::MissingArgument));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert_eq!(parse_line(""), Err(ParseError::Empty));
        assert_eq!(parse_line("   "), Err(ParseError::Empty));
        assert_eq!(parse_line("z"), Err(ParseError::UnknownCommand));
        assert_eq!(parse_line("p"), Err(ParseError::MissingArgument));
        assert_eq!(parse_line("p ten"), Err(ParseError::InvalidArgument));
        assert_eq!(parse_line("p 5 6"), Err(ParseError::InvalidArgument));
        assert_eq!(parse_line("a extra"), Err(ParseError::InvalidArgument));
    }

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        assert_eq!(parse_line("  p   42  "), Ok(Command::PairWith(42)));
    }
}

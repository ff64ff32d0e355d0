//! Serial debug commands.

use crate::engine::TargetId;
use crate::error::CommandError;

/// A character typed on the debug console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugCommand {
    /// `s`
    Start,
    /// `r`
    Reset,
    /// `1`..`N`: pretend the sensor of that target fired
    Catch(TargetId),
}

impl DebugCommand {
    /// Parses one character.
    ///
    /// # Errors
    ///
    /// [`CommandError::Unrecognized`] for anything outside the vocabulary and
    /// [`CommandError::TargetOutOfRange`] for a digit above `targets`.
    pub fn parse(ch: char, targets: usize) -> Result<Self, CommandError> {
        match ch {
            's' => Ok(Self::Start),
            'r' => Ok(Self::Reset),
            '1'..='9' => {
                let number = ch as usize - '0' as usize;
                TargetId::from_number(number, targets)
                    .map(Self::Catch)
                    .ok_or(CommandError::TargetOutOfRange { number, targets })
            }
            other => Err(CommandError::Unrecognized(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_letters() {
        assert_eq!(DebugCommand::parse('s', 5), Ok(DebugCommand::Start));
        assert_eq!(DebugCommand::parse('r', 5), Ok(DebugCommand::Reset));
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(
            DebugCommand::parse('1', 5),
            Ok(DebugCommand::Catch(TargetId::new(0)))
        );
        assert_eq!(
            DebugCommand::parse('5', 5),
            Ok(DebugCommand::Catch(TargetId::new(4)))
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range_digit() {
        assert_eq!(
            DebugCommand::parse('6', 5),
            Err(CommandError::TargetOutOfRange {
                number: 6,
                targets: 5
            })
        );
    }

    #[test]
    fn test_parse_rejects_other_input() {
        assert!(DebugCommand::parse('0', 5).is_err());
        assert!(DebugCommand::parse('S', 5).is_err());
        assert!(DebugCommand::parse('\n', 5).is_err());
        assert!(DebugCommand::parse('q', 5).is_err());
    }
}

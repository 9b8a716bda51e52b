use std::str::FromStr;

use crate::error::StatusError;

/// Script that asks the controller to report `Robot[0].CoordRobot` on
/// channel 90.
pub const POSITION_QUERY: &str = "1,ListenSend(90,GetString(Robot[0].CoordRobot))";

/// How outbound commands are put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryFraming {
    /// Send the command text unchanged.
    Raw,
    /// Wrap it in a `$TMSCT` external-script packet.
    #[default]
    Tmsct,
}

impl QueryFraming {
    pub fn frame(self, command: &str) -> String {
        match self {
            QueryFraming::Raw => command.to_string(),
            QueryFraming::Tmsct => encode_tmsct(command),
        }
    }
}

impl FromStr for QueryFraming {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(QueryFraming::Raw),
            "tmsct" => Ok(QueryFraming::Tmsct),
            other => Err(StatusError::UnknownFraming(other.to_string())),
        }
    }
}

/// `$TMSCT,<len>,<script>,*<CS>\r\n`
///
/// `len` is the byte length of `script`; `CS` is the XOR of every byte
/// between `$` and `*`, as two uppercase hex digits.
pub fn encode_tmsct(script: &str) -> String {
    let body = format!("TMSCT,{},{},", script.len(), script);
    format!("${body}*{:02X}\r\n", checksum(body.as_bytes()))
}

pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_packet() {
        assert_eq!(
            encode_tmsct(r#"1,ChangeBase("RobotBase")"#),
            "$TMSCT,25,1,ChangeBase(\"RobotBase\"),*08\r\n"
        );
    }

    #[test]
    fn frames_the_position_query() {
        assert_eq!(
            encode_tmsct(POSITION_QUERY),
            "$TMSCT,47,1,ListenSend(90,GetString(Robot[0].CoordRobot)),*71\r\n"
        );
    }

    #[test]
    fn raw_framing_is_passthrough() {
        assert_eq!(QueryFraming::Raw.frame("hello"), "hello");
    }

    #[test]
    fn framing_parses_from_config_names() {
        assert_eq!("raw".parse::<QueryFraming>().unwrap(), QueryFraming::Raw);
        assert_eq!("tmsct".parse::<QueryFraming>().unwrap(), QueryFraming::Tmsct);
        assert!("json".parse::<QueryFraming>().is_err());
    }
}

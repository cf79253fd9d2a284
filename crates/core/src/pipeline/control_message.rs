use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::session_config::ConfigUpdate;

#[derive(Error, Debug)]
pub enum ControlMessageError {
    #[error("malformed control message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Textual message arriving on the control side of a session channel.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    Configure(ConfigUpdate),
}

impl ControlMessage {
    pub fn parse(text: &str) -> Result<Self, ControlMessageError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parses_full_configure() {
        let msg =
            ControlMessage::parse(r#"{"type":"configure","sensitivity":0.8,"motionRejection":40}"#)
                .unwrap();
        assert_eq!(
            msg,
            ControlMessage::Configure(ConfigUpdate {
                sensitivity: Some(0.8),
                motion_rejection: Some(40.0),
            })
        );
    }

    #[rstest]
    #[case::only_sensitivity(r#"{"type":"configure","sensitivity":55}"#, Some(55.0), None)]
    #[case::only_motion(r#"{"type":"configure","motionRejection":10}"#, None, Some(10.0))]
    #[case::explicit_null(r#"{"type":"configure","sensitivity":null}"#, None, None)]
    #[case::bare(r#"{"type":"configure"}"#, None, None)]
    fn test_partial_configure(
        #[case] text: &str,
        #[case] sensitivity: Option<f64>,
        #[case] motion_rejection: Option<f64>,
    ) {
        let ControlMessage::Configure(update) = ControlMessage::parse(text).unwrap();
        assert_eq!(update.sensitivity, sensitivity);
        assert_eq!(update.motion_rejection, motion_rejection);
    }

    #[rstest]
    #[case::not_json("configure please")]
    #[case::unknown_type(r#"{"type":"restart"}"#)]
    #[case::missing_type(r#"{"sensitivity":1}"#)]
    #[case::non_numeric(r#"{"type":"configure","sensitivity":"high"}"#)]
    fn test_malformed_messages(#[case] text: &str) {
        assert!(ControlMessage::parse(text).is_err());
    }
}

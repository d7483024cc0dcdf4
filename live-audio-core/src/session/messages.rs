//! Inbound messages from the realtime voice service.

use serde::{Deserialize, Serialize};

use crate::models::error::LiveAudioError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_content: Option<ServerContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_turn: Option<ModelTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_transcription: Option<Transcription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_transcription: Option<Transcription>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ServerMessage {
    pub fn from_json(json: &str) -> Result<Self, LiveAudioError> {
        serde_json::from_str(json).map_err(|e| LiveAudioError::MalformedMessage(e.to_string()))
    }

    /// Base64 audio carried by the model turn, in part order.
    ///
    /// Only inline data with an `audio/` mime type and a non-empty payload
    /// counts.
    pub fn audio_chunks(&self) -> impl Iterator<Item = &str> {
        self.server_content
            .iter()
            .filter_map(|content| content.model_turn.as_ref())
            .flat_map(|turn| turn.parts.iter())
            .filter_map(|part| part.inline_data.as_ref())
            .filter(|inline| {
                inline
                    .mime_type
                    .as_deref()
                    .is_some_and(|mime| mime.starts_with("audio/"))
            })
            .filter_map(|inline| inline.data.as_deref())
            .filter(|data| !data.is_empty())
    }

    /// Transcribed user speech, if this message carries any.
    pub fn input_text(&self) -> Option<&str> {
        self.server_content
            .as_ref()?
            .input_transcription
            .as_ref()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Transcribed model speech, if this message carries any.
    pub fn output_text(&self) -> Option<&str> {
        self.server_content
            .as_ref()?
            .output_transcription
            .as_ref()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audio_parts_in_order() {
        let msg = ServerMessage::from_json(
            r#"{"serverContent":{"modelTurn":{"parts":[
                {"inlineData":{"mimeType":"audio/pcm;rate=24000","data":"AAA="}},
                {"text":"hello"},
                {"inlineData":{"mimeType":"image/png","data":"iVBO"}},
                {"inlineData":{"mimeType":"audio/pcm","data":""}},
                {"inlineData":{"mimeType":"audio/pcm;rate=24000","data":"AQA="}}
            ]}}}"#,
        )
        .unwrap();

        let chunks: Vec<&str> = msg.audio_chunks().collect();
        assert_eq!(chunks, vec!["AAA=", "AQA="]);
    }

    #[test]
    fn parses_transcriptions() {
        let msg = ServerMessage::from_json(
            r#"{"serverContent":{
                "inputTranscription":{"text":"こんにちは"},
                "outputTranscription":{"text":""}
            }}"#,
        )
        .unwrap();

        assert_eq!(msg.input_text(), Some("こんにちは"));
        assert_eq!(msg.output_text(), None);
        assert_eq!(msg.audio_chunks().count(), 0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let msg = ServerMessage::from_json(r#"{"setupComplete":{},"usageMetadata":{"totalTokenCount":3}}"#)
            .unwrap();
        assert_eq!(msg, ServerMessage::default());
    }

    #[test]
    fn invalid_json_is_malformed() {
        assert!(matches!(
            ServerMessage::from_json("{"),
            Err(LiveAudioError::MalformedMessage(_))
        ));
    }
}

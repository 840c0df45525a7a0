/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! JSON envelope codec for in-process transports.
//!
//! A frame is one JSON object carrying the sender's device and stream id, a
//! per-encoder sequence counter and the ordered message list. Frames shorter
//! than the context minimum are padded with trailing whitespace.

use crate::codec::{CodecError, DataContext, MessageDecoder, MessageEncoder};
use crate::message::{CmpMessage, DeviceId, StreamId};
use serde::{Deserialize, Serialize};

pub const FRAME_VERSION: u8 = 1;

#[derive(Serialize)]
struct FrameRef<'a> {
    version: u8,
    device_id: DeviceId,
    stream_id: StreamId,
    sequence: u16,
    messages: &'a [CmpMessage],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Frame {
    version: u8,
    #[allow(dead_code)]
    device_id: DeviceId,
    #[allow(dead_code)]
    stream_id: StreamId,
    #[allow(dead_code)]
    sequence: u16,
    messages: Vec<CmpMessage>,
}

#[derive(Debug, Default)]
pub struct JsonFrameEncoder {
    device_id: DeviceId,
    stream_id: StreamId,
    sequence: u16,
}

impl JsonFrameEncoder {
    pub fn new(device_id: DeviceId, stream_id: StreamId) -> Self {
        Self {
            device_id,
            stream_id,
            sequence: 0,
        }
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Sequence number the next frame will carry.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    fn render(&self, messages: &[CmpMessage], context: &DataContext) -> Result<Vec<u8>, CodecError> {
        let frame = FrameRef {
            version: FRAME_VERSION,
            device_id: self.device_id,
            stream_id: self.stream_id,
            sequence: self.sequence,
            messages,
        };
        let mut bytes =
            serde_json::to_vec(&frame).map_err(|err| CodecError::Serialize(err.to_string()))?;
        if bytes.len() > context.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size: bytes.len(),
                max: context.max_frame_size,
            });
        }
        if bytes.len() < context.min_frame_size {
            bytes.resize(context.min_frame_size, b' ');
        }
        Ok(bytes)
    }
}

impl MessageEncoder for JsonFrameEncoder {
    fn set_device_id(&mut self, device_id: DeviceId) {
        self.device_id = device_id;
    }

    fn set_stream_id(&mut self, stream_id: StreamId) {
        self.stream_id = stream_id;
    }

    fn encode(
        &mut self,
        message: &CmpMessage,
        context: &DataContext,
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        let frame = self.render(std::slice::from_ref(message), context)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(vec![frame])
    }

    // Packs as many consecutive messages per frame as the maximum size allows.
    fn encode_batch(
        &mut self,
        messages: &[CmpMessage],
        context: &DataContext,
    ) -> Result<Vec<Vec<u8>>, CodecError> {
        let mut frames = Vec::new();
        let mut start = 0;
        while start < messages.len() {
            let mut end = start + 1;
            let mut frame = self.render(&messages[start..end], context)?;
            while end < messages.len() {
                match self.render(&messages[start..=end], context) {
                    Ok(larger) => {
                        frame = larger;
                        end += 1;
                    }
                    Err(CodecError::FrameTooLarge { .. }) => break,
                    Err(err) => return Err(err),
                }
            }
            frames.push(frame);
            self.sequence = self.sequence.wrapping_add(1);
            start = end;
        }
        Ok(frames)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFrameDecoder;

impl MessageDecoder for JsonFrameDecoder {
    fn decode(&self, frame: &[u8]) -> Result<Vec<CmpMessage>, CodecError> {
        let frame: Frame =
            serde_json::from_slice(frame).map_err(|err| CodecError::Malformed(err.to_string()))?;
        if frame.version != FRAME_VERSION {
            return Err(CodecError::UnsupportedVersion(frame.version));
        }
        Ok(frame.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonFrameDecoder, JsonFrameEncoder};
    use crate::codec::{CodecError, DataContext, MessageDecoder, MessageEncoder};
    use crate::message::{CmpMessage, Payload};
    use crate::routing::route_key::RouteKey;

    fn analog(stream_id: u8, samples: usize) -> CmpMessage {
        CmpMessage::data(
            RouteKey::new(1, 0, stream_id),
            42,
            Payload::Analog {
                samples: vec![7; samples],
            },
        )
    }

    #[test]
    fn short_frames_are_padded_to_minimum_size() {
        let mut encoder = JsonFrameEncoder::new(1, 0);
        let context = DataContext {
            min_frame_size: 512,
            max_frame_size: 1500,
        };

        let frames = encoder.encode(&analog(0, 1), &context).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), 512);
        assert_eq!(
            JsonFrameDecoder.decode(&frames[0]).unwrap(),
            vec![analog(0, 1)]
        );
    }

    #[test]
    fn batch_is_split_when_frames_would_exceed_maximum() {
        let mut encoder = JsonFrameEncoder::new(1, 0);
        let messages: Vec<CmpMessage> = (0..6).map(|stream| analog(stream, 20)).collect();
        let single = encoder.render(&messages[..1], &DataContext::default()).unwrap();
        let context = DataContext {
            min_frame_size: 0,
            max_frame_size: single.len() * 2,
        };

        let frames = encoder.encode_batch(&messages, &context).unwrap();

        assert!(frames.len() > 1);
        assert!(frames.iter().all(|frame| frame.len() <= context.max_frame_size));
        let decoded: Vec<CmpMessage> = frames
            .iter()
            .flat_map(|frame| JsonFrameDecoder.decode(frame).unwrap())
            .collect();
        assert_eq!(decoded, messages);
        assert_eq!(usize::from(encoder.sequence()), frames.len());
    }

    #[test]
    fn oversized_message_fails_without_advancing_sequence() {
        let mut encoder = JsonFrameEncoder::new(1, 0);
        let context = DataContext {
            min_frame_size: 0,
            max_frame_size: 32,
        };

        let result = encoder.encode(&analog(0, 100), &context);

        assert!(matches!(
            result,
            Err(CodecError::FrameTooLarge { max: 32, .. })
        ));
        assert_eq!(encoder.sequence(), 0);
    }

    #[test]
    fn garbage_and_foreign_versions_are_rejected() {
        assert!(matches!(
            JsonFrameDecoder.decode(b"\x00\x01not json"),
            Err(CodecError::Malformed(_))
        ));
        let foreign =
            br#"{"version":9,"device_id":1,"stream_id":0,"sequence":0,"messages":[]}"#;
        assert_eq!(
            JsonFrameDecoder.decode(foreign),
            Err(CodecError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn encoder_identity_is_reconfigurable() {
        let mut encoder = JsonFrameEncoder::default();
        encoder.set_device_id(12);
        encoder.set_stream_id(3);

        assert_eq!((encoder.device_id(), encoder.stream_id()), (12, 3));
    }
}

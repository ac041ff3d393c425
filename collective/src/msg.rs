//! The application-layer messages exchanged inside a group.

use std::{borrow::Cow, io};

use crate::frame::{WireDecode, WireEncode};

type Kind = u32;
const KIND_SIZE: usize = size_of::<Kind>();

const ERR_K: Kind = 0;
const CONTROL_K: Kind = 1;
const VECTOR_K: Kind = 2;
const SCALAR_K: Kind = 3;

/// Numeric payload for the `Data` variant.
#[derive(Debug, PartialEq)]
pub enum Payload<'a> {
    Vector(&'a [f32]),
    Scalar(f32),
}

/// Group-control commands, JSON-encoded on the wire.
#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Presented by a member right after connecting.
    Join { id: String },
    /// Broadcast receipt acknowledgment.
    Ack,
    /// Reduce-round completion; releases blocked contributors.
    Done,
    /// End of run; no further rounds will be issued.
    Shutdown,
}

/// A single protocol message.
#[derive(Debug, PartialEq)]
pub enum Msg<'a> {
    Control(Command),
    Data(Payload<'a>),
    Err(Cow<'a, str>),
}

impl Msg<'_> {
    /// Short label used in logs and protocol-violation errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Control(Command::Join { .. }) => "control/join",
            Msg::Control(Command::Ack) => "control/ack",
            Msg::Control(Command::Done) => "control/done",
            Msg::Control(Command::Shutdown) => "control/shutdown",
            Msg::Data(Payload::Vector(_)) => "data/vector",
            Msg::Data(Payload::Scalar(_)) => "data/scalar",
            Msg::Err(_) => "err",
        }
    }

    fn invalid_kind<T>(kind: Kind) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("received an invalid frame kind {kind}"),
        ))
    }

    fn too_short<T>(size: usize) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame body of {size} bytes is shorter than the {KIND_SIZE} byte kind header"),
        ))
    }
}

impl<'a> WireEncode<'a> for Msg<'a> {
    fn encode(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]> {
        match self {
            Msg::Err(detail) => {
                buf.extend_from_slice(&ERR_K.to_be_bytes());
                Some(detail.as_bytes())
            }
            Msg::Control(cmd) => {
                buf.extend_from_slice(&CONTROL_K.to_be_bytes());

                // SAFETY: Serialize impl for `Command` is derived and not
                //         implemented by hand. Nor has a non string-key map
                //         inside.
                serde_json::to_writer(buf, cmd).unwrap();
                None
            }
            Msg::Data(Payload::Vector(values)) => {
                buf.extend_from_slice(&VECTOR_K.to_be_bytes());
                Some(bytemuck::cast_slice(values))
            }
            Msg::Data(Payload::Scalar(value)) => {
                buf.extend_from_slice(&SCALAR_K.to_be_bytes());
                buf.extend_from_slice(bytemuck::bytes_of(value));
                None
            }
        }
    }
}

impl<'a> WireDecode<'a> for Msg<'a> {
    fn decode(buf: &'a [u8]) -> io::Result<Self> {
        if buf.len() < KIND_SIZE {
            return Self::too_short(buf.len());
        }

        let (kind_buf, body) = buf.split_at(KIND_SIZE);

        // SAFETY: We splitted the buffer to be of size `KIND_SIZE` just above.
        let kind = Kind::from_be_bytes(kind_buf.try_into().unwrap());

        match kind {
            ERR_K => {
                let detail = str::from_utf8(body)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                Ok(Msg::Err(Cow::Borrowed(detail)))
            }
            CONTROL_K => Ok(Msg::Control(serde_json::from_slice(body)?)),
            VECTOR_K => {
                let values = bytemuck::try_cast_slice(body).map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("bad vector payload: {e}"))
                })?;
                Ok(Msg::Data(Payload::Vector(values)))
            }
            SCALAR_K => {
                let value = bytemuck::try_pod_read_unaligned(body).map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("bad scalar payload: {e}"))
                })?;
                Ok(Msg::Data(Payload::Scalar(value)))
            }
            kind => Self::invalid_kind(kind),
        }
    }
}

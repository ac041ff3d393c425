//! Length-prefixed framing over any async byte stream.

use std::io;

use bytemuck::Zeroable;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

type LenType = u64;
const LEN_SIZE: usize = size_of::<LenType>();

/// Types that can be written as one frame body.
///
/// `encode` appends to `buf` and may additionally return a borrowed tail
/// that is written after `buf` without copying.
pub trait WireEncode<'a> {
    fn encode(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]>;
}

/// Types that can be read out of a received frame body.
pub trait WireDecode<'a>: Sized {
    fn decode(buf: &'a [u8]) -> io::Result<Self>;
}

/// Marker for primitive numeric types with at least 4-byte alignment,
/// usable as backing storage for frames whose payload casts to `f32`.
pub trait Align4: bytemuck::Pod {}

impl Align4 for u32 {}
impl Align4 for i32 {}
impl Align4 for f32 {}
impl Align4 for u64 {}
impl Align4 for i64 {}
impl Align4 for f64 {}

/// The sending half of a framed transport.
pub struct FrameSender<W: AsyncWrite + Unpin> {
    tx: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> FrameSender<W> {
    pub(crate) fn new(tx: W) -> Self {
        Self {
            tx,
            buf: Vec::new(),
        }
    }

    /// Sends one frame: length prefix, encoded body, optional borrowed tail.
    ///
    /// # Arguments
    /// * `msg` - An encodable object.
    ///
    /// # Returns
    /// A result object that returns `io::Error` on failure.
    pub async fn send<'a, T: WireEncode<'a>>(&mut self, msg: &'a T) -> io::Result<()> {
        let Self { buf, tx } = self;

        buf.clear();
        buf.resize(LEN_SIZE, 0);

        let tail = msg.encode(buf);
        let len = buf.len() - LEN_SIZE + tail.map(<[_]>::len).unwrap_or_default();
        buf[..LEN_SIZE].copy_from_slice(&(len as LenType).to_be_bytes());

        tx.write_all(buf).await?;
        if let Some(tail) = tail {
            tx.write_all(tail).await?;
        }

        tx.flush().await
    }
}

/// The receiving half of a framed transport.
pub struct FrameReceiver<R: AsyncRead + Unpin> {
    rx: R,
}

impl<R: AsyncRead + Unpin> FrameReceiver<R> {
    pub(crate) fn new(rx: R) -> Self {
        Self { rx }
    }

    /// Waits for the next frame, reads it into `buf` and decodes it.
    ///
    /// # Arguments
    /// * `buf` - The backing storage for the frame body; the returned `T`'s
    ///           lifetime is tied to it. A 4-byte-aligned element type keeps
    ///           `f32` payload views castable.
    ///
    /// # Returns
    /// A result object that returns `T` on success or `io::Error` on
    /// failure.
    pub async fn recv_into<'buf, T, B>(&mut self, buf: &'buf mut Vec<B>) -> io::Result<T>
    where
        T: WireDecode<'buf>,
        B: Align4,
    {
        let mut len_buf = [0; LEN_SIZE];
        self.rx.read_exact(&mut len_buf).await?;
        let len = LenType::from_be_bytes(len_buf) as usize;

        buf.resize(len.div_ceil(size_of::<B>()), B::zeroed());
        let view: &mut [u8] = bytemuck::cast_slice_mut(buf.as_mut_slice());
        let body = &mut view[..len];
        self.rx.read_exact(body).await?;

        T::decode(body)
    }
}

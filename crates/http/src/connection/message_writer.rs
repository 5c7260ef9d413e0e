use bytes::{Buf, BytesMut};
use tokio::io::AsyncWrite;
use tokio_util::codec::Encoder;

use crate::codec::ResponseEncoder;
use crate::connection::channel::ChannelWriter;
use crate::protocol::{Message, PayloadSize, ResponseHead, SendError};

/// Encodes responses into a staging buffer and flushes it through the channel.
#[derive(Debug)]
pub struct MessageWriter<W> {
    channel: ChannelWriter<W>,
    buffer: BytesMut,
    encoder: ResponseEncoder,
    flushed: bool,
}

impl<W> MessageWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn with_capacity(channel: ChannelWriter<W>, buffer_size: usize) -> Self {
        Self { channel, buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new(), flushed: false }
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut ChannelWriter<W> {
        &mut self.channel
    }

    /// Drops everything staged but not yet flushed and starts a fresh response.
    pub fn clear_buf(&mut self) {
        self.buffer.clear();
        self.encoder.reset();
        self.flushed = false;
    }

    /// True when no response is partially encoded.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.encoder.is_idle()
    }

    /// True once any byte of the current response reached the channel.
    pub fn has_flushed(&self) -> bool {
        self.flushed
    }

    #[inline]
    pub fn write<D>(&mut self, item: Message<(ResponseHead, PayloadSize), D>) -> Result<(), SendError>
    where
        D: Buf,
    {
        if matches!(item, Message::Header(_)) {
            self.flushed = false;
        }
        self.encoder.encode(item, &mut self.buffer)
    }

    #[inline]
    pub async fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let bytes = self.buffer.split();
        self.channel.write(&bytes).await?;
        self.flushed = true;
        Ok(())
    }
}

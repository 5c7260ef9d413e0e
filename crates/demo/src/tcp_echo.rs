//! Plain TCP line echo over the backpressured channel.

use ebb_http::buffer::GrowableBuffer;
use ebb_http::connection::{Channel, DEFAULT_READ_SIZE};
use ebb_http::protocol::ChannelError;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::info;

const QUIT: &[u8] = b"quit";

/// Echoes every `\n` or `\r\n` terminated line back, terminator included.
///
/// Returns when the peer closes its side or sends `quit`.
pub async fn serve_lines<R, W>(reader: R, writer: W) -> Result<(), ChannelError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (mut reader, mut writer) = Channel::new(reader, writer).into_split();
    let mut buffer = GrowableBuffer::with_capacity(DEFAULT_READ_SIZE);

    loop {
        while let Some(pos) = buffer.find(b"\n") {
            let line = buffer.split_front(pos + 1);
            let text = line.strip_suffix(b"\n").unwrap_or(&line[..]);
            let text = text.strip_suffix(b"\r").unwrap_or(text);

            if text == QUIT {
                info!("client sent quit, closing");
                writer.shutdown().await?;
                reader.close();
                return Ok(());
            }
            writer.write(&line).await?;
        }

        let bytes = reader.read().await?;
        if bytes.is_empty() {
            info!(pending = buffer.len(), "client closed the stream");
            return Ok(());
        }
        buffer.append(&bytes);
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    use super::*;

    #[tokio::test]
    async fn echoes_lines_until_quit() {
        let (client, server) = duplex(1024);
        let (server_read, server_write) = tokio::io::split(server);
        let task = tokio::spawn(serve_lines(server_read, server_write));

        let (mut client_read, mut client_write) = tokio::io::split(client);
        client_write.write_all(b"hello\r\nwor").await.unwrap();
        client_write.write_all(b"ld\nquit\nignored\n").await.unwrap();

        let mut output = Vec::new();
        client_read.read_to_end(&mut output).await.unwrap();
        assert_eq!(&output[..], b"hello\r\nworld\n");
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn partial_line_is_dropped_at_end_of_stream() {
        let (client, server) = duplex(1024);
        let (server_read, server_write) = tokio::io::split(server);
        let task = tokio::spawn(serve_lines(server_read, server_write));

        let (mut client_read, mut client_write) = tokio::io::split(client);
        client_write.write_all(b"one\ntwo").await.unwrap();
        client_write.shutdown().await.unwrap();

        let mut line = [0u8; 4];
        client_read.read_exact(&mut line).await.unwrap();
        assert_eq!(&line, b"one\n");
        assert!(task.await.unwrap().is_ok());
    }
}

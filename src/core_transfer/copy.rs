use crate::core_transfer::ascii::{CrlfToLf, LfToCrlf};
use crate::core_transfer::TransferMode;
use log::trace;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

/// Bounds one data socket operation. Expiry is a `TimedOut` I/O error.
async fn bounded<T>(
    limit: Duration,
    what: &str,
    operation: impl Future<Output = io::Result<T>>,
) -> io::Result<T> {
    match timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("data channel {} timed out after {:?}", what, limit),
        )),
    }
}

/// Copies a local source onto the data socket. Returns the number of local
/// bytes consumed. The socket is shut down once the source is drained so
/// the server sees EOF. Every socket write must finish within `data_timeout`.
pub async fn send_stream<R, W>(
    source: &mut R,
    socket: &mut W,
    mode: TransferMode,
    buffer_size: usize,
    data_timeout: Duration,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0; buffer_size.max(1)];
    let mut converted = Vec::new();
    let mut encoder = LfToCrlf::new();
    let mut total = 0u64;

    loop {
        let bytes_read = source.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        total += bytes_read as u64;
        match mode {
            TransferMode::Binary => {
                bounded(data_timeout, "write", socket.write_all(&buffer[..bytes_read])).await?
            }
            TransferMode::Text => {
                converted.clear();
                encoder.convert(&buffer[..bytes_read], &mut converted);
                bounded(data_timeout, "write", socket.write_all(&converted)).await?;
            }
        }
    }

    bounded(data_timeout, "flush", socket.flush()).await?;
    bounded(data_timeout, "shutdown", socket.shutdown()).await?;
    trace!("Sent {} bytes on the data channel", total);
    Ok(total)
}

/// Copies the data socket into a local sink until EOF. Returns the number of
/// bytes written locally. A read that sees nothing for `data_timeout` fails.
pub async fn receive_stream<R, W>(
    socket: &mut R,
    sink: &mut W,
    mode: TransferMode,
    buffer_size: usize,
    data_timeout: Duration,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0; buffer_size.max(1)];
    let mut converted = Vec::new();
    let mut decoder = CrlfToLf::new();
    let mut total = 0u64;

    loop {
        let bytes_read = bounded(data_timeout, "read", socket.read(&mut buffer)).await?;
        if bytes_read == 0 {
            break;
        }
        match mode {
            TransferMode::Binary => {
                sink.write_all(&buffer[..bytes_read]).await?;
                total += bytes_read as u64;
            }
            TransferMode::Text => {
                converted.clear();
                decoder.convert(&buffer[..bytes_read], &mut converted);
                sink.write_all(&converted).await?;
                total += converted.len() as u64;
            }
        }
    }

    if mode == TransferMode::Text {
        converted.clear();
        decoder.finish(&mut converted);
        sink.write_all(&converted).await?;
        total += converted.len() as u64;
    }

    sink.flush().await?;
    trace!("Received {} bytes on the data channel", total);
    Ok(total)
}

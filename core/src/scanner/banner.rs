use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// Banners are clipped to this many bytes.
pub const MAX_BANNER_LEN: usize = 256;

const GREETING_WINDOW: Duration = Duration::from_millis(300);
const READ_LIMIT: u64 = 1024;
const SSH_PORT: u16 = 22;
const HTTP_PORTS: [u16; 3] = [80, 443, 8080];
const HTTP_REQUEST: &[u8] = b"GET / HTTP/1.0\r\n\r\n";

/// Grabs the first line a service answers with.
///
/// Services that greet first (SSH, SMTP, FTP) are read directly. HTTP ports get
/// a minimal request when they stay silent. Any failure yields `None`.
pub async fn grab_banner(address: IpAddr, port: u16, banner_timeout: Duration) -> Option<String> {
    let greeting_window = if port == SSH_PORT {
        banner_timeout
    } else {
        banner_timeout.min(GREETING_WINDOW)
    };
    let banner = grab(
        address,
        port,
        banner_timeout,
        greeting_window,
        HTTP_PORTS.contains(&port),
    )
    .await;

    if let Some(line) = &banner {
        debug!("{}:{} banner: {}", address, port, line);
    }
    banner
}

async fn grab(
    address: IpAddr,
    port: u16,
    banner_timeout: Duration,
    greeting_window: Duration,
    speaks_http: bool,
) -> Option<String> {
    let socket_addr: SocketAddr = SocketAddr::new(address, port);
    let stream: TcpStream = timeout(banner_timeout, TcpStream::connect(socket_addr))
        .await
        .ok()?
        .ok()?;
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut raw: Vec<u8> = Vec::new();

    match read_line_into(&mut reader, &mut raw, greeting_window).await? {
        LineRead::Complete => return clean_line(&raw),
        LineRead::Closed => return None,
        // The greeting arrived split across segments; wait for the rest of it.
        LineRead::TimedOut if !raw.is_empty() => {
            read_line_into(&mut reader, &mut raw, banner_timeout).await?;
            return clean_line(&raw);
        }
        LineRead::TimedOut => {}
    }

    if !speaks_http {
        return None;
    }

    write_half.write_all(HTTP_REQUEST).await.ok()?;
    match read_line_into(&mut reader, &mut raw, banner_timeout).await? {
        LineRead::Closed => None,
        LineRead::Complete | LineRead::TimedOut => clean_line(&raw),
    }
}

enum LineRead {
    Complete,
    TimedOut,
    Closed,
}

/// Appends to `raw` up to a newline. Bytes read before the window closes stay
/// in `raw`. `None` on I/O errors.
async fn read_line_into<R>(reader: &mut R, raw: &mut Vec<u8>, window: Duration) -> Option<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    let budget: u64 = READ_LIMIT.saturating_sub(raw.len() as u64);
    let mut limited = reader.take(budget);
    match timeout(window, limited.read_until(b'\n', raw)).await {
        Err(_) => Some(LineRead::TimedOut),
        Ok(Err(_)) => None,
        Ok(Ok(0)) => Some(LineRead::Closed),
        Ok(Ok(_)) => Some(LineRead::Complete),
    }
}

fn clean_line(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let line: &str = text.trim();
    if line.is_empty() {
        return None;
    }

    let mut end: usize = line.len().min(MAX_BANNER_LEN);
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    Some(line[..end].to_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

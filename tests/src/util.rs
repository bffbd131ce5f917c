#![cfg(test)]
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

pub fn write_files(dir: &Path, files: &[(&str, usize)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, len)| {
            let path = dir.join(name);
            fs::write(&path, vec![0xC3u8; *len]).unwrap();
            path
        })
        .collect()
}

/// Listens on 127.0.0.1 and greets every connection with `greeting`.
pub async fn greeting_listener(greeting: &'static str) -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let _ = socket.write_all(greeting.as_bytes()).await;
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            });
        }
    });
    port
}

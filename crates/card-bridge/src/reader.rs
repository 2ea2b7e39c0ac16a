//! Card sources
//!
//! A keyboard-wedge or serial reader exposed by the OS delivers one UID per
//! line. The line reader runs on its own task so polling never blocks.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info};

use attendance_shared::utils::normalize_card_id;

use crate::error::BridgeError;

#[async_trait]
pub trait CardSource: Send {
    /// The next pending card, or `None` when no card is present.
    async fn poll(&mut self) -> Result<Option<String>, BridgeError>;
}

pub struct LineCardSource {
    rx: mpsc::Receiver<Result<String, String>>,
}

impl LineCardSource {
    pub fn spawn<R>(input: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut lines = BufReader::new(input).lines();
            loop {
                let item = match lines.next_line().await {
                    Ok(Some(line)) => match normalize_card_id(&line) {
                        Some(card_id) => Ok(card_id),
                        None => continue,
                    },
                    Ok(None) => break,
                    Err(e) => Err(e.to_string()),
                };
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
            debug!("Card reader input finished");
        });
        Self { rx }
    }

    /// The device at `path`, or standard input.
    pub async fn open(path: Option<&str>) -> Result<Self, BridgeError> {
        match path {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .map_err(|e| BridgeError::Reader(format!("{}: {}", path, e)))?;
                info!("Reading cards from {}", path);
                Ok(Self::spawn(file))
            }
            None => {
                info!("Reading cards from standard input");
                Ok(Self::spawn(tokio::io::stdin()))
            }
        }
    }
}

#[async_trait]
impl CardSource for LineCardSource {
    async fn poll(&mut self) -> Result<Option<String>, BridgeError> {
        match self.rx.try_recv() {
            Ok(Ok(card_id)) => Ok(Some(card_id)),
            Ok(Err(e)) => Err(BridgeError::Reader(e)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(BridgeError::ReaderClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn next(source: &mut LineCardSource) -> Result<Option<String>, BridgeError> {
        for _ in 0..50 {
            match source.poll().await {
                Ok(None) => tokio::time::sleep(Duration::from_millis(10)).await,
                other => return other,
            }
        }
        Ok(None)
    }

    #[tokio::test]
    async fn test_lines_are_normalized() {
        let input: &'static [u8] = b"04a1b2\r\n\r\n\0deadbeef\0\n";
        let mut source = LineCardSource::spawn(input);

        assert_eq!(next(&mut source).await.unwrap().as_deref(), Some("04A1B2"));
        assert_eq!(next(&mut source).await.unwrap().as_deref(), Some("DEADBEEF"));
        assert!(matches!(next(&mut source).await, Err(BridgeError::ReaderClosed)));
    }
}

//! Host serial link
//!
//! Reads command frames byte by byte and writes query replies. Bad
//! frames are logged and dropped without a reply; the host resends.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use triaxis_core::command::{CommandHandler, Dispatch, DispatchError};
use triaxis_hal_rp2040::{RpOutput, StepTimer};

use crate::channels::StepLock;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

pub type Handler = CommandHandler<'static, StepLock, &'static StepTimer, RpOutput<'static>>;

#[embassy_executor::task]
pub async fn serial_task(mut rx: BufferedUartRx, mut tx: BufferedUartTx, mut handler: Handler) {
    info!("Serial task started");

    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        let n = match rx.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                continue;
            }
        };

        for &byte in &buf[..n] {
            match handler.feed(byte) {
                Ok(None) => {}
                Ok(Some(Dispatch::Applied(command))) => {
                    debug!("Applied {:?}", command);
                }
                Ok(Some(Dispatch::Reply(frame))) => {
                    let bytes = frame.encode();
                    trace!("Reply {:x}", bytes);
                    if let Err(e) = tx.write_all(&bytes).await {
                        warn!("UART write error: {:?}", e);
                    }
                }
                Err(DispatchError::Frame(e)) => warn!("Dropped frame: {:?}", e),
                Err(e) => warn!("Ignored command: {:?}", e),
            }
        }
    }
}

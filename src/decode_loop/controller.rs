use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::{
    DecodeEngine, DecodeOptions, DecodeSink, DeviceSelector, EngineError, EngineFactory,
    EngineScope,
};
use crate::session::SessionShared;

use super::loop_worker::decode_loop;

/// Owns the live engine instance and the task draining its signals. At most
/// one loop runs at a time.
pub struct DecodeLoopController {
    factory: Arc<dyn EngineFactory>,
    engine: Option<Arc<dyn DecodeEngine>>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    device_id: Option<String>,
}

impl DecodeLoopController {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            engine: None,
            handle: None,
            cancel_token: None,
            device_id: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    fn live_engine(&mut self) -> Result<Arc<dyn DecodeEngine>, EngineError> {
        if let Some(engine) = &self.engine {
            return Ok(engine.clone());
        }
        let engine = self.factory.create(EngineScope::Live)?;
        self.engine = Some(engine.clone());
        Ok(engine)
    }

    pub(crate) async fn start_loop(
        &mut self,
        device_id: &str,
        options: &DecodeOptions,
        shared: Arc<SessionShared>,
        generation: u64,
    ) -> Result<(), EngineError> {
        if self.handle.is_some() {
            return Err(EngineError::Other("decode loop already active".into()));
        }

        let engine = self.live_engine()?;
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        engine
            .start(
                DeviceSelector::for_device(device_id),
                options,
                DecodeSink::new(signal_tx),
            )
            .await?;

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(decode_loop(
            signal_rx,
            shared,
            generation,
            device_id.to_owned(),
            cancel_token.clone(),
        ));

        info!(
            "Decode loop started on {} at {} fps",
            device_id, options.target_frame_rate
        );

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.device_id = Some(device_id.to_owned());
        Ok(())
    }

    /// Cancel the loop task, stop the engine and wait for the task to exit.
    /// A no-op when nothing is running.
    pub async fn stop_loop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let device_id = self.device_id.take().unwrap_or_default();

        let engine_result = match &self.engine {
            Some(engine) => engine
                .stop()
                .await
                .map_err(|err| anyhow!("engine failed to stop on {device_id}: {err}")),
            None => Ok(()),
        };

        handle
            .await
            .context("decode loop task failed to join")?;

        info!("Decode loop on {} stopped", device_id);
        engine_result
    }

    /// Stop the loop and drop the live engine. The next start builds a fresh
    /// instance.
    pub async fn release(&mut self) -> Result<()> {
        let stopped = self.stop_loop().await;
        if let Some(engine) = self.engine.take() {
            engine.clear();
        }
        if let Err(err) = &stopped {
            bail!("decode loop release incomplete: {err:#}");
        }
        Ok(())
    }
}

impl Drop for DecodeLoopController {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.handle.take() {
            warn!("Decode loop controller dropped while running; aborting loop task");
            handle.abort();
        }
        if let Some(engine) = self.engine.take() {
            engine.clear();
        }
    }
}

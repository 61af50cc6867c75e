use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;

use ccpatch_core::{
    CcPatchError, Engine, EngineConfig, PatchDirectory, PatchFileError, Runtime, Settings,
};

use crate::ports::MidiPorts;
use crate::surface::BeatStep;

/// A connected BeatStep driving a patch engine.
pub struct BeatStepModule {
    runtime: Runtime<BeatStep, MidiPorts>,
    midi_rx: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl BeatStepModule {
    /// Connect the ports, bind the function pads and ask the controller for
    /// its channel. Missing ports are logged, not returned.
    pub fn initialize(settings: &Settings) -> Result<Self, CcPatchError> {
        let surface = BeatStep::new()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let ports = MidiPorts::connect(settings, tx)?;

        let mut runtime = Runtime::new(
            Engine::new(surface, EngineConfig::from(settings)),
            ports,
            PatchDirectory::new(settings.patch_directory.clone()),
            Duration::from_millis(settings.led_refresh_delay_ms),
        );
        runtime.startup();
        log::info!(
            "BeatStep ready (controller: {}, instrument: {}, unlock: {:?}, channel boundary: {:?})",
            runtime.transport().has_controller(),
            runtime.transport().has_instrument(),
            settings.unlock_policy,
            settings.channel_boundary
        );

        Ok(Self {
            runtime,
            midi_rx: Some(rx),
        })
    }

    pub fn load_patch(&mut self, path: &Path) -> Result<(), PatchFileError> {
        self.runtime.load_patch_file(path)
    }

    /// Handle controller input until the input port closes. Returns at once
    /// if called a second time.
    pub async fn run(&mut self) {
        let Some(rx) = self.midi_rx.take() else {
            log::warn!("BeatStep module already ran");
            return;
        };
        self.runtime.run(rx).await;
    }

    pub fn shutdown(&mut self) {
        log::info!("Shutting down BeatStep module");
        self.runtime.shutdown();
    }
}

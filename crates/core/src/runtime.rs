//! Drives an [`Engine`] from a queue of raw MIDI messages.

use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::calibration::CalibrationState;
use crate::channel::Channel;
use crate::engine::Engine;
use crate::error::{CcPatchError, PatchFileError};
use crate::layout::Control;
use crate::messages::{MidiMessage, Outgoing};
use crate::patch::PatchDirectory;
use crate::surface::ControlSurface;

/// Where outgoing messages go.
pub trait Transport {
    fn send_sysex(&mut self, bytes: &[u8]) -> Result<(), CcPatchError>;

    fn send_control_change(
        &mut self,
        channel: Channel,
        control: Control,
        value: u8,
    ) -> Result<(), CcPatchError>;
}

pub struct Runtime<S, T> {
    engine: Engine<S>,
    transport: T,
    patches: PatchDirectory,
    led_refresh_delay: Duration,
}

impl<S: ControlSurface, T: Transport> Runtime<S, T> {
    pub fn new(
        engine: Engine<S>,
        transport: T,
        patches: PatchDirectory,
        led_refresh_delay: Duration,
    ) -> Self {
        Self {
            engine,
            transport,
            patches,
            led_refresh_delay,
        }
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Carry out engine side effects. Failures are logged and skipped.
    pub fn apply(&mut self, outgoing: Vec<Outgoing>) {
        for message in outgoing {
            let result = match &message {
                Outgoing::ControllerSysex(bytes) => self.transport.send_sysex(bytes),
                Outgoing::InstrumentControlChange {
                    channel,
                    control,
                    value,
                } => self
                    .transport
                    .send_control_change(*channel, *control, *value),
                Outgoing::SavePatch(patch) => match self.patches.save(patch) {
                    Ok(path) => {
                        log::info!("Saved patch file {}", path.display());
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                },
            };
            if let Err(e) = result {
                log::error!("{}", e);
            }
        }
    }

    pub fn startup(&mut self) {
        let out = self.engine.startup();
        self.apply(out);
    }

    /// Parse and handle one raw message. Anything other than a control
    /// change or sysex is dropped.
    pub fn handle_raw(&mut self, bytes: &[u8]) {
        match MidiMessage::parse(bytes) {
            Ok(message) => {
                let out = self.engine.handle(&message);
                self.apply(out);
            }
            Err(e) => log::trace!("Dropping message: {}", e),
        }
    }

    /// Load a patch file and lock the active channel against it. On error the
    /// current patch is left untouched.
    pub fn load_patch_file(&mut self, path: &Path) -> Result<(), PatchFileError> {
        log::info!("Loading patch file {}", path.display());
        let patch = self.patches.load(path)?;
        let out = self.engine.load_patch(patch);
        self.apply(out);
        Ok(())
    }

    pub fn refresh_leds(&mut self) {
        let out = self.engine.refresh_leds();
        self.apply(out);
    }

    pub fn shutdown(&mut self) {
        log::info!("Restoring controller state");
        let out = self.engine.shutdown();
        self.apply(out);
    }

    /// Handle messages until every sender is dropped. Pad LEDs are repainted
    /// once the queue has been quiet for the refresh delay.
    pub async fn run(&mut self, mut rx: mpsc::UnboundedReceiver<Vec<u8>>) {
        log::info!("ccpatch running");
        let mut refresh_at: Option<Instant> = None;

        loop {
            tokio::select! {
                received = rx.recv() => {
                    let Some(bytes) = received else {
                        break;
                    };
                    let before = self.engine.state();
                    self.handle_raw(&bytes);
                    if before != self.engine.state() {
                        log::debug!(
                            "Channel {} now {}",
                            self.engine.active_channel(),
                            match self.engine.state() {
                                CalibrationState::Locked => "locked",
                                CalibrationState::Unlocked => "unlocked",
                            }
                        );
                    }
                    refresh_at = Some(Instant::now() + self.led_refresh_delay);
                }

                _ = async move {
                    match refresh_at {
                        Some(deadline) => sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                } => {
                    refresh_at = None;
                    self.refresh_leds();
                }
            }
        }

        self.refresh_leds();
        log::info!("Input closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::messages::control_change_bytes;
    use crate::test_support::TestSurface;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        sysex: Vec<Vec<u8>>,
        control_changes: Vec<(Channel, Control, u8)>,
        fail: bool,
    }

    impl Transport for Recorder {
        fn send_sysex(&mut self, bytes: &[u8]) -> Result<(), CcPatchError> {
            if self.fail {
                return Err(CcPatchError::TransportUnavailable("unplugged".to_string()));
            }
            self.sysex.push(bytes.to_vec());
            Ok(())
        }

        fn send_control_change(
            &mut self,
            channel: Channel,
            control: Control,
            value: u8,
        ) -> Result<(), CcPatchError> {
            self.control_changes.push((channel, control, value));
            Ok(())
        }
    }

    fn runtime(dir: &TempDir) -> Runtime<TestSurface, Recorder> {
        Runtime::new(
            Engine::new(TestSurface::new(), EngineConfig::default()),
            Recorder::default(),
            PatchDirectory::new(dir.path()),
            Duration::from_millis(5),
        )
    }

    fn ch(n: u8) -> Channel {
        Channel::new(n).unwrap()
    }

    #[test]
    fn test_save_trigger_writes_patch_file() {
        let dir = TempDir::new().unwrap();
        let mut runtime = runtime(&dir);

        runtime.handle_raw(&control_change_bytes(ch(0), 20, 99));
        runtime.handle_raw(&crate::messages::MMC_STOP);

        let saved: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn test_unknown_messages_are_dropped() {
        let dir = TempDir::new().unwrap();
        let mut runtime = runtime(&dir);

        runtime.handle_raw(&[0x90, 60, 100]);
        runtime.handle_raw(&[]);
        assert!(runtime.engine().patch().is_empty());
        assert!(runtime.transport().sysex.is_empty());
    }

    #[test]
    fn test_transport_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let mut runtime = runtime(&dir);
        runtime.transport.fail = true;

        runtime.startup();
        runtime.handle_raw(&control_change_bytes(ch(0), 20, 5));
        assert_eq!(runtime.engine().patch().get(ch(0), 20), 5);
    }

    #[test]
    fn test_load_missing_file_keeps_patch() {
        let dir = TempDir::new().unwrap();
        let mut runtime = runtime(&dir);
        runtime.handle_raw(&control_change_bytes(ch(0), 20, 5));

        let err = runtime
            .load_patch_file(&dir.path().join("missing.json"))
            .unwrap_err();
        assert!(matches!(err, PatchFileError::NotFound(_)));
        assert_eq!(runtime.engine().patch().get(ch(0), 20), 5);
    }

    #[test]
    fn test_load_broadcasts_active_channel() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("patch.json");
        std::fs::write(&path, r#"{"0": {"20": 12, "21": 34}}"#).unwrap();

        let mut runtime = runtime(&dir);
        runtime.load_patch_file(&path).unwrap();

        assert_eq!(
            runtime.transport().control_changes,
            vec![(ch(0), 20, 12), (ch(0), 21, 34)]
        );
        assert_eq!(runtime.engine().state(), CalibrationState::Locked);
    }

    #[tokio::test]
    async fn test_run_repaints_leds_after_input_closes() {
        let dir = TempDir::new().unwrap();
        let mut runtime = Runtime::new(
            Engine::new(TestSurface::new(), EngineConfig::default()),
            Recorder::default(),
            PatchDirectory::new(dir.path()),
            Duration::from_secs(60),
        );
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(control_change_bytes(ch(0), 20, 64).to_vec()).unwrap();
        tx.send(control_change_bytes(ch(0), 21, 1).to_vec()).unwrap();
        drop(tx);

        runtime.run(rx).await;

        assert_eq!(runtime.engine().patch().len(), 2);
        let pad_updates = runtime
            .transport()
            .sysex
            .iter()
            .filter(|bytes| bytes.first() == Some(&0x10))
            .count();
        assert_eq!(pad_updates, runtime.engine().surface().layout().len());
    }
}

//! MIDI port discovery and connections.

use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::sync::mpsc;

use ccpatch_core::{control_change_bytes, CcPatchError, Channel, Control, Settings, Transport};

const CLIENT_NAME: &str = "ccpatch";

type InputConnection = MidiInputConnection<mpsc::UnboundedSender<Vec<u8>>>;

/// First port whose name contains `pattern`.
pub fn find_port<T: MidiIO>(io: &T, pattern: &str) -> Option<T::Port> {
    io.ports().into_iter().find(|port| {
        io.port_name(port)
            .map(|name| name.contains(pattern))
            .unwrap_or(false)
    })
}

/// Names of every MIDI input and output port, for diagnostics.
pub fn list_ports() -> Result<(Vec<String>, Vec<String>), CcPatchError> {
    let midi_in = MidiInput::new(CLIENT_NAME).map_err(unavailable)?;
    let midi_out = MidiOutput::new(CLIENT_NAME).map_err(unavailable)?;

    let inputs = midi_in
        .ports()
        .iter()
        .filter_map(|port| midi_in.port_name(port).ok())
        .collect();
    let outputs = midi_out
        .ports()
        .iter()
        .filter_map(|port| midi_out.port_name(port).ok())
        .collect();
    Ok((inputs, outputs))
}

fn unavailable(e: impl std::fmt::Display) -> CcPatchError {
    CcPatchError::TransportUnavailable(e.to_string())
}

/// Open connections to the controller and the instrument. A side whose port
/// was not found stays inactive and sends to it are dropped.
pub struct MidiPorts {
    input: Option<InputConnection>,
    controller: Option<MidiOutputConnection>,
    instrument: Option<MidiOutputConnection>,
}

impl MidiPorts {
    /// Connect to the ports named in `settings`. Raw inbound messages from
    /// the controller are forwarded to `tx`; when no controller input is
    /// found `tx` is dropped, which ends the message loop.
    ///
    /// Only a MIDI backend that cannot start at all is an error. Missing
    /// ports are logged.
    pub fn connect(
        settings: &Settings,
        tx: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Result<Self, CcPatchError> {
        let input = Self::connect_input(&settings.controller_device, tx)?;
        if input.is_none() {
            log::error!(
                "{}",
                CcPatchError::NoMatchingPort(settings.controller_device.clone())
            );
        }

        let controller = Self::connect_output(&settings.controller_device, "ccpatch-controller-out")?;
        if controller.is_none() {
            log::error!(
                "{} - controller feedback disabled",
                CcPatchError::NoMatchingPort(settings.controller_device.clone())
            );
        }

        let instrument = Self::connect_output(&settings.instrument_device, "ccpatch-instrument-out")?;
        if instrument.is_none() {
            log::warn!(
                "{} - patch broadcasts disabled",
                CcPatchError::NoMatchingPort(settings.instrument_device.clone())
            );
        }

        Ok(Self {
            input,
            controller,
            instrument,
        })
    }

    fn connect_input(
        pattern: &str,
        tx: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Result<Option<InputConnection>, CcPatchError> {
        let mut midi_in = MidiInput::new(CLIENT_NAME).map_err(unavailable)?;
        // Channel reports and the stop button arrive as sysex.
        midi_in.ignore(Ignore::None);

        let Some(port) = find_port(&midi_in, pattern) else {
            return Ok(None);
        };
        let name = midi_in.port_name(&port).map_err(unavailable)?;
        let connection = midi_in
            .connect(
                &port,
                "ccpatch-controller-in",
                move |_timestamp, message, tx| {
                    let _ = tx.send(message.to_vec());
                },
                tx,
            )
            .map_err(unavailable)?;
        log::info!("Listening to {}", name);
        Ok(Some(connection))
    }

    fn connect_output(
        pattern: &str,
        connection_name: &str,
    ) -> Result<Option<MidiOutputConnection>, CcPatchError> {
        let midi_out = MidiOutput::new(CLIENT_NAME).map_err(unavailable)?;
        let Some(port) = find_port(&midi_out, pattern) else {
            return Ok(None);
        };
        let name = midi_out.port_name(&port).map_err(unavailable)?;
        let connection = midi_out
            .connect(&port, connection_name)
            .map_err(unavailable)?;
        log::info!("Sending to {}", name);
        Ok(Some(connection))
    }

    pub fn has_controller(&self) -> bool {
        self.input.is_some() && self.controller.is_some()
    }

    pub fn has_instrument(&self) -> bool {
        self.instrument.is_some()
    }
}

impl Transport for MidiPorts {
    fn send_sysex(&mut self, bytes: &[u8]) -> Result<(), CcPatchError> {
        log::trace!("-> controller {:02X?}", bytes);
        match self.controller.as_mut() {
            Some(controller) => controller.send(bytes).map_err(unavailable),
            None => Ok(()),
        }
    }

    fn send_control_change(
        &mut self,
        channel: Channel,
        control: Control,
        value: u8,
    ) -> Result<(), CcPatchError> {
        match self.instrument.as_mut() {
            Some(instrument) => instrument
                .send(&control_change_bytes(channel, control, value))
                .map_err(unavailable),
            None => Ok(()),
        }
    }
}

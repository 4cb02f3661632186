use std::fmt;

use midir::{MidiOutput, MidiOutputConnection};

/// Outbound MIDI message, channel-less. The transport adds the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { key: u8, velocity: u8 },
    NoteOff { key: u8, velocity: u8 },
    ControlChange { controller: u8, value: u8 },
    /// Named on/off pair; the `_on` / `_off` suffix of `name` picks which.
    Toggle { name: String, key: u8, velocity: u8 },
}

impl MidiEvent {
    pub fn toggle(affordance: &str, on: bool, key: u8, velocity: u8) -> Self {
        let suffix = if on { "on" } else { "off" };
        MidiEvent::Toggle {
            name: format!("{affordance}_{suffix}"),
            key,
            velocity,
        }
    }

    /// Raw 3-byte message on `channel` (0-15).
    pub fn to_bytes(&self, channel: u8) -> [u8; 3] {
        let ch = channel & 0x0F;
        match self {
            MidiEvent::NoteOn { key, velocity } => [0x90 | ch, key & 0x7F, velocity & 0x7F],
            MidiEvent::NoteOff { key, velocity } => [0x80 | ch, key & 0x7F, velocity & 0x7F],
            MidiEvent::ControlChange { controller, value } => {
                [0xB0 | ch, controller & 0x7F, value & 0x7F]
            }
            MidiEvent::Toggle {
                name,
                key,
                velocity,
            } => {
                if name.ends_with("_off") {
                    [0x80 | ch, key & 0x7F, 0]
                } else {
                    [0x90 | ch, key & 0x7F, velocity & 0x7F]
                }
            }
        }
    }
}

impl fmt::Display for MidiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiEvent::NoteOn { key, velocity } => write!(f, "NoteOn  key={key} vel={velocity}"),
            MidiEvent::NoteOff { key, velocity } => write!(f, "NoteOff key={key} vel={velocity}"),
            MidiEvent::ControlChange { controller, value } => write!(f, "CC      {controller}={value}"),
            MidiEvent::Toggle { name, key, .. } => write!(f, "{name} key={key}"),
        }
    }
}

/// Somewhere MIDI events can be sent.
pub trait MidiTransport {
    fn send(&mut self, event: &MidiEvent) -> anyhow::Result<()>;
}

/// MIDI output port. Starts closed; sends while closed are dropped.
pub struct MidiOut {
    channel: u8,
    connection: Option<MidiOutputConnection>,
    port_name: Option<String>,
}

impl MidiOut {
    pub fn new(channel: u8) -> Self {
        MidiOut {
            channel,
            connection: None,
            port_name: None,
        }
    }

    /// Connect to the first output port whose name contains `filter`.
    pub fn open(&mut self, filter: &str) -> anyhow::Result<()> {
        self.close();

        let midi_out = MidiOutput::new("freakctl")?;
        let ports = midi_out.ports();
        let port = ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .map(|n| n.contains(filter))
                    .unwrap_or(false)
            })
            .ok_or_else(|| anyhow::anyhow!("MIDI output not found: {filter}"))?;
        let name = midi_out.port_name(port)?;

        let conn = midi_out
            .connect(port, "freakctl-out")
            .map_err(|e| anyhow::anyhow!("Failed to open MIDI output {name}: {e}"))?;
        log::info!("Opened MIDI output: {name} (channel {})", self.channel + 1);
        self.connection = Some(conn);
        self.port_name = Some(name);
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            if let Some(name) = self.port_name.take() {
                log::info!("Closed MIDI output: {name}");
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }
}

impl MidiTransport for MidiOut {
    fn send(&mut self, event: &MidiEvent) -> anyhow::Result<()> {
        let Some(conn) = self.connection.as_mut() else {
            log::debug!("MIDI out closed, dropping {event}");
            return Ok(());
        };
        let bytes = event.to_bytes(self.channel);
        log::info!("MIDI out {event} data={bytes:02x?}");
        conn.send(&bytes)?;
        Ok(())
    }
}

impl Drop for MidiOut {
    fn drop(&mut self) {
        self.close();
    }
}

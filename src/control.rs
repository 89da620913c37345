//! External control input over OSC.
//!
//! Parameters are remote-controllable with messages of the shape
//! `/<paramName>/x <float>` where the float is normalized to `[0, 1]` and
//! remapped into the parameter's configured range. The transport is a
//! non-blocking UDP socket; all waiting messages are drained at the start of
//! each tick, before physics runs, so a tick always sees one consistent
//! parameter snapshot.
//!
//! Malformed packets and unknown addresses are ignored. A flood of messages
//! is processed in full before the next physics step; that is an accepted
//! simplification for a live-performance tool.

use std::io;
use std::net::UdpSocket;

use rosc::{OscPacket, OscType};
use tracing::{debug, info, warn};

use crate::params::{ParamKey, Params};

/// Fixed UDP port the visualizer listens on.
pub const OSC_PORT: u16 = 7000;

/// Non-blocking OSC receiver bound to [`OSC_PORT`].
pub struct ControlInput {
    socket: Option<UdpSocket>,
    buf: Vec<u8>,
}

impl ControlInput {
    /// Bind the control socket. A failed bind (port in use, no network)
    /// degrades to a receiver that never yields messages.
    pub fn new(port: u16) -> Self {
        let socket = match bind_nonblocking(port) {
            Ok(s) => {
                info!(port, "control input listening");
                Some(s)
            }
            Err(e) => {
                warn!(port, error = %e, "control input disabled");
                None
            }
        };
        Self {
            socket,
            buf: vec![0; rosc::decoder::MTU],
        }
    }

    /// Drain every waiting message into the parameter store.
    ///
    /// Called once per tick before physics; parameter changes therefore take
    /// effect atomically per tick, never mid-update.
    pub fn drain(&mut self, params: &mut Params) {
        let Some(socket) = &self.socket else {
            return;
        };
        loop {
            match socket.recv_from(&mut self.buf) {
                Ok((len, _)) => match rosc::decoder::decode_udp(&self.buf[..len]) {
                    Ok((_, packet)) => apply_packet(params, packet),
                    Err(e) => debug!(error = %e, "ignoring undecodable packet"),
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    debug!(error = %e, "control socket receive failed");
                    break;
                }
            }
        }
    }
}

fn bind_nonblocking(port: u16) -> io::Result<UdpSocket> {
    let socket = UdpSocket::bind(("0.0.0.0", port))?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

fn apply_packet(params: &mut Params, packet: OscPacket) {
    match packet {
        OscPacket::Message(msg) => {
            let value = msg.args.iter().find_map(|arg| match arg {
                OscType::Float(f) => Some(*f),
                OscType::Double(d) => Some(*d as f32),
                _ => None,
            });
            match value {
                Some(v) => route(params, &msg.addr, v),
                None => debug!(addr = %msg.addr, "ignoring message without float argument"),
            }
        }
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                apply_packet(params, inner);
            }
        }
    }
}

/// Apply one `address = normalized value` pair to the parameter store.
///
/// Addresses must match `/<paramName>/x`; anything else is ignored.
pub fn route(params: &mut Params, address: &str, normalized: f32) {
    let name = address
        .strip_prefix('/')
        .and_then(|rest| rest.strip_suffix("/x"));
    let Some(name) = name else {
        debug!(address, "ignoring malformed control address");
        return;
    };
    match ParamKey::from_name(name) {
        Some(key) => params.set_normalized(key, normalized),
        None => debug!(address, "ignoring unknown control address"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_remaps_into_range() {
        let mut params = Params::default();
        route(&mut params, "/force/x", 0.5);
        assert_eq!(params.force, 0.0);
        route(&mut params, "/force/x", 1.0);
        assert_eq!(params.force, 1000.0);
        route(&mut params, "/bornRate/x", 0.5);
        assert_eq!(params.born_rate, 350.0);
    }

    #[test]
    fn test_route_ignores_unknown_address() {
        let mut params = Params::default();
        let before = params.clone();
        route(&mut params, "/notAParam/x", 0.5);
        route(&mut params, "force", 0.5);
        route(&mut params, "/force", 0.5);
        assert_eq!(params, before);
    }

    #[test]
    fn test_apply_packet_handles_bundles() {
        use rosc::{OscBundle, OscMessage, OscTime};

        let mut params = Params::default();
        let packet = OscPacket::Bundle(OscBundle {
            timetag: OscTime { seconds: 0, fractional: 0 },
            content: vec![
                OscPacket::Message(OscMessage {
                    addr: "/friction/x".into(),
                    args: vec![OscType::Float(1.0)],
                }),
                OscPacket::Message(OscMessage {
                    addr: "/size/x".into(),
                    args: vec![OscType::Float(0.0)],
                }),
            ],
        });
        apply_packet(&mut params, packet);
        assert!((params.friction - 0.1).abs() < 1e-6);
        assert_eq!(params.size, 2.0);
    }

    #[test]
    fn test_message_without_float_is_ignored() {
        use rosc::OscMessage;

        let mut params = Params::default();
        let before = params.clone();
        apply_packet(
            &mut params,
            OscPacket::Message(OscMessage {
                addr: "/force/x".into(),
                args: vec![OscType::String("nope".into())],
            }),
        );
        assert_eq!(params, before);
    }
}

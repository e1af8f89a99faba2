//! [`HapticLink`] over a non-blocking byte stream

use super::protocol::{format_force_command, parse_position_line, MAX_LINE_LEN};
use super::rate_limit::ForceRateLimiter;
use super::{DeviceConfig, HapticLink};
use crate::core_types::{Meters, Newtons};
use std::io::{ErrorKind, Read, Write};
use std::time::Instant;
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 64;

/// Handle link speaking the `P`/`F` line protocol over `S`
///
/// The stream should be non-blocking or have a zero timeout: `WouldBlock`,
/// `TimedOut` and `Interrupted` just end the read phase of a sync. Any other
/// I/O error drops the stream and the link reports disconnected.
pub struct LineDevice<S: Read + Write> {
    stream: Option<S>,
    limiter: ForceRateLimiter,
    max_reads: usize,

    line: Vec<u8>,
    discarding: bool,

    position: Meters,
    fresh: bool,
}

impl<S: Read + Write> LineDevice<S> {
    /// Wrap a connected stream
    pub fn new(stream: S, config: &DeviceConfig) -> Self {
        info!("Haptic device connected ({})", config.port);
        Self {
            stream: Some(stream),
            limiter: ForceRateLimiter::new(config.force_threshold, config.resend_interval),
            max_reads: config.max_reads_per_sync.max(1),
            line: Vec::with_capacity(MAX_LINE_LEN),
            discarding: false,
            position: Meters::ZERO,
            fresh: false,
        }
    }

    /// Underlying stream while connected
    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    fn read_available(&mut self) {
        let mut buf = [0u8; READ_CHUNK];
        for _ in 0..self.max_reads {
            let Some(stream) = self.stream.as_mut() else {
                return;
            };
            match stream.read(&mut buf) {
                Ok(0) => return,
                Ok(n) => {
                    for &byte in &buf[..n] {
                        self.push_byte(byte);
                    }
                }
                Err(e) if is_transient(e.kind()) => return,
                Err(e) => {
                    self.drop_stream("read", &e);
                    return;
                }
            }
        }
    }

    fn push_byte(&mut self, byte: u8) {
        if byte == b'\n' {
            if !self.discarding {
                self.handle_line();
            }
            self.line.clear();
            self.discarding = false;
            return;
        }
        if self.discarding {
            return;
        }
        if self.line.len() >= MAX_LINE_LEN {
            warn!("Discarding oversized device line (> {} bytes)", MAX_LINE_LEN);
            self.line.clear();
            self.discarding = true;
            return;
        }
        self.line.push(byte);
    }

    fn handle_line(&mut self) {
        let Ok(text) = std::str::from_utf8(&self.line) else {
            return;
        };
        if let Some(position) = parse_position_line(text) {
            self.position = position;
            self.fresh = true;
        }
    }

    fn write_force(&mut self, force: Newtons, now: Instant) {
        if !self.limiter.should_send(force, now) {
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        let command = format_force_command(force);
        match stream.write_all(command.as_bytes()).and_then(|()| stream.flush()) {
            Ok(()) => self.limiter.record(force, now),
            Err(e) if is_transient(e.kind()) => {
                debug!("Force command deferred: {}", e);
            }
            Err(e) => self.drop_stream("write", &e),
        }
    }

    fn drop_stream(&mut self, op: &str, err: &std::io::Error) {
        warn!("Haptic device {} failed, disconnecting: {}", op, err);
        self.stream = None;
        self.fresh = false;
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
    )
}

impl<S: Read + Write> HapticLink for LineDevice<S> {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn position(&self) -> Meters {
        self.position
    }

    fn has_fresh_position(&self) -> bool {
        self.fresh
    }

    fn sync(&mut self, force: Newtons, now: Instant) {
        self.fresh = false;
        if self.stream.is_none() {
            return;
        }
        self.read_available();
        self.write_force(force, now);
    }

    fn disconnect(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        let command = format_force_command(Newtons::ZERO);
        if let Err(e) = stream.write_all(command.as_bytes()).and_then(|()| stream.flush()) {
            warn!("Could not send zero force on disconnect: {}", e);
        }
        self.limiter.reset();
        self.fresh = false;
        info!("Haptic device disconnected");
    }
}

impl<S: Read + Write> Drop for LineDevice<S> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

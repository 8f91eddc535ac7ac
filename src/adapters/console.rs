//! Serial console command ingress.
//!
//! A reader thread turns text lines into [`AppCommand`]s, queues them on
//! a bounded channel and wakes the control loop through a notify hook
//! (the firmware passes [`signal_command`](crate::events::signal_command),
//! which the loop turns into `Event::CommandReceived`).
//! The control loop drains the channel and hands each command to
//! `AppService::handle_command`, so all state changes stay on one thread.
//!
//! ```text
//! quickrun [secs]          runnow A|B|C        stop quick|now
//! manual on|off            toggle <zone>       disable|enable <zone>
//! copy <from> <to>         clear               programs <json>
//! tz <name>                dst on|off          wifi <ssid> [password]
//! ```
//!
//! Zones are 0-based, matching the log output.

use core::fmt;
use std::io::{BufRead, BufReader, ErrorKind};
use std::time::Duration;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};

use heapless::String;
use log::{info, warn};

use super::utils::{is_printable_ascii, is_valid_wifi_password};
use crate::app::commands::AppCommand;
use crate::schedule::persist;
use crate::schedule::program::ProgramSlot;
use crate::settings::{MAX_PASSWORD_LEN, MAX_SSID_LEN, Settings, TimeZone};

/// Commands buffered between the reader thread and the control loop.
pub const COMMAND_QUEUE_DEPTH: usize = 8;

const READER_STACK_KB: usize = 8;

/// Longest accepted line; a program document fits comfortably.
const MAX_LINE_BYTES: usize = 2 * persist::MAX_DOCUMENT_BYTES;

const IDLE_POLL: Duration = Duration::from_millis(50);

/// Why a console line was not turned into a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    Empty,
    UnknownCommand,
    MissingArgument,
    BadArgument,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty line"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::MissingArgument => write!(f, "missing argument"),
            Self::BadArgument => write!(f, "bad argument"),
        }
    }
}

/// A queued console line, already parsed.
///
/// Settings commands carry only the field being changed; the rest is
/// filled in from the live settings when the command is taken.
#[derive(Debug, Clone)]
pub enum ConsoleCommand {
    App(AppCommand),
    TimeZone(TimeZone),
    Dst(bool),
    Wifi {
        ssid: String<MAX_SSID_LEN>,
        password: String<MAX_PASSWORD_LEN>,
    },
}

impl ConsoleCommand {
    /// Resolve into an [`AppCommand`] against the current settings.
    pub fn into_app_command(self, current: &Settings) -> AppCommand {
        let mut settings = current.clone();
        match self {
            Self::App(cmd) => return cmd,
            Self::TimeZone(tz) => settings.timezone = tz,
            Self::Dst(on) => settings.dst = on,
            Self::Wifi { ssid, password } => {
                settings.wifi_ssid = ssid;
                settings.wifi_password = password;
            }
        }
        AppCommand::UpdateSettings(settings)
    }
}

fn on_off(word: Option<&str>) -> Result<bool, ConsoleError> {
    match word.ok_or(ConsoleError::MissingArgument)? {
        w if w.eq_ignore_ascii_case("on") => Ok(true),
        w if w.eq_ignore_ascii_case("off") => Ok(false),
        _ => Err(ConsoleError::BadArgument),
    }
}

fn slot(word: Option<&str>) -> Result<ProgramSlot, ConsoleError> {
    let mut chars = word.ok_or(ConsoleError::MissingArgument)?.chars();
    let (Some(letter), None) = (chars.next(), chars.next()) else {
        return Err(ConsoleError::BadArgument);
    };
    ProgramSlot::ALL
        .into_iter()
        .find(|s| s.letter() == letter.to_ascii_uppercase())
        .ok_or(ConsoleError::BadArgument)
}

fn zone(word: Option<&str>) -> Result<usize, ConsoleError> {
    word.ok_or(ConsoleError::MissingArgument)?
        .parse()
        .map_err(|_| ConsoleError::BadArgument)
}

/// Parse one console line.
pub fn parse_line(line: &str) -> Result<ConsoleCommand, ConsoleError> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "" => return Err(ConsoleError::Empty),
        "quickrun" => {
            let seconds = match args.next() {
                Some(s) => Some(s.parse().map_err(|_| ConsoleError::BadArgument)?),
                None => None,
            };
            AppCommand::StartQuickRun { seconds }
        }
        "runnow" => AppCommand::StartRunProgramNow(slot(args.next())?),
        "stop" => match args.next().ok_or(ConsoleError::MissingArgument)? {
            "quick" => AppCommand::StopQuickRun,
            "now" => AppCommand::StopRunProgramNow,
            _ => return Err(ConsoleError::BadArgument),
        },
        "manual" => AppCommand::SetManualMode(on_off(args.next())?),
        "toggle" => AppCommand::ToggleManualZone(zone(args.next())?),
        "disable" => AppCommand::SetZoneDisabled {
            zone: zone(args.next())?,
            disabled: true,
        },
        "enable" => AppCommand::SetZoneDisabled {
            zone: zone(args.next())?,
            disabled: false,
        },
        "copy" => {
            let source = slot(args.next())?;
            let target = slot(args.next())?;
            AppCommand::CopyProgram { target, source }
        }
        "clear" => AppCommand::ClearPrograms,
        "programs" => {
            if rest.is_empty() {
                return Err(ConsoleError::MissingArgument);
            }
            AppCommand::SavePrograms(persist::load(rest))
        }
        "tz" => {
            let tz = TimeZone::from_name(args.next().ok_or(ConsoleError::MissingArgument)?)
                .ok_or(ConsoleError::BadArgument)?;
            return Ok(ConsoleCommand::TimeZone(tz));
        }
        "dst" => return Ok(ConsoleCommand::Dst(on_off(args.next())?)),
        "wifi" => {
            let ssid = args.next().ok_or(ConsoleError::MissingArgument)?;
            let password = args.next().unwrap_or("");
            if !is_printable_ascii(ssid) || !is_valid_wifi_password(password) {
                return Err(ConsoleError::BadArgument);
            }
            return Ok(ConsoleCommand::Wifi {
                ssid: String::try_from(ssid).map_err(|_| ConsoleError::BadArgument)?,
                password: String::try_from(password).map_err(|_| ConsoleError::BadArgument)?,
            });
        }
        _ => return Err(ConsoleError::UnknownCommand),
    };
    Ok(ConsoleCommand::App(cmd))
}

// ── Reader thread ─────────────────────────────────────────────

/// Receiving end of the console, owned by the control loop.
pub struct ConsoleAdapter {
    rx: Receiver<ConsoleCommand>,
}

impl ConsoleAdapter {
    /// Read commands from the serial console (UART0 via stdin).
    pub fn spawn_stdin(notify: fn()) -> std::io::Result<Self> {
        Self::spawn(BufReader::new(std::io::stdin()), notify)
    }

    /// Read commands line by line from `reader` on a background thread.
    /// `notify` runs after each queued command.
    pub fn spawn<R>(reader: R, notify: fn()) -> std::io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = sync_channel(COMMAND_QUEUE_DEPTH);
        std::thread::Builder::new()
            .name("console".into())
            .stack_size(READER_STACK_KB * 1024)
            .spawn(move || read_loop(reader, &tx, notify))?;
        Ok(Self { rx })
    }

    /// Next queued command, if any.
    pub fn try_recv(&self) -> Option<ConsoleCommand> {
        self.rx.try_recv().ok()
    }
}

fn read_loop(mut reader: impl BufRead, tx: &SyncSender<ConsoleCommand>, notify: fn()) {
    let mut buf = Vec::with_capacity(MAX_LINE_BYTES);
    loop {
        // The IDF console reads non-blocking; partial lines stay in `buf`.
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) if buf.is_empty() => break,
            Ok(_) => {}
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                std::thread::sleep(IDLE_POLL);
                continue;
            }
            Err(e) => {
                warn!("Console: read failed ({})", e);
                std::thread::sleep(IDLE_POLL);
                continue;
            }
        }
        if buf.len() > MAX_LINE_BYTES {
            warn!("Console: line over {} bytes dropped", MAX_LINE_BYTES);
            buf.clear();
            continue;
        }

        let line = std::string::String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        match parse_line(&line) {
            Ok(cmd) => match tx.try_send(cmd) {
                Ok(()) => notify(),
                Err(TrySendError::Full(_)) => warn!("Console: queue full, dropping '{}'", line.trim()),
                Err(TrySendError::Disconnected(_)) => return,
            },
            Err(ConsoleError::Empty) => {}
            Err(e) => warn!("Console: '{}': {}", line.trim(), e),
        }
    }
    info!("Console: input closed");
}

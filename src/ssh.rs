//! Read a touch device on another machine over SSH.
//!
//! The remote side only needs a shell: the device is located by scanning
//! sysfs with `grep`, and records are streamed with `cat`.

use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ssh2::{Channel, Session};

use crate::config::{Auth, Config};
use crate::device::{dev_node, DeviceLocator, DEV_INPUT_DIR, SYSFS_INPUT_DIR};
use crate::error::{Error, Result};
use crate::input::EventLayout;

/// Timeout for connecting and for remote commands.
const SSH_TIMEOUT: Duration = Duration::from_secs(5);

const SSH_PORT: u16 = 22;

/// Remote device stream. Keeps the session alive as long as the channel is read.
pub struct RemoteStream {
    session: Session,
    channel: Channel,
}

impl Read for RemoteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.channel.read(buf)
    }
}

impl RemoteStream {
    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Open an SSH connection to `config.host`.
pub fn connect(config: &Config) -> Result<Session> {
    let host = config
        .host
        .as_deref()
        .ok_or_else(|| Error::Config("no remote host configured".into()))?;
    log::info!("Connecting to {}", host);

    let addr = (host, SSH_PORT)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Config(format!("could not resolve host address '{}'", host)))?;
    let tcp = TcpStream::connect_timeout(&addr, SSH_TIMEOUT)?;

    let mut session = Session::new()?;
    session.set_tcp_stream(tcp);
    session.handshake()?;
    authenticate(&mut session, &config.user, &config.auth())?;

    Ok(session)
}

fn authenticate(session: &mut Session, user: &str, auth: &Auth) -> Result<()> {
    match auth {
        Auth::Key(path) => {
            session.userauth_pubkey_file(user, None, path.as_ref(), None)?;
        }
        Auth::Password(pass) => {
            session.userauth_password(user, pass)?;
        }
    }

    if !session.authenticated() {
        return Err(Error::Config("SSH authentication failed".into()));
    }

    Ok(())
}

/// Run a command and collect its stdout. Returns the exit status alongside.
fn exec(session: &Session, cmd: &str) -> Result<(i32, String)> {
    session.set_timeout(SSH_TIMEOUT.as_millis() as u32);
    let mut channel = session.channel_session()?;
    log::debug!("Executing: {}", cmd);
    channel.exec(cmd)?;

    let mut output = String::new();
    channel.read_to_string(&mut output)?;

    // Close our end so the session stays usable for the stream channel.
    channel.close()?;
    channel.wait_close()?;

    Ok((channel.exit_status()?, output))
}

/// Detect the remote record layout from its CPU architecture.
pub fn detect_layout(session: &Session) -> Result<EventLayout> {
    let (status, output) = exec(session, "uname -m")?;
    layout_for_arch(status, &output)
}

fn layout_for_arch(status: i32, output: &str) -> Result<EventLayout> {
    if status != 0 {
        return Err(Error::Config(format!(
            "remote 'uname -m' exited with status {}, set event_size explicitly",
            status
        )));
    }
    match output.trim() {
        "armv7l" | "armv6l" | "i686" => Ok(EventLayout::Compact),
        "aarch64" | "x86_64" => Ok(EventLayout::Wide),
        other => Err(Error::Config(format!(
            "unsupported remote architecture '{}', set event_size explicitly",
            other
        ))),
    }
}

/// Finds a device by name on the remote machine's sysfs.
pub struct RemoteLocator<'a> {
    session: &'a Session,
    name: String,
}

impl<'a> RemoteLocator<'a> {
    pub fn new(session: &'a Session, name: impl Into<String>) -> Self {
        Self {
            session,
            name: name.into(),
        }
    }
}

impl DeviceLocator for RemoteLocator<'_> {
    fn locate(&self) -> Result<PathBuf> {
        let cmd = format!(
            "grep -lxF {} {}/event*/device/name 2>/dev/null",
            shell_quote(&self.name),
            SYSFS_INPUT_DIR
        );
        let (status, output) = exec(self.session, &cmd)?;
        let name_file = grep_match(&self.name, status, &output)?;
        let path = dev_node(Path::new(DEV_INPUT_DIR), Path::new(name_file))?;
        log::info!("Found '{}' at {} (remote)", self.name, path.display());
        Ok(path)
    }
}

/// Interpret `grep -l` output: status 0 is a match, 1 is no match, anything
/// else (unreadable sysfs, missing grep) is a failure of the lookup itself.
fn grep_match<'o>(name: &str, status: i32, output: &'o str) -> Result<&'o str> {
    let not_found = || Error::DeviceNotFound {
        name: name.to_string(),
    };
    match status {
        0 => first_match(output).ok_or_else(not_found),
        1 => Err(not_found()),
        _ => Err(Error::Io(io::Error::other(format!(
            "remote device lookup failed (grep exit status {})",
            status
        )))),
    }
}

/// First non-empty line in sorted order, so the choice matches local discovery.
fn first_match(output: &str) -> Option<&str> {
    output.lines().map(str::trim).filter(|l| !l.is_empty()).min()
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Stream `device_path` from the remote host.
///
/// Reads on the returned stream time out after `read_timeout` so a reader
/// loop can check for shutdown.
pub fn open_input_stream(
    session: Session,
    device_path: &Path,
    read_timeout: Option<Duration>,
) -> Result<RemoteStream> {
    let mut channel = session.channel_session()?;
    let cmd = format!("exec cat {}", shell_quote(&device_path.to_string_lossy()));
    log::debug!("Executing: {}", cmd);
    channel.exec(&cmd)?;

    session.set_timeout(read_timeout.map(|t| t.as_millis() as u32).unwrap_or(0));

    log::info!("Stream ready for {}", device_path.display());
    Ok(RemoteStream { session, channel })
}

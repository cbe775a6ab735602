use anyhow::{anyhow, Context, Result};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Keyboard-interactive prompt handler that always responds with the password
struct PasswordPrompt {
    password: String,
}

impl ssh2::KeyboardInteractivePrompt for PasswordPrompt {
    fn prompt<'a>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[ssh2::Prompt<'a>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.clone()).collect()
    }
}

/// SSH endpoint and login for one switch
#[derive(Debug, Clone)]
pub struct SshTarget {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub timeout_secs: u64,
}

/// Validate a hostname.
/// Allows alphanumeric, hyphens, dots, and underscores. No path separators or shell metacharacters.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > 253 {
        return false;
    }
    hostname.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
}

/// Rendered config artifact name, e.g. "sw1_dot1x.txt"
pub fn dot1x_config_filename(host: &str) -> String {
    format!("{}_dot1x.txt", host)
}

/// Verification output artifact name, e.g. "sw1_dot1x_verified.txt"
pub fn dot1x_verified_filename(host: &str) -> String {
    format!("{}_dot1x_verified.txt", host)
}

fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .with_context(|| format!("Invalid address {}:{}", host, port))?
        .next()
        .ok_or_else(|| anyhow!("No address found for {}:{}", host, port))
}

/// libssh2 takes its blocking timeout in milliseconds as a u32
fn session_timeout_ms(timeout_secs: u64) -> u32 {
    u32::try_from(timeout_secs.saturating_mul(1000)).unwrap_or(u32::MAX)
}

/// Create an SSH session and authenticate with password + keyboard-interactive.
/// This is blocking, so call from a spawn_blocking context.
pub fn ssh_connect(target: &SshTarget) -> Result<ssh2::Session> {
    let addr = resolve_addr(&target.host, target.port)?;
    let timeout = Duration::from_secs(target.timeout_secs);
    let tcp = TcpStream::connect_timeout(&addr, timeout).context("TCP connection failed")?;

    tcp.set_read_timeout(Some(timeout)).ok();
    tcp.set_write_timeout(Some(timeout)).ok();

    let mut session = ssh2::Session::new().context("Failed to create SSH session")?;
    session.set_tcp_stream(tcp);
    session.set_timeout(session_timeout_ms(target.timeout_secs));
    session.handshake().context("SSH handshake failed")?;

    // Try password auth first
    if session.userauth_password(&target.user, &target.pass).is_ok() && session.authenticated() {
        return Ok(session);
    }

    // Some IOS AAA setups only offer keyboard-interactive
    let mut prompter = PasswordPrompt {
        password: target.pass.clone(),
    };
    let _ = session.userauth_keyboard_interactive(&target.user, &mut prompter);

    if session.authenticated() {
        Ok(session)
    } else {
        Err(anyhow!("SSH authentication failed: all methods exhausted"))
    }
}

/// Connect via SSH and run a single exec command, returning the output.
/// This is blocking, so call from a spawn_blocking context.
pub fn ssh_run_command(target: &SshTarget, command: &str) -> Result<String> {
    let session = ssh_connect(target)?;

    let mut channel = session.channel_session().context("Failed to open channel")?;
    channel
        .exec(command)
        .with_context(|| format!("Failed to execute {:?}", command))?;

    let mut output = String::new();
    channel
        .read_to_string(&mut output)
        .context("Failed to read output")?;
    channel.wait_close().context("Failed to close channel")?;

    if output.trim_start().starts_with('%') || output.contains("Invalid input") {
        return Err(anyhow!("Device rejected {:?}: {}", command, output.trim()));
    }

    Ok(output)
}

/// Feed lines to an interactive shell (PTY) and collect everything the device echoes.
/// Used for configuration mode, which IOS does not accept over a single exec.
pub fn ssh_run_interactive(target: &SshTarget, lines: &[String]) -> Result<String> {
    let session = ssh_connect(target)?;

    let mut channel = session.channel_session().context("Failed to open channel")?;
    channel
        .request_pty("vt100", None, None)
        .context("Failed to request PTY")?;
    channel.shell().context("Failed to start shell")?;

    for line in lines {
        channel
            .write_all(line.as_bytes())
            .and_then(|_| channel.write_all(b"\n"))
            .with_context(|| format!("Failed to send {:?}", line))?;
    }
    channel.write_all(b"exit\n").context("Failed to send exit")?;
    channel.flush().ok();
    channel.send_eof().ok();

    let mut output = String::new();
    channel
        .read_to_string(&mut output)
        .context("Failed to read output")?;
    channel.wait_close().ok();

    if let Some(bad) = output.lines().find(|l| l.contains("% Invalid input") || l.contains("% Incomplete command")) {
        return Err(anyhow!("Device rejected configuration: {}", bad.trim()));
    }

    Ok(output)
}

/// Async wrapper for ssh_run_command - runs in a blocking thread pool
pub async fn ssh_run_command_async(target: &SshTarget, command: &str) -> Result<String> {
    let target = target.clone();
    let command = command.to_string();

    tokio::task::spawn_blocking(move || ssh_run_command(&target, &command))
        .await
        .context("SSH task join error")?
}

/// Async wrapper for ssh_run_interactive - runs in a blocking thread pool
pub async fn ssh_run_interactive_async(target: &SshTarget, lines: Vec<String>) -> Result<String> {
    let target = target.clone();

    tokio::task::spawn_blocking(move || ssh_run_interactive(&target, &lines))
        .await
        .context("SSH task join error")?
}

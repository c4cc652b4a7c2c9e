//! Long-running child processes: monitored (output forwarded) and detached

use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Split};
use tokio_util::sync::CancellationToken;
use unityup_errors::{Error, PlatformError};
use unityup_events::{AppEvent, EventEmitter, ProcessEvent};

use super::PlatformCommand;

fn spawn_failed(cmd: &PlatformCommand, err: &std::io::Error) -> Error {
    PlatformError::ProcessExecutionFailed {
        command: cmd.to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Run `cmd` until it exits, forwarding each stdout line as an INFO event
/// and each stderr line as an ERROR event when `forward_output` is set.
///
/// Returns the child's exit code (`-1` if killed by a signal).
///
/// # Errors
///
/// Fails if the process cannot be spawned, or with `Error::Cancelled` when
/// `cancel` fires. A cancelled child is left running.
pub async fn run_monitored<E: EventEmitter>(
    cmd: &PlatformCommand,
    emitter: &E,
    forward_output: bool,
    cancel: &CancellationToken,
) -> Result<i32, Error> {
    let mut child = cmd
        .to_tokio()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_failed(cmd, &e))?;

    emitter.emit(AppEvent::Process(ProcessEvent::Spawned {
        executable: cmd.program().to_string(),
        pid: child.id(),
    }));

    let mut stdout = child.stdout.take().map(|s| BufReader::new(s).split(b'\n'));
    let mut stderr = child.stderr.take().map(|s| BufReader::new(s).split(b'\n'));

    let status = loop {
        tokio::select! {
            line = next_line(&mut stdout), if stdout.is_some() => match line {
                Some(line) if forward_output => emitter.emit_process_output(line),
                Some(_) => {}
                None => stdout = None,
            },
            line = next_line(&mut stderr), if stderr.is_some() => match line {
                Some(line) if forward_output => emitter.emit_process_error(line),
                Some(_) => {}
                None => stderr = None,
            },
            status = child.wait() => break status.map_err(|e| spawn_failed(cmd, &e))?,
            () = cancel.cancelled() => return Err(Error::Cancelled),
        }
    };

    // Drain what the child wrote right before exiting
    while let Some(line) = next_line(&mut stdout).await {
        if forward_output {
            emitter.emit_process_output(line);
        }
    }
    while let Some(line) = next_line(&mut stderr).await {
        if forward_output {
            emitter.emit_process_error(line);
        }
    }

    let code = status.code().unwrap_or(-1);
    emitter.emit(AppEvent::Process(ProcessEvent::Exited { code }));
    Ok(code)
}

/// Next line of child output. Bytes that are not UTF-8 are replaced rather
/// than ending the stream, so the pipe stays open while the child writes.
async fn next_line<R>(segments: &mut Option<Split<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    let reader = segments.as_mut()?;
    match reader.next_segment().await {
        Ok(Some(mut bytes)) => {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read child output");
            None
        }
    }
}

/// Start `cmd` without waiting for it or capturing its output.
///
/// Returns the child's pid when the OS reports one.
///
/// # Errors
///
/// Fails if the process cannot be spawned.
pub fn spawn_detached<E: EventEmitter>(
    cmd: &PlatformCommand,
    emitter: &E,
) -> Result<Option<u32>, Error> {
    let mut command = cmd.to_tokio();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    command.process_group(0);

    #[cfg(windows)]
    {
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    let child = command.spawn().map_err(|e| spawn_failed(cmd, &e))?;
    let pid = child.id();
    emitter.emit(AppEvent::Process(ProcessEvent::Detached {
        executable: cmd.program().to_string(),
        pid,
    }));
    Ok(pid)
}

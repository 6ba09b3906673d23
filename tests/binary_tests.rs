//! Tests against the shipped `vigil` binary.
//!
//! These start the real executable with configuration taken from the process
//! environment and stop it with SIGTERM, covering signal registration and
//! startup wiring that in-process tests bypass.
//!
//! Run with: cargo test --test binary_tests
#![cfg(unix)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const EXIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variables the binary reads; cleared so the host cannot leak in
const CONFIG_VARS: &[&str] = &[
    "PORT",
    "APP_ENV",
    "NODE_ENV",
    "APP_VERSION",
    "HOSTNAME",
    "SHUTDOWN_TIMEOUT_SECONDS",
    "LOG_FORMAT",
];

fn vigil(envs: &[(&str, &str)]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_vigil"));
    for var in CONFIG_VARS {
        command.env_remove(var);
    }
    command
        .env("RUST_LOG", "vigil=info")
        .env("NO_COLOR", "1")
        .envs(envs.iter().copied())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

/// Ask the OS for a port nobody is listening on
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn wait_for_listener(port: u16, child: &mut Child) {
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    while Instant::now() < deadline {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            return;
        }
        if let Some(status) = child.try_wait().unwrap() {
            panic!("vigil exited during startup with {status}");
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    panic!("vigil did not listen on port {port} within {STARTUP_TIMEOUT:?}");
}

/// Minimal HTTP/1.1 GET returning the raw response
fn http_get(port: u16, path: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    write!(
        stream,
        "GET {path} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n"
    )
    .unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    response
}

fn send_sigterm(child: &Child) {
    let status = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success(), "kill -TERM failed");
}

fn wait_with_timeout(mut child: Child) -> Output {
    let deadline = Instant::now() + EXIT_TIMEOUT;
    while child.try_wait().unwrap().is_none() {
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("vigil did not exit within {EXIT_TIMEOUT:?}");
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    child.wait_with_output().unwrap()
}

fn combined_output(output: &Output) -> String {
    format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[test]
fn sigterm_shuts_down_cleanly() {
    let port = free_port();
    let port_var = port.to_string();
    let mut child = vigil(&[("PORT", port_var.as_str()), ("APP_VERSION", "2.3.1")])
        .spawn()
        .unwrap();
    wait_for_listener(port, &mut child);

    let response = http_get(port, "/health");
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains(r#""version":"2.3.1""#), "{response}");

    send_sigterm(&child);
    let output = wait_with_timeout(child);
    let logs = combined_output(&output);

    assert!(output.status.success(), "exit {:?}\n{logs}", output.status);
    assert!(logs.contains(&format!("Server running on port {port}")), "{logs}");
    assert!(logs.contains("Version: 2.3.1"), "{logs}");
    assert!(logs.contains("SIGTERM signal received"), "{logs}");
    assert!(logs.contains("HTTP server closed"), "{logs}");

    // Listener is gone after exit
    assert!(TcpStream::connect(("127.0.0.1", port)).is_err());
}

#[test]
fn welcome_reads_environment() {
    let port = free_port();
    let port_var = port.to_string();
    let mut child = vigil(&[
        ("PORT", port_var.as_str()),
        ("NODE_ENV", "staging"),
        ("HOSTNAME", "pod-7f9c"),
    ])
    .spawn()
    .unwrap();
    wait_for_listener(port, &mut child);

    let response = http_get(port, "/");
    assert!(
        response.ends_with(
            r#"{"message":"Welcome to the Demo Application!","environment":"staging","hostname":"pod-7f9c","version":"1.0.0"}"#
        ),
        "{response}"
    );

    send_sigterm(&child);
    assert!(wait_with_timeout(child).status.success());
}

#[test]
fn invalid_port_exits_non_zero() {
    let child = vigil(&[("PORT", "abc")]).spawn().unwrap();
    let output = wait_with_timeout(child);
    let logs = combined_output(&output);

    assert!(!output.status.success(), "{logs}");
    assert!(logs.contains("Invalid configuration"), "{logs}");
    assert!(logs.contains("PORT must be a port number"), "{logs}");
}

#[test]
fn port_in_use_exits_non_zero() {
    let taken = TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let port_var = port.to_string();
    let child = vigil(&[("PORT", port_var.as_str())]).spawn().unwrap();
    let output = wait_with_timeout(child);

    assert!(!output.status.success(), "{}", combined_output(&output));
    drop(taken);
}
